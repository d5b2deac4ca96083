//! Customer Scorer
//!
//! Scores one customer record (JSON) against the configured artifacts and
//! prints the assessment.

use anyhow::{Context, Result};
use churn_radar::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    models::ModelLoader,
    types::{ChurnAssessment, CustomerRecord},
};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Score a single customer record for churn risk")]
struct Cli {
    /// Customer record as JSON; `-` reads standard input
    #[arg(default_value = "-")]
    input: String,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print the assessment as JSON
    #[arg(long)]
    json: bool,
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read customer record from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read customer record from {input}"))
    }
}

fn print_report(record: &CustomerRecord, assessment: &ChurnAssessment) {
    let profile = assessment.profile;

    println!("Churn probability: {:.1}%", assessment.percentage);
    println!("Risk tier:         {} RISK", profile.priority);
    println!(
        "Customer:          {} months, {}, {}, ${:.2}/month",
        record.tenure, record.contract, record.internet_service, record.monthly_charges
    );
    println!();
    println!("{}", profile.banner);
    println!("{}:", profile.actions_title);
    for action in profile.actions {
        println!("  {} {}: {}", action.icon, action.title, action.detail);
    }
    println!();
    println!("Key risk factors:");
    if assessment.risk_factors.is_empty() {
        println!("  No significant risk factors detected");
    }
    for factor in &assessment.risk_factors {
        println!(
            "  {} {}: {}",
            factor.severity.marker(),
            factor.label,
            factor.description
        );
    }
    println!();
    println!(
        "Timeline: {}  |  Expected retention: {}  |  Model: {}",
        profile.timeline, profile.expected_retention, assessment.model
    );
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("churn_radar=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        AppConfig::load_from_path(&cli.config)?
    } else {
        warn!(path = %cli.config.display(), "Config file not found, using defaults");
        AppConfig::default()
    };

    let raw = read_input(&cli.input)?;
    let record: CustomerRecord =
        serde_json::from_str(&raw).context("Failed to parse customer record")?;

    let predictor = ModelLoader::new(config.artifacts.clone())
        .load_predictor(config.risk.clone())
        .context("Failed to load model artifacts")?;

    let assessment = predictor.assess(&record)?;
    info!(
        assessment_id = %assessment.assessment_id,
        tier = assessment.tier.as_str(),
        "Customer scored"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print_report(&record, &assessment);
    }

    Ok(())
}

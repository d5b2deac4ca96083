//! ChurnRadar - Main Entry Point
//!
//! Loads the training artifacts and serves the churn prediction form and
//! JSON API. If the artifacts cannot be loaded the server still starts, but
//! predictions are disabled and the load error is shown instead.

use anyhow::{Context, Result};
use churn_radar::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    models::ModelLoader,
    server::{self, AppState, ServiceState},
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Telecom customer churn prediction service")]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the configured listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("churn_radar={}", logging.level)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration comes first so logging can follow it
    let (mut config, config_error) = if cli.config.exists() {
        (AppConfig::load_from_path(&cli.config)?, None)
    } else {
        (AppConfig::default(), Some(cli.config.display().to_string()))
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_logging(&config.logging)?;
    info!("Starting ChurnRadar v{}", env!("CARGO_PKG_VERSION"));

    match config_error {
        Some(path) => warn!(path = %path, "Config file not found, using defaults"),
        None => info!(path = %cli.config.display(), "Configuration loaded"),
    }
    info!(
        "Risk tiers: medium>={:.0}%, high>={:.0}%",
        config.risk.medium, config.risk.high
    );

    // Load artifacts once; failure disables predictions instead of aborting
    let loader = ModelLoader::new(config.artifacts.clone());
    let service = match loader.load_predictor(config.risk.clone()) {
        Ok(predictor) => {
            info!(
                model = %predictor.model_name(),
                features = predictor.encoder().feature_count(),
                "Predictor ready"
            );
            ServiceState::Ready(Arc::new(predictor))
        }
        Err(e) => {
            error!(error = %e, "Failed to load model artifacts, predictions disabled");
            ServiceState::Disabled(e.to_string())
        }
    };

    let state = Arc::new(AppState::new(service, config.model_card.clone()));
    let metrics = state.metrics.clone();
    let app = server::router(state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("ChurnRadar shutting down...");
    metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

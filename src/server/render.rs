//! HTML rendering for the form page and prediction results

use crate::config::ModelCardConfig;
use crate::feature_encoder::FEATURE_COUNT;
use crate::types::assessment::{ChurnAssessment, RiskTier};
use crate::types::customer::{
    AddOn, Choice, Contract, CustomerRecord, Gender, InternetService, PaymentMethod, PhoneLines,
    YesNo, MAX_MONTHLY_CHARGES, MAX_TENURE, MAX_TOTAL_CHARGES,
};

/// What the main panel shows next to the input form
pub enum MainPanel<'a> {
    Landing(&'a ModelCardConfig),
    Result(&'a ChurnAssessment),
    /// Prediction failed; message shown verbatim
    Error(&'a str),
    /// Artifacts failed to load; message shown verbatim
    Disabled(&'a str),
}

/// Gauge bar color; strict comparisons, unlike the tier rule.
pub fn gauge_color(percentage: f64) -> &'static str {
    if percentage > 70.0 {
        "darkred"
    } else if percentage > 40.0 {
        "orange"
    } else {
        "green"
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the full page: input form plus main panel.
pub fn page(record: &CustomerRecord, panel: MainPanel<'_>) -> String {
    let main = match panel {
        MainPanel::Landing(card) => landing(card),
        MainPanel::Result(assessment) => results(assessment),
        MainPanel::Error(message) => format!(
            r#"<div class="alert error"><strong>❌ Error during prediction:</strong> {msg}</div>
<pre>{msg}</pre>"#,
            msg = escape_html(message)
        ),
        MainPanel::Disabled(message) => format!(
            r#"<div class="alert error"><strong>⚠️ Model could not be loaded.</strong> Predictions are disabled.</div>
<pre>{}</pre>"#,
            escape_html(message)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>ChurnRadar - Customer Churn Prediction</title>
    <style>{STYLE}</style>
</head>
<body>
<aside>
{form}
</aside>
<main>
    <h1>📡 ChurnRadar: Customer Churn Prediction</h1>
    <p>Predict customer churn risk and get retention strategy recommendations.</p>
    <hr>
{main}
</main>
<script>{SCRIPT}</script>
</body>
</html>
"#,
        form = form(record),
    )
}

fn select<T: Choice + PartialEq>(name: &str, label: &str, options: &[T], selected: T) -> String {
    let mut html =
        format!(r#"<label for="{name}">{label}</label><select id="{name}" name="{name}">"#);
    for &option in options {
        let mark = if option == selected { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{value}"{mark}>{value}</option>"#,
            value = escape_html(option.label())
        ));
    }
    html.push_str("</select>");
    html
}

fn yes_no_of_lines(lines: PhoneLines) -> YesNo {
    if lines == PhoneLines::Yes {
        YesNo::Yes
    } else {
        YesNo::No
    }
}

fn yes_no_of_add_on(add_on: AddOn) -> YesNo {
    if add_on == AddOn::Yes {
        YesNo::Yes
    } else {
        YesNo::No
    }
}

fn form(r: &CustomerRecord) -> String {
    let mut html = String::from(r#"<form method="post" action="/predict">
<h2>📊 Customer Information</h2>
<h3>Demographics</h3>
"#);
    html.push_str(&select("gender", "Gender", Gender::OPTIONS, r.gender));
    html.push_str(&select("senior_citizen", "Senior Citizen", YesNo::OPTIONS, r.senior_citizen));
    html.push_str(&select("partner", "Has Partner", YesNo::OPTIONS, r.partner));
    html.push_str(&select("dependents", "Has Dependents", YesNo::OPTIONS, r.dependents));

    html.push_str("<h3>Account Info</h3>");
    html.push_str(&format!(
        r#"<label for="tenure">Tenure (months): <output id="tenure_out">{t}</output></label>
<input type="range" id="tenure" name="tenure" min="0" max="{MAX_TENURE}" step="1" value="{t}"
       oninput="document.getElementById('tenure_out').value = this.value">"#,
        t = r.tenure
    ));
    html.push_str(&select("contract", "Contract Type", Contract::OPTIONS, r.contract));
    html.push_str(&select(
        "paperless_billing",
        "Paperless Billing",
        YesNo::OPTIONS,
        r.paperless_billing,
    ));
    html.push_str(&select(
        "payment_method",
        "Payment Method",
        PaymentMethod::OPTIONS,
        r.payment_method,
    ));

    html.push_str("<h3>Services</h3>");
    html.push_str(&select("phone_service", "Phone Service", YesNo::OPTIONS, r.phone_service));
    html.push_str(r#"<div class="needs-phone">"#);
    html.push_str(&select(
        "multiple_lines",
        "Multiple Lines",
        YesNo::OPTIONS,
        yes_no_of_lines(r.multiple_lines),
    ));
    html.push_str("</div>");
    html.push_str(&select(
        "internet_service",
        "Internet Service",
        InternetService::OPTIONS,
        r.internet_service,
    ));
    html.push_str(r#"<div class="needs-internet">"#);
    let add_on_labels = [
        "Online Security",
        "Online Backup",
        "Device Protection",
        "Tech Support",
        "Streaming TV",
        "Streaming Movies",
    ];
    for ((field, value), label) in r.add_ons().into_iter().zip(add_on_labels) {
        html.push_str(&select(field, label, YesNo::OPTIONS, yes_no_of_add_on(value)));
    }
    html.push_str("</div>");

    html.push_str(&format!(
        r#"<h3>Financial</h3>
<label for="monthly_charges">Monthly Charges ($)</label>
<input type="number" id="monthly_charges" name="monthly_charges" min="0" max="{MAX_MONTHLY_CHARGES}" step="any" value="{m}">
<label for="total_charges">Total Charges ($)</label>
<input type="number" id="total_charges" name="total_charges" min="0" max="{MAX_TOTAL_CHARGES}" step="any" value="{t}">
<button type="submit">🔮 Predict Churn Risk</button>
</form>"#,
        m = r.monthly_charges,
        t = r.total_charges
    ));
    html
}

fn landing(card: &ModelCardConfig) -> String {
    format!(
        r#"<div class="alert info">👈 Enter customer information in the form, then click <strong>Predict Churn Risk</strong></div>
<div class="metrics">
    <div class="metric"><span>Model Accuracy</span><strong>{accuracy}</strong></div>
    <div class="metric"><span>ROC-AUC Score</span><strong>{roc_auc}</strong></div>
    <div class="metric"><span>Processing Time</span><strong>&lt;1s</strong></div>
</div>
<hr>
<h2>📊 How It Works</h2>
<div class="columns">
    <div>
        <h3>Machine Learning Model</h3>
        <ul>
            <li><strong>Algorithm</strong>: {algorithm}</li>
            <li><strong>Training Data</strong>: {rows} customers</li>
            <li><strong>Features</strong>: {FEATURE_COUNT} customer attributes</li>
            <li><strong>Validation</strong>: {validation}</li>
        </ul>
    </div>
    <div>
        <h3>Key Predictors</h3>
        <ul>
            <li>Contract type</li>
            <li>Tenure duration</li>
            <li>Payment method</li>
            <li>Service usage</li>
            <li>Monthly charges</li>
        </ul>
    </div>
</div>
<hr>
<h2>🎯 Business Impact</h2>
<div class="metrics">
    <div class="metric"><span>At Risk</span><strong>{at_risk}</strong></div>
    <div class="metric"><span>Revenue Risk</span><strong>{revenue_risk}</strong></div>
    <div class="metric"><span>Retainable</span><strong>{retainable}</strong></div>
    <div class="metric"><span>ROI</span><strong>{roi}</strong></div>
</div>
<hr>
<footer>{footer}</footer>"#,
        accuracy = escape_html(&card.accuracy),
        roc_auc = escape_html(&card.roc_auc),
        algorithm = escape_html(&card.algorithm),
        rows = escape_html(&card.training_rows),
        validation = escape_html(&card.validation),
        at_risk = escape_html(&card.at_risk),
        revenue_risk = escape_html(&card.revenue_risk),
        retainable = escape_html(&card.retainable),
        roi = escape_html(&card.roi),
        footer = escape_html(&card.footer),
    )
}

fn tier_marker(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => "🔴",
        RiskTier::Medium => "🟡",
        RiskTier::Low => "🟢",
    }
}

fn results(a: &ChurnAssessment) -> String {
    let p = a.percentage;
    let profile = a.profile;
    let marker = tier_marker(a.tier);
    let tier_class = a.tier.as_str();

    let mut html = format!(
        r#"<h2>🎯 Prediction Results</h2>
<div class="columns">
    <div class="gauge">
        <div class="gauge-title">Churn Risk Score (%)</div>
        <div class="gauge-value">{p:.1}%</div>
        <div class="gauge-track"><div class="gauge-bar" style="width: {width:.1}%; background: {color};"></div></div>
        <div class="gauge-scale"><span>0</span><span>40</span><span>70</span><span>100</span></div>
    </div>
    <div>
        <div class="badge {tier_class}">{marker} {priority} RISK</div>
        <h3>{headline}</h3>
        <div class="metric"><span>Churn Probability</span><strong>{p:.1}%</strong></div>
    </div>
</div>
<hr>
<h2>💡 Retention Recommendations</h2>
<div class="alert {tier_class}">⚠️ {banner}</div>
<p><strong>{actions_title}:</strong></p>
<ul>
"#,
        width = p.clamp(0.0, 100.0),
        color = gauge_color(p),
        priority = profile.priority,
        headline = profile.headline,
        banner = profile.banner,
        actions_title = profile.actions_title,
    );

    for action in profile.actions {
        html.push_str(&format!(
            "    <li>{} <strong>{}</strong>: {}</li>\n",
            action.icon, action.title, action.detail
        ));
    }
    html.push_str("</ul>\n<hr>\n<h2>🔍 Key Risk Factors</h2>\n");

    if a.risk_factors.is_empty() {
        html.push_str(r#"<div class="alert low">✅ No significant risk factors detected</div>"#);
    } else {
        html.push_str("<ul class=\"factors\">\n");
        for factor in &a.risk_factors {
            html.push_str(&format!(
                "    <li>{} <strong>{}</strong>: {}</li>\n",
                factor.severity.marker(),
                escape_html(&factor.label),
                escape_html(&factor.description)
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str(&format!(
        r#"<hr>
<h2>📋 Action Summary</h2>
<div class="metrics">
    <div class="metric"><span>Priority</span><strong>{marker} {priority}</strong></div>
    <div class="metric"><span>Timeline</span><strong>{timeline}</strong></div>
    <div class="metric"><span>Expected Retention</span><strong>{retention}</strong></div>
</div>"#,
        priority = profile.priority,
        timeline = profile.timeline,
        retention = profile.expected_retention,
    ));
    html
}

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 0; display: flex; background: #f5f5f5; color: #333; }
aside { width: 300px; padding: 20px; background: #fff; border-right: 1px solid #ddd; min-height: 100vh; }
aside label { display: block; margin-top: 10px; font-size: 0.9em; }
aside select, aside input { width: 100%; padding: 4px; box-sizing: border-box; }
aside button { margin-top: 20px; width: 100%; padding: 10px; background: #ff4b4b; color: #fff; border: 0; border-radius: 6px; font-size: 1em; cursor: pointer; }
main { flex: 1; padding: 30px; }
.columns { display: flex; gap: 30px; }
.columns > div { flex: 1; }
.metrics { display: flex; gap: 20px; }
.metric { flex: 1; background: #fff; padding: 15px; border-radius: 6px; }
.metric span { display: block; color: #666; font-size: 0.9em; }
.metric strong { font-size: 1.6em; }
.alert { padding: 12px; border-radius: 6px; margin: 10px 0; }
.alert.info { background: #e8f0fe; }
.alert.error, .alert.high, .badge.high { background: #F5B7B1; }
.alert.medium, .badge.medium { background: #FCF3CF; }
.alert.low, .badge.low { background: #D5F4E6; }
.badge { display: inline-block; padding: 8px 14px; border-radius: 6px; font-weight: bold; font-size: 1.3em; }
.gauge { background: #fff; padding: 20px; border-radius: 6px; text-align: center; }
.gauge-value { font-size: 3em; margin: 10px 0; }
.gauge-track { height: 24px; border-radius: 12px; background: linear-gradient(to right, #D5F4E6 0 40%, #FCF3CF 40% 70%, #F5B7B1 70% 100%); overflow: hidden; }
.gauge-bar { height: 100%; opacity: 0.8; }
.gauge-scale { display: flex; justify-content: space-between; font-size: 0.8em; color: #666; }
pre { background: #fff; padding: 10px; white-space: pre-wrap; }
footer { text-align: center; color: #666; font-size: 0.9em; }
"#;

const SCRIPT: &str = r#"
function toggleDependent(selectId, groupClass, hideWhen) {
    var select = document.getElementById(selectId);
    var update = function () {
        var hidden = select.value === hideWhen;
        document.querySelectorAll('.' + groupClass).forEach(function (group) {
            group.style.display = hidden ? 'none' : '';
            group.querySelectorAll('select').forEach(function (s) { s.disabled = hidden; });
        });
    };
    select.addEventListener('change', update);
    update();
}
toggleDependent('phone_service', 'needs-phone', 'No');
toggleDependent('internet_service', 'needs-internet', 'No');
"#;

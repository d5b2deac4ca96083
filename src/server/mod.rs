//! HTTP surface: form page, HTML results and JSON API

pub mod render;

use crate::config::ModelCardConfig;
use crate::error::PredictionError;
use crate::metrics::{MetricsSnapshot, ServiceMetrics};
use crate::models::ChurnPredictor;
use crate::types::assessment::ChurnAssessment;
use crate::types::customer::{CustomerForm, CustomerRecord};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use render::MainPanel;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Whether the service can accept prediction requests
pub enum ServiceState {
    Ready(Arc<ChurnPredictor>),
    /// Artifacts failed to load; holds the load error verbatim
    Disabled(String),
}

/// Shared, read-only handler state
pub struct AppState {
    pub service: ServiceState,
    pub model_card: ModelCardConfig,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(service: ServiceState, model_card: ModelCardConfig) -> Self {
        Self {
            service,
            model_card,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// Count and log a request whose body could not be read as a record.
    fn reject(&self, message: String) -> ApiError {
        self.metrics.record_rejected();
        warn!(error = %message, "Rejected request body");
        ApiError::InvalidRecord(message)
    }

    /// Score a record, recording metrics and logging the outcome.
    fn assess(&self, record: &CustomerRecord) -> Result<ChurnAssessment, ApiError> {
        let predictor = match &self.service {
            ServiceState::Ready(predictor) => predictor,
            ServiceState::Disabled(reason) => {
                self.metrics.record_failure();
                return Err(ApiError::Disabled(reason.clone()));
            }
        };

        let start = Instant::now();
        match predictor.assess(record) {
            Ok(assessment) => {
                let latency = start.elapsed();
                self.metrics
                    .record_prediction(latency, assessment.probability, assessment.tier);
                info!(
                    assessment_id = %assessment.assessment_id,
                    percentage = format!("{:.1}", assessment.percentage),
                    tier = assessment.tier.as_str(),
                    latency_us = latency.as_micros(),
                    "Prediction served"
                );
                Ok(assessment)
            }
            Err(PredictionError::InvalidRecord(e)) => {
                self.metrics.record_rejected();
                warn!(error = %e, "Rejected customer record");
                Err(ApiError::InvalidRecord(e.to_string()))
            }
            Err(e) => {
                self.metrics.record_failure();
                error!(error = %e, "Prediction failed");
                Err(ApiError::Prediction(e.to_string()))
            }
        }
    }
}

/// Request failure, reported verbatim to the caller
#[derive(Debug)]
pub enum ApiError {
    Disabled(String),
    InvalidRecord(String),
    Prediction(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Disabled(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Disabled(m) | ApiError::InvalidRecord(m) | ApiError::Prediction(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let record = CustomerRecord::default();
    let panel = match &state.service {
        ServiceState::Ready(_) => MainPanel::Landing(&state.model_card),
        ServiceState::Disabled(reason) => MainPanel::Disabled(reason),
    };
    Html(render::page(&record, panel))
}

async fn predict_form(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CustomerForm>, FormRejection>,
) -> Response {
    let record = match form {
        Ok(Form(form)) => form.into_record(),
        Err(rejection) => {
            let e = state.reject(rejection.body_text());
            let page = render::page(&CustomerRecord::default(), MainPanel::Error(e.message()));
            return (e.status(), Html(page)).into_response();
        }
    };

    match state.assess(&record) {
        Ok(assessment) => {
            Html(render::page(&record, MainPanel::Result(&assessment))).into_response()
        }
        Err(e) => {
            let panel = match &e {
                ApiError::Disabled(reason) => MainPanel::Disabled(reason),
                other => MainPanel::Error(other.message()),
            };
            (e.status(), Html(render::page(&record, panel))).into_response()
        }
    }
}

async fn predict_json(
    State(state): State<Arc<AppState>>,
    record: Result<Json<CustomerRecord>, JsonRejection>,
) -> Result<Json<ChurnAssessment>, ApiError> {
    let Json(record) = record.map_err(|rejection| state.reject(rejection.body_text()))?;
    state.assess(&record).map(Json)
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    match &state.service {
        ServiceState::Ready(predictor) => Json(json!({
            "status": "ready",
            "model": predictor.model_name(),
            "version": env!("CARGO_PKG_VERSION"),
        }))
        .into_response(),
        ServiceState::Disabled(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "disabled",
                "error": reason,
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response(),
    }
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inference::tests::{
        new_fiber_customer, predictor_with, BrokenModel, FixedModel,
    };
    use crate::models::loader::tests::write_artifacts;
    use crate::models::ModelLoader;
    use crate::types::assessment::RiskTierThresholds;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn ready_app(predictor: ChurnPredictor) -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(
            ServiceState::Ready(Arc::new(predictor)),
            ModelCardConfig::default(),
        ));
        (router(state.clone()), state)
    }

    fn disabled_app(reason: &str) -> Router {
        router(Arc::new(AppState::new(
            ServiceState::Disabled(reason.to_string()),
            ModelCardConfig::default(),
        )))
    }

    fn json_request(uri: &str, body: String) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const FORM_BODY: &str = "gender=Male&senior_citizen=No&partner=No&dependents=No&tenure=1\
        &contract=Month-to-month&paperless_billing=Yes&payment_method=Electronic+check\
        &phone_service=Yes&multiple_lines=No&internet_service=Fiber+optic\
        &online_security=No&online_backup=No&device_protection=No&tech_support=No\
        &streaming_tv=No&streaming_movies=No&monthly_charges=90&total_charges=90";

    #[tokio::test]
    async fn test_api_predict() {
        let (app, state) = ready_app(predictor_with(Arc::new(FixedModel::new(0.55))));
        let body = serde_json::to_string(&new_fiber_customer()).unwrap();

        let response = app.oneshot(json_request("/api/predict", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["tier"], "medium");
        assert_eq!(json["profile"]["timeline"], "1-2 weeks");
        assert_eq!(json["profile"]["expected_retention"], "50%");
        assert_eq!(json["risk_factors"].as_array().unwrap().len(), 5);
        assert_eq!(state.metrics.snapshot().predictions, 1);
    }

    #[tokio::test]
    async fn test_api_rejects_inconsistent_record() {
        let (app, state) = ready_app(predictor_with(Arc::new(FixedModel::new(0.55))));
        let record = CustomerRecord {
            online_backup: crate::types::customer::AddOn::NoInternetService,
            ..new_fiber_customer()
        };
        let body = serde_json::to_string(&record).unwrap();

        let response = app.oneshot(json_request("/api/predict", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let text = body_string(response).await;
        assert!(text.contains("online_backup"));
        assert_eq!(state.metrics.snapshot().rejected_records, 1);
    }

    #[tokio::test]
    async fn test_prediction_failure_reported_verbatim() {
        let (app, _) = ready_app(predictor_with(Arc::new(BrokenModel)));
        let body = serde_json::to_string(&new_fiber_customer()).unwrap();

        let response = app.oneshot(json_request("/api/predict", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"], "model broken inference failed: tensor shape mismatch");
    }

    #[tokio::test]
    async fn test_disabled_service_refuses_predictions() {
        let reason = "failed to read artifact models/scaler.json: No such file or directory";
        let body = serde_json::to_string(&new_fiber_customer()).unwrap();

        let response = disabled_app(reason)
            .oneshot(json_request("/api/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"], reason);

        let response = disabled_app(reason)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "disabled");
        assert_eq!(json["error"], reason);
    }

    #[tokio::test]
    async fn test_disabled_index_shows_load_error() {
        let response = disabled_app("scaler is missing parameters")
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("scaler is missing parameters"));
    }

    #[tokio::test]
    async fn test_form_submission_renders_results() {
        let (app, _) = ready_app(predictor_with(Arc::new(FixedModel::new(0.9))));
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(FORM_BODY))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("90.0%"));
        assert!(html.contains("URGENT ACTION REQUIRED"));
        assert!(html.contains("Contract: Month-to-month"));
        assert!(html.contains("Only 1 months - critical period"));
        assert!(html.contains("Payment: E-check"));
        assert!(html.contains("$90/month - above average"));
        assert!(html.contains("Internet: Fiber"));
    }

    #[tokio::test]
    async fn test_form_without_internet_uses_sentinels() {
        let (app, state) = ready_app(predictor_with(Arc::new(FixedModel::new(0.1))));
        let body = "gender=Female&senior_citizen=No&partner=Yes&dependents=Yes&tenure=60\
            &contract=Two+year&paperless_billing=No&payment_method=Mailed+check\
            &phone_service=No&internet_service=No&monthly_charges=20&total_charges=1200";
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("No significant risk factors detected"));
        assert_eq!(state.metrics.snapshot().low, 1);
    }

    #[tokio::test]
    async fn test_unparseable_form_renders_error_page() {
        let (app, state) = ready_app(predictor_with(Arc::new(FixedModel::new(0.5))));
        let body = FORM_BODY.replace("tenure=1", "tenure=-1");
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );

        let html = body_string(response).await;
        assert!(html.contains("Error during prediction"));
        assert!(html.contains("<form method=\"post\" action=\"/predict\">"));
        assert_eq!(state.metrics.snapshot().rejected_records, 1);
        assert_eq!(state.metrics.snapshot().predictions, 0);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_json_error() {
        let (app, state) = ready_app(predictor_with(Arc::new(FixedModel::new(0.5))));

        let response = app
            .oneshot(json_request("/api/predict", "{\"tenure\": ".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(!json["error"].as_str().unwrap().is_empty());
        assert_eq!(state.metrics.snapshot().rejected_records, 1);
    }

    #[tokio::test]
    async fn test_logistic_artifacts_end_to_end() {
        let (_dir, artifacts) = write_artifacts();
        let predictor = ModelLoader::new(artifacts)
            .load_predictor(RiskTierThresholds::default())
            .unwrap();
        let (app, _) = ready_app(predictor);
        let body = serde_json::to_string(&new_fiber_customer()).unwrap();

        let response = app.oneshot(json_request("/api/predict", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        let probability = json["probability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&probability));
        assert_eq!(json["model"], "test_logistic");
    }
}

use axum::{extract::State, response::Json};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::{sync::Arc, time::Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    decision::UNAVAILABLE_CONFIDENCE,
    error::{validation_error, AppError},
    extract::PageFetcher,
    pipeline::Analyzer,
    types::{AnalysisResponse, AnalyzeRequest, Prediction, PredictRequest, PredictionResponse, Verdict},
};

/// Shown in place of page markup when a page could not be fetched.
pub const FETCH_FAILURE_PLACEHOLDER: &str = "No se pudo obtener el contenido de la URL.";

pub struct AppContext {
    pub analyzer: Analyzer,
    pub fetcher: PageFetcher,
    pub metrics: Option<PrometheusHandle>,
}

pub type AppState = Arc<AppContext>;

pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Json<PredictionResponse> {
    let request_id = Uuid::new_v4();
    let prediction = timed_predict(&state.analyzer, &request.title, &request.body);
    debug!("Request {}: {} ({})", request_id, prediction.verdict, prediction.confidence);

    Json(PredictionResponse {
        request_id,
        verdict: prediction.verdict,
        confidence: prediction.confidence,
        analyzed_text: prediction.analyzed_text,
        model_version: state.analyzer.model_version().to_string(),
    })
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let url = request.url.trim();
    validate_url(url)?;

    info!("Request {}: analyzing {}", request_id, url);

    let (prediction, markup) = match state.fetcher.fetch_and_extract(url).await {
        Ok(page) => (timed_predict(&state.analyzer, &page.title, &page.body), page.markup),
        Err(_) => {
            metrics::counter!("analyze_failures_total").increment(1);
            let failed = Prediction {
                verdict: Verdict::AnalysisError,
                confidence: UNAVAILABLE_CONFIDENCE.to_string(),
                analyzed_text: UNAVAILABLE_CONFIDENCE.to_string(),
            };
            (failed, FETCH_FAILURE_PLACEHOLDER.to_string())
        }
    };

    Ok(Json(AnalysisResponse {
        request_id,
        verdict: prediction.verdict,
        confidence: prediction.confidence,
        analyzed_text: prediction.analyzed_text,
        url: url.to_string(),
        markup,
        model_version: state.analyzer.model_version().to_string(),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "model_version": state.analyzer.model_version(),
        "features": state.analyzer.feature_count(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

fn timed_predict(analyzer: &Analyzer, title: &str, body: &str) -> Prediction {
    let start = Instant::now();
    let prediction = analyzer.predict(title, body);

    metrics::histogram!("prediction_duration_ms").record(start.elapsed().as_secs_f64() * 1000.0);
    metrics::counter!("predictions_total", "verdict" => prediction.verdict.as_str()).increment(1);
    prediction
}

fn validate_url(raw: &str) -> Result<(), AppError> {
    if raw.is_empty() {
        return Err(validation_error("URL cannot be empty"));
    }
    let parsed = url::Url::parse(raw).map_err(|e| AppError::InvalidInput(format!("Invalid URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::InvalidInput(format!("Unsupported URL scheme: {}", other))),
    }
}

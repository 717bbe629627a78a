//! Authentic-vs-fabricated scoring for Spanish news text, using a binary-feature
//! linear classifier whose features, weights and thresholds were tuned offline.
//!
//! Pipeline: [`normalize`] → [`vectorize`] → [`selection`] → [`model`] →
//! [`decision`], assembled by [`pipeline::Analyzer`] from the
//! [`artifacts`] store.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod artifacts;
pub mod config;
pub mod decision;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod routes;
pub mod selection;
pub mod stopwords;
pub mod types;
pub mod vectorize;

pub use pipeline::Analyzer;
pub use routes::{AppContext, AppState};
pub use types::{Prediction, Verdict};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(routes::predict))
        .route("/analyze", post(routes::analyze))
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

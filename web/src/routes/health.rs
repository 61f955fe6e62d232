//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use kana_classifier::WeightsSource;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    weights: WeightsSource,
    started_at: DateTime<Utc>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// GET /health - liveness plus which weights the classifier runs with.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        weights: state.classifier.weights(),
        started_at: state.started_at,
    })
}

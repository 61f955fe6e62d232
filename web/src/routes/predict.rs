//! JSON prediction API.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use kana_classifier::Kana;
use serde::Serialize;

use super::upload::{receive_file, save_and_classify};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/predict", post(predict))
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub class: Kana,
    pub class_index: usize,
    pub romaji: &'static str,
    /// Percentage, two decimals.
    pub confidence: String,
    pub image_url: String,
    pub probabilities: Vec<ClassProbability>,
}

#[derive(Debug, Serialize)]
pub struct ClassProbability {
    pub class: Kana,
    pub probability: f32,
}

/// POST /api/predict - same pipeline as the form, answered as JSON.
async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let file = receive_file(multipart).await?;
    let classified = save_and_classify(&state, file).await?;
    let prediction = &classified.prediction;

    Ok(Json(PredictResponse {
        class: prediction.class,
        class_index: prediction.class_index,
        romaji: prediction.class.romaji(),
        confidence: prediction.confidence_label(),
        image_url: classified.image_url(),
        probabilities: Kana::ALL
            .iter()
            .zip(&prediction.probabilities)
            .map(|(&class, &probability)| ClassProbability { class, probability })
            .collect(),
    }))
}

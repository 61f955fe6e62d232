//! Image upload and classification.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::routing::post;
use axum::Router;
use kana_classifier::Prediction;

use crate::error::{Error, Result};
use crate::state::AppState;
use crate::templates;
use crate::upload;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/upload", post(upload_file))
}

/// The `file` part of an upload form.
#[derive(Debug)]
pub struct ReceivedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// A stored and classified upload.
#[derive(Debug)]
pub struct Classified {
    pub stored_name: String,
    pub prediction: Prediction,
}

impl Classified {
    pub fn image_url(&self) -> String {
        format!("/uploads/{}", self.stored_name)
    }
}

/// Pull the `file` field out of the form and check its name.
///
/// Only parts carrying a `filename` count as the file. A request that is not
/// multipart at all is treated like a form without a file part.
pub async fn receive_file(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ReceivedFile> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("Not a multipart request: {}", rejection);
        Error::NoFilePart
    })?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A part without a filename parameter is a plain form value.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = field.bytes().await?;
        tracing::info!("Received file: {:?} ({} bytes)", filename, bytes.len());

        if filename.is_empty() {
            return Err(Error::NoSelectedFile);
        }
        if !upload::allowed_file(&filename) {
            return Err(Error::InvalidFileType);
        }
        return Ok(ReceivedFile { filename, bytes });
    }

    Err(Error::NoFilePart)
}

/// Persist the upload, then classify it on the blocking pool.
pub async fn save_and_classify(state: &AppState, file: ReceivedFile) -> Result<Classified> {
    let stored_name = upload::storage_name(&file.filename).ok_or(Error::InvalidFileType)?;

    let path = state
        .uploads
        .save(&stored_name, &file.bytes)
        .await
        .map_err(Error::Save)?;
    tracing::info!("File saved to {}", path.display());

    let classifier = state.classifier.clone();
    let bytes = file.bytes;
    let prediction =
        tokio::task::spawn_blocking(move || classifier.classify_image(&bytes)).await??;

    tracing::info!(
        file = %stored_name,
        class = %prediction.class,
        confidence = %prediction.confidence_label(),
        "Prediction complete"
    );

    Ok(Classified {
        stored_name,
        prediction,
    })
}

/// POST /upload - classify the uploaded image and render the result page.
async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Html<String>> {
    let file = receive_file(multipart).await?;
    let classified = save_and_classify(&state, file).await?;

    Ok(Html(templates::result_page(
        &classified.image_url(),
        &classified.prediction,
        &state.classifier.weights(),
    )))
}

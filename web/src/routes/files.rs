//! Serves stored uploads back to the browser.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::error::{Error, Result};
use crate::state::AppState;
use crate::upload;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/uploads/:filename", get(serve_file))
}

/// GET /uploads/:filename - any failure is reported as 404.
async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse> {
    tracing::debug!(
        "Serving {} from {}",
        filename,
        state.uploads.dir().display()
    );

    let bytes = state
        .uploads
        .read(&filename)
        .await
        .map_err(|e| Error::NotFound(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, upload::content_type(&filename))], bytes))
}

//! Upload form page.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::templates;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}

/// GET / - the upload form.
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(templates::index_page(&state.classifier.weights()))
}

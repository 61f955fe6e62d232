//! HTTP routes.

pub mod files;
pub mod health;
pub mod index;
pub mod predict;
pub mod upload;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the router for all page and API routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(index::router())
        .merge(upload::router())
        .merge(files::router())
        .merge(health::router())
        .nest("/api", predict::router().layer(CorsLayer::permissive()))
}

//! KMNIST demo web server.
//!
//! Upload form, classification of the uploaded image and the stored-file
//! route, assembled into one axum [`Router`] by [`app`].

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod templates;
pub mod upload;

pub use config::Config;
pub use error::{ApiError, Error};
pub use state::AppState;
pub use upload::UploadStore;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.upload.max_bytes;
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(routes::router())
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(logging::request_logger))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

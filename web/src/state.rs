//! Shared application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kana_classifier::Classifier;

use crate::config::Config;
use crate::upload::UploadStore;

/// Shared application state passed to all handlers.
pub struct AppState {
    pub config: Config,
    /// Loaded once at startup and shared by every request.
    pub classifier: Arc<dyn Classifier>,
    pub uploads: UploadStore,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, classifier: Arc<dyn Classifier>) -> Self {
        let uploads = UploadStore::new(&config.upload.dir);
        Self {
            config,
            classifier,
            uploads,
            started_at: Utc::now(),
        }
    }
}

//! Error types for the classifier.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("model error: {0}")]
    Model(#[from] candle_core::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to load weights from {}: {source}", path.display())]
    Weights {
        path: PathBuf,
        #[source]
        source: candle_core::Error,
    },
}

pub type Result<T> = std::result::Result<T, ClassifierError>;

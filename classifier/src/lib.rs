//! KMNIST kana classifier
//!
//! Image preprocessing and ConvNet inference shared by the web server.

pub mod classifier;
pub mod error;
pub mod labels;
pub mod model;
pub mod preprocess;

pub use classifier::{Classifier, ConvNetClassifier, Prediction, WeightsSource};
pub use error::{ClassifierError, Result};
pub use labels::{Kana, NUM_CLASSES};
pub use model::ConvNet;

pub use candle_core::Device;

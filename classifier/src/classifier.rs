//! Inference over the ConvNet.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Module};
use candle_nn::{VarBuilder, VarMap};
use serde::Serialize;

use crate::error::{ClassifierError, Result};
use crate::labels::{Kana, NUM_CLASSES};
use crate::model::ConvNet;
use crate::preprocess;

/// Where the network's parameters came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WeightsSource {
    /// Loaded from a PyTorch state dict.
    Pretrained { path: PathBuf },
    /// No weights file was found; parameters are freshly initialised.
    Untrained,
}

impl WeightsSource {
    pub fn is_pretrained(&self) -> bool {
        matches!(self, WeightsSource::Pretrained { .. })
    }
}

/// Result of classifying one image.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub class: Kana,
    pub class_index: usize,
    /// Softmax probability of `class`, in [0, 1].
    pub confidence: f32,
    /// Softmax output for every class, in logit order.
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Pick the most probable class from a softmax output.
    pub fn from_probabilities(probabilities: Vec<f32>) -> Result<Self> {
        if probabilities.len() != NUM_CLASSES {
            return Err(ClassifierError::InvalidInput(format!(
                "expected {} class probabilities, got {}",
                NUM_CLASSES,
                probabilities.len()
            )));
        }

        // Ties go to the lowest index.
        let (class_index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .rev()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| ClassifierError::InvalidInput("empty probabilities".to_string()))?;

        let class = Kana::from_index(class_index).ok_or_else(|| {
            ClassifierError::InvalidInput(format!("class index {} out of range", class_index))
        })?;

        Ok(Self {
            class,
            class_index,
            confidence,
            probabilities,
        })
    }

    pub fn confidence_percent(&self) -> f32 {
        self.confidence * 100.0
    }

    /// Confidence as a percentage with two decimals, e.g. `"97.31"`.
    pub fn confidence_label(&self) -> String {
        format!("{:.2}", self.confidence_percent())
    }

    /// Classes ordered by descending probability.
    pub fn ranked(&self) -> Vec<(Kana, f32)> {
        let mut ranked: Vec<(Kana, f32)> = Kana::ALL
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// A model that maps a preprocessed image to a KMNIST class.
pub trait Classifier: Send + Sync {
    /// Classify normalized 28x28 pixels (see [`preprocess::to_input_pixels`]).
    fn classify(&self, pixels: &[f32]) -> Result<Prediction>;

    /// Where the parameters were loaded from.
    fn weights(&self) -> WeightsSource;

    /// Decode, preprocess and classify encoded image bytes.
    fn classify_image(&self, bytes: &[u8]) -> Result<Prediction> {
        let pixels = preprocess::preprocess_bytes(bytes)?;
        self.classify(&pixels)
    }
}

/// [`Classifier`] backed by the candle [`ConvNet`].
pub struct ConvNetClassifier {
    net: ConvNet,
    device: Device,
    weights: WeightsSource,
}

impl ConvNetClassifier {
    /// Load weights from a `.pth` state dict.
    ///
    /// A missing file is not an error: the network is built with random
    /// parameters and a warning is logged. A file that exists but cannot be
    /// read is an error.
    pub fn load(path: impl AsRef<Path>, device: Device) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Model file not found at {}, using untrained weights", path.display());
            return Self::untrained(device);
        }

        let weights_err = |source| ClassifierError::Weights {
            path: path.to_path_buf(),
            source,
        };
        let vb = VarBuilder::from_pth(path, DType::F32, &device).map_err(weights_err)?;
        let net = ConvNet::new(vb).map_err(weights_err)?;
        tracing::info!("Model loaded from {}", path.display());

        Ok(Self {
            net,
            device,
            weights: WeightsSource::Pretrained {
                path: path.to_path_buf(),
            },
        })
    }

    /// Build the network with freshly initialised parameters.
    pub fn untrained(device: Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let net = ConvNet::new(vb)?;

        Ok(Self {
            net,
            device,
            weights: WeightsSource::Untrained,
        })
    }
}

impl Classifier for ConvNetClassifier {
    fn classify(&self, pixels: &[f32]) -> Result<Prediction> {
        let input = preprocess::to_tensor(pixels, &self.device)?;
        let logits = self.net.forward(&input)?;
        let probabilities = candle_nn::ops::softmax(&logits, 1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;

        let prediction = Prediction::from_probabilities(probabilities)?;
        tracing::debug!(
            class = %prediction.class,
            confidence = prediction.confidence,
            "Classified image"
        );
        Ok(prediction)
    }

    fn weights(&self) -> WeightsSource {
        self.weights.clone()
    }
}

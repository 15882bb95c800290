#[cfg(feature = "onnx")]
pub mod onnx;
#[cfg(feature = "torch")]
pub mod torch;

use ndarray::Array4;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ImageConfig;

/// Normalized NHWC batch of one image, values in `[0, 1]`.
pub type InputTensor = Array4<f32>;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Failed to load model {path}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("Unsupported model artifact: {0}")]
    UnsupportedArtifact(String),
    #[error("Model error: {0}")]
    Model(String),
    #[error("Model returned no comparable scores")]
    NoScores,
}

#[cfg(feature = "torch")]
impl From<tch::TchError> for InferenceError {
    fn from(err: tch::TchError) -> Self {
        InferenceError::Model(err.to_string())
    }
}

/// A loaded, immutable image classifier shared by every request.
pub trait Classifier: Send + Sync {
    /// Runs one forward pass and returns one score per class.
    fn predict(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError>;

    /// Width of the score vector, when the artifact declares it.
    fn num_classes(&self) -> Option<usize> {
        None
    }
}

/// Label table in the model's training-time index order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNames(Vec<String>);

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn label_for(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Index and value of the highest score. Ties go to the lowest index and
/// NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

/// Loads the artifact at `path`, picking the backend from its extension.
#[cfg_attr(not(feature = "onnx"), allow(unused_variables))]
pub fn load(path: &Path, image: &ImageConfig) -> Result<Arc<dyn Classifier>, InferenceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    log::info!("Loading model from {}", path.display());

    match extension.as_deref() {
        #[cfg(feature = "onnx")]
        Some("onnx") => Ok(Arc::new(onnx::OnnxClassifier::load(path, image)?)),
        #[cfg(feature = "torch")]
        Some("pt") | Some("ts") => Ok(Arc::new(torch::TorchClassifier::load(path)?)),
        _ => Err(InferenceError::UnsupportedArtifact(format!(
            "{} (no enabled backend handles this extension)",
            path.display()
        ))),
    }
}

/// Fails when the artifact reports a score width that disagrees with the
/// label table.
pub fn check_class_count(
    classifier: &dyn Classifier,
    class_names: &ClassNames,
) -> Result<(), InferenceError> {
    match classifier.num_classes() {
        Some(n) if n != class_names.len() => Err(InferenceError::Model(format!(
            "model produces {} scores but {} class names are configured",
            n,
            class_names.len()
        ))),
        Some(_) => Ok(()),
        None => {
            log::warn!("Model does not declare its output width; class table is unchecked");
            Ok(())
        }
    }
}

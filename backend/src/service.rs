use std::sync::Arc;

use shared::ImageExtension;

use crate::classifier::{argmax, ClassNames, Classifier, InferenceError};
use crate::config::ImageConfig;
use crate::error::PredictError;
use crate::preprocess::{decode_image, to_input_tensor};
use crate::storage::scratch::ScratchDir;
use crate::upload::UploadedFile;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub class_index: usize,
    pub confidence: f32,
    pub scores: Vec<f32>,
}

/// Classifies uploads against one shared model. Cheap to share across
/// workers; holds no per-request state.
#[derive(Clone)]
pub struct PredictionService {
    classifier: Arc<dyn Classifier>,
    class_names: ClassNames,
    image: ImageConfig,
    scratch: ScratchDir,
    max_upload_bytes: usize,
}

impl PredictionService {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        class_names: ClassNames,
        image: ImageConfig,
        scratch: ScratchDir,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            classifier,
            class_names,
            image,
            scratch,
            max_upload_bytes,
        }
    }

    pub fn class_names(&self) -> &ClassNames {
        &self.class_names
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Validates, stores, decodes and classifies one upload. The stored copy
    /// is removed on every exit path.
    pub fn classify(&self, upload: UploadedFile) -> Result<Prediction, PredictError> {
        let extension = ImageExtension::from_filename(&upload.filename)
            .ok_or(PredictError::UnsupportedFileType)?;

        let stored = self.scratch.persist(&upload.bytes, extension)?;
        let rgb = decode_image(stored.path(), &self.image)?;
        let input = to_input_tensor(&rgb);

        let scores = self.classifier.predict(&input)?;
        let (class_index, confidence) = argmax(&scores).ok_or(InferenceError::NoScores)?;
        let label = self
            .class_names
            .label_for(class_index)
            .ok_or(PredictError::ClassIndexOutOfRange {
                index: class_index,
                classes: self.class_names.len(),
            })?
            .to_string();

        log::info!(
            "Upload {} ({}) classified as {} (index {}, score {:.4})",
            stored.key(),
            upload.filename,
            label,
            class_index,
            confidence
        );
        drop(stored);

        Ok(Prediction {
            label,
            class_index,
            confidence,
            scores,
        })
    }
}

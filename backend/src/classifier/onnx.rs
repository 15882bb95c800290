use std::path::Path;
use tract_onnx::prelude::*;

use super::{Classifier, InferenceError, InputTensor};
use crate::config::ImageConfig;

/// ONNX artifact executed by tract. The optimized plan is immutable and is
/// run concurrently without locking.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    num_classes: Option<usize>,
}

impl OnnxClassifier {
    pub fn load(path: &Path, image: &ImageConfig) -> Result<Self, InferenceError> {
        let load_error = |e: TractError| InferenceError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let input_shape = [1, image.height() as usize, image.width() as usize, 3];
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.with_input_fact(0, f32::fact(input_shape).into()))
            .and_then(|m| m.into_optimized())
            .map_err(load_error)?;

        let num_classes = model
            .output_fact(0)
            .ok()
            .and_then(|fact| fact.shape.as_concrete().and_then(|dims| dims.last().copied()));

        let plan = model.into_runnable().map_err(load_error)?;
        log::info!(
            "ONNX model ready: input {:?}, output width {:?}",
            input_shape,
            num_classes
        );

        Ok(Self { plan, num_classes })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        let model_error = |e: TractError| InferenceError::Model(e.to_string());

        let input = input.as_standard_layout();
        let data = input
            .as_slice()
            .ok_or_else(|| InferenceError::Model("input tensor is not contiguous".into()))?;
        let tensor = Tensor::from_shape(input.shape(), data).map_err(model_error)?;

        let outputs = self.plan.run(tvec!(tensor.into())).map_err(model_error)?;
        let scores = outputs
            .first()
            .ok_or(InferenceError::NoScores)?
            .to_array_view::<f32>()
            .map_err(model_error)?
            .iter()
            .copied()
            .collect();
        Ok(scores)
    }

    fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }
}

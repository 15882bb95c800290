use std::path::Path;
use std::sync::Mutex;
use tch::{CModule, Device, Kind, Tensor};

use super::{Classifier, InferenceError, InputTensor};

/// TorchScript artifact. Exported modules expect channels-first input, so the
/// NHWC tensor is permuted before the forward pass.
pub struct TorchClassifier {
    model: Mutex<CModule>,
    device: Device,
}

impl TorchClassifier {
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        let mut model = CModule::load_on_device(path, device).map_err(|e| InferenceError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        model.set_eval();
        log::info!("TorchScript model ready on {:?}", device);

        Ok(Self {
            model: Mutex::new(model),
            device,
        })
    }
}

impl Classifier for TorchClassifier {
    fn predict(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        let (batch, height, width, channels) = input.dim();
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_slice(&data)
            .view([batch as i64, height as i64, width as i64, channels as i64])
            .permute([0, 3, 1, 2])
            .to_device(self.device);

        let output = self
            .model
            .lock()
            .map_err(|_| InferenceError::Model("model lock poisoned".into()))?
            .forward_ts(&[tensor])?;

        let output_flat = output.to_kind(Kind::Float).to_device(Device::Cpu).view([-1]);
        Ok(Vec::<f32>::try_from(&output_flat)?)
    }
}

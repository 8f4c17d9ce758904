use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{BackendKind, ClassLabel};
use tch::{CModule, Device, Kind, Tensor};

use crate::error::{ModelLoadError, PredictError};
use crate::inference::{Distribution, ImageTensor};

/// A function from an image tensor to a probability distribution over the
/// disease classes. Implemented by the trained model and by the mock, so
/// deterministic stubs can stand in during tests.
pub trait InferenceBackend: Send + Sync {
    fn kind(&self) -> BackendKind;
    fn predict(&self, input: &ImageTensor) -> Result<Distribution, PredictError>;
}

/// Wraps the TorchScript classification model. Loaded once at startup; a
/// load failure leaves the process permanently without a primary backend.
pub struct ModelBackend {
    // CModule forward passes are not guaranteed reentrant, so concurrent
    // requests are serialized through this lock.
    module: Mutex<CModule>,
}

impl ModelBackend {
    pub fn load(model_path: &str) -> Result<Self, ModelLoadError> {
        let device = Device::cuda_if_available();
        let module = CModule::load_on_device(model_path, device)?;
        Ok(Self {
            module: Mutex::new(module),
        })
    }
}

impl InferenceBackend for ModelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Model
    }

    fn predict(&self, input: &ImageTensor) -> Result<Distribution, PredictError> {
        let (batch, height, width, channels) = input.0.dim();
        // NHWC in, NCHW for the module.
        let chw: Vec<f32> = input.0.view().permuted_axes([0, 3, 1, 2]).iter().copied().collect();
        let tensor = Tensor::from_slice(&chw).view([
            batch as i64,
            channels as i64,
            height as i64,
            width as i64,
        ]);

        let module = self.module.lock().map_err(|_| PredictError::Poisoned)?;
        let output = module.forward_ts(&[tensor])?;
        drop(module);

        let probs = output.softmax(-1, Kind::Float).view([-1]);
        let count = probs.size()[0] as usize;
        if count != ClassLabel::ALL.len() {
            return Err(PredictError::UnexpectedShape(count));
        }
        let mut scores = vec![0.0f32; count];
        probs.to_kind(Kind::Float).copy_data(&mut scores, count);

        let mut percents = [0.0f32; ClassLabel::ALL.len()];
        for (percent, score) in percents.iter_mut().zip(scores) {
            *percent = score * 100.0;
        }
        Ok(Distribution::new(percents))
    }
}

/// Stand-in used whenever the trained model is unavailable or fails for a
/// request: three independent uniforms in [10, 95], normalized to sum 100.
pub struct MockBackend {
    rng: Mutex<StdRng>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible variant for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    fn predict(&self, _input: &ImageTensor) -> Result<Distribution, PredictError> {
        let mut rng = self.rng.lock().map_err(|_| PredictError::Poisoned)?;
        let mut raw = [0.0f32; ClassLabel::ALL.len()];
        for value in raw.iter_mut() {
            *value = rng.random_range(10.0..=95.0);
        }
        let total: f32 = raw.iter().sum();
        let mut percents = [0.0f32; ClassLabel::ALL.len()];
        for (percent, value) in percents.iter_mut().zip(raw) {
            *percent = value / total * 100.0;
        }
        Ok(Distribution::new(percents))
    }
}

// ============================================================
// Layer 5 — Noise Injection
// ============================================================
// Corrupts a clean batch before the forward pass. The clean
// batch itself stays the loss target:
//
//   noised         = noise(clean.clone())
//   reconstruction = model(noised)
//   loss           = criterion(reconstruction, clean)
//
// Gaussian noise draws N(mean, std) independently per element,
// which is the same as clean + randn * std + mean.

use burn::{prelude::*, tensor::Distribution};
use serde::{Deserialize, Serialize};

/// A stateless corruption applied to every input batch.
pub trait Noise {
    fn apply<B: Backend>(&self, clean: Tensor<B, 2>) -> Tensor<B, 2>;
}

/// Additive Gaussian noise, drawn from the backend's RNG.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianNoise {
    pub mean: f64,
    pub std:  f64,
}

impl Default for GaussianNoise {
    fn default() -> Self {
        Self { mean: 0.0, std: 1.0 }
    }
}

impl Noise for GaussianNoise {
    fn apply<B: Backend>(&self, clean: Tensor<B, 2>) -> Tensor<B, 2> {
        let noise = Tensor::random(
            clean.shape(),
            Distribution::Normal(self.mean, self.std),
            &clean.device(),
        );
        clean + noise
    }
}

/// Identity: the model sees exactly the clean input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoNoise;

impl Noise for NoNoise {
    fn apply<B: Backend>(&self, clean: Tensor<B, 2>) -> Tensor<B, 2> {
        clean
    }
}

/// Config-selectable noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NoiseKind {
    Gaussian { mean: f64, std: f64 },
    None,
}

impl Default for NoiseKind {
    fn default() -> Self {
        let GaussianNoise { mean, std } = GaussianNoise::default();
        NoiseKind::Gaussian { mean, std }
    }
}

impl Noise for NoiseKind {
    fn apply<B: Backend>(&self, clean: Tensor<B, 2>) -> Tensor<B, 2> {
        match *self {
            NoiseKind::Gaussian { mean, std } => GaussianNoise { mean, std }.apply(clean),
            NoiseKind::None => NoNoise.apply(clean),
        }
    }
}

// ============================================================
// Layer 4 — Autoencoder Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<Sample> into
// one [batch_size, feature_dim] float tensor.
//
//   Input:  N samples, each with D features
//   Output: AutoencoderBatch { inputs: [N, D] }
//
// Features are flattened row by row, then reshaped:
//   [s1_f1, ..., s1_fD, s2_f1, ..., sN_fD] → [N, D]
//
// Labels are dropped here: the clean input is its own target.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::Sample;

/// A batch of clean inputs. B is the backend the tensors live on;
/// the training source uses the autodiff backend, validation and
/// test use its inner backend.
#[derive(Debug, Clone)]
pub struct AutoencoderBatch<B: Backend> {
    /// Clean inputs — shape: [batch_size, feature_dim]
    pub inputs: Tensor<B, 2>,
}

/// Holds the target device so tensors are created where the model lives.
#[derive(Clone, Debug)]
pub struct AutoencoderBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> AutoencoderBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<Sample, AutoencoderBatch<B>> for AutoencoderBatcher<B> {
    fn batch(&self, items: Vec<Sample>) -> AutoencoderBatch<B> {
        let batch_size  = items.len();
        // All samples share one width (checked by the loader)
        let feature_dim = items.first().map(|s| s.features.len()).unwrap_or(0);

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, feature_dim]);

        AutoencoderBatch { inputs }
    }
}

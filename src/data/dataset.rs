// ============================================================
// Layer 4 — Sample Dataset
// ============================================================
// In-memory rows of one CSV file, exposed to burn's data
// pipeline through the Dataset trait.
//
// Reference: Burn Book §4 (Dataset)

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One clean input vector. The label is auxiliary data carried
/// through from the source file; reconstruction never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub features: Vec<f32>,
    pub label:    Option<f32>,
}

impl Sample {
    pub fn new(features: Vec<f32>) -> Self {
        Self { features, label: None }
    }

    pub fn with_label(mut self, label: f32) -> Self {
        self.label = Some(label);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SampleDataset {
    samples: Vec<Sample>,
}

impl SampleDataset {
    pub fn new(samples: Vec<Sample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Width of every sample, None for an empty dataset
    pub fn feature_dim(&self) -> Option<usize> {
        self.samples.first().map(|s| s.features.len())
    }
}

impl Dataset<Sample> for SampleDataset {
    fn get(&self, index: usize) -> Option<Sample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

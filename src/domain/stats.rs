// ============================================================
// Layer 3 — Pass Statistics
// ============================================================
// Accumulates per-batch losses over one full pass of a batch
// source and turns them into the pass's mean loss.
//
// The mean is taken over the number of batches, not samples:
// a short final batch weighs as much as a full one.
//
//   batches: [1.0 (20 samples), 3.0 (5 samples)]
//   mean   = (1.0 + 3.0) / 2 = 2.0
//
// An empty pass is an error rather than 0/0 = NaN.

use crate::domain::error::{TrainError, TrainResult};
use crate::domain::split::Split;

#[derive(Debug, Clone, PartialEq)]
pub struct PassStats {
    split:    Split,
    batches:  usize,
    loss_sum: f64,
}

impl PassStats {
    pub fn new(split: Split) -> Self {
        Self { split, batches: 0, loss_sum: 0.0 }
    }

    /// Add one batch's scalar loss
    pub fn record(&mut self, batch_loss: f64) {
        self.loss_sum += batch_loss;
        self.batches  += 1;
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Arithmetic mean of the recorded batch losses.
    pub fn mean(&self) -> TrainResult<f64> {
        if self.batches == 0 {
            return Err(TrainError::EmptyDataset { split: self.split });
        }
        Ok(self.loss_sum / self.batches as f64)
    }
}

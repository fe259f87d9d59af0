// ============================================================
// Layer 3 — Loss History
// ============================================================
// Per-epoch record of a training session:
//
//   loss_train:   epoch → mean training loss
//   loss_valid:   epoch → mean validation loss
//   valid_epochs: epochs whose validation loss set a new best
//                 (and therefore wrote a checkpoint)
//
// BTreeMap keeps keys unique and iterates in epoch order,
// which is what a loss-curve plot consumes. Both maps always
// have the same keys: an epoch is recorded as a whole or not
// at all.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything one completed epoch produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    pub epoch:        usize,
    pub train_loss:   f64,
    pub valid_loss:   f64,
    /// True if this epoch's validation loss was a new best
    pub checkpointed: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LossHistory {
    loss_train:   BTreeMap<usize, f64>,
    loss_valid:   BTreeMap<usize, f64>,
    valid_epochs: Vec<usize>,
}

impl LossHistory {
    pub fn record(&mut self, report: &EpochReport) {
        self.loss_train.insert(report.epoch, report.train_loss);
        self.loss_valid.insert(report.epoch, report.valid_loss);
        if report.checkpointed {
            self.valid_epochs.push(report.epoch);
        }
    }

    pub fn loss_train(&self) -> &BTreeMap<usize, f64> {
        &self.loss_train
    }

    pub fn loss_valid(&self) -> &BTreeMap<usize, f64> {
        &self.loss_valid
    }

    pub fn valid_epochs(&self) -> &[usize] {
        &self.valid_epochs
    }

    /// Number of recorded epochs
    pub fn len(&self) -> usize {
        self.loss_train.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loss_train.is_empty()
    }

    /// Epoch and loss of the most recent checkpoint, which is also
    /// the lowest validation loss among checkpointed epochs.
    pub fn last_checkpoint(&self) -> Option<(usize, f64)> {
        let epoch = *self.valid_epochs.last()?;
        self.loss_valid.get(&epoch).map(|&loss| (epoch, loss))
    }

}

// ============================================================
// Layer 3 — Core Traits (Capabilities)
// ============================================================
// The training controller never inspects concrete types.
// It sees its collaborators only through these traits:
//
//   BatchSource   — a finite, restartable sequence of batches
//                   (burn DataLoader in production, a Vec in tests)
//   Learner       — model + optimizer + sources + checkpoints,
//                   everything an epoch needs, behind scalar losses
//   EpochObserver — gets told about every completed epoch
//                   (metrics export)
//
// Keeping these free of burn types lets the state machine be
// tested with scripted losses and no tensors at all.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use crate::domain::error::TrainResult;
use crate::domain::history::EpochReport;
use crate::domain::split::Split;

// ─── BatchSource ──────────────────────────────────────────────────────────────
/// A finite sequence of batches that can be iterated any number of times.
///
/// Implementations:
///   - LoaderSource → wraps a burn DataLoader
///   - Vec<T>       → pre-built batches (tests, small in-memory data)
pub trait BatchSource<T> {
    /// Start a fresh pass from the first batch
    fn batches(&self) -> Box<dyn Iterator<Item = T> + '_>;

    /// Number of batches one pass yields
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> BatchSource<T> for Vec<T> {
    fn batches(&self) -> Box<dyn Iterator<Item = T> + '_> {
        Box::new(self.iter().cloned())
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

// ─── Learner ──────────────────────────────────────────────────────────────────
/// Everything the training controller delegates.
///
/// Implementations:
///   - BurnLearner → real model, optimizer and data loaders
///   - (tests)     → scripted loss sequences
pub trait Learner {
    type Model: Clone;

    /// One backpropagating pass over the train source; mean batch loss
    fn train_epoch(&mut self) -> TrainResult<f64>;

    /// One pass without parameter updates; mean batch loss
    fn evaluate(&mut self, split: Split) -> TrainResult<f64>;

    /// Persist the current model, overwriting any previous checkpoint
    fn save_checkpoint(&mut self) -> TrainResult<()>;

    /// Restore the last persisted model
    fn load_checkpoint(&self) -> TrainResult<Self::Model>;

    fn checkpoint_path(&self) -> &Path;

    /// The in-memory model as it is right now
    fn model(&self) -> &Self::Model;

    /// Replace the in-memory model (e.g. with the best checkpoint)
    fn set_model(&mut self, model: Self::Model);
}

// ─── EpochObserver ────────────────────────────────────────────────────────────
/// Notified after every completed epoch.
pub trait EpochObserver {
    fn on_epoch(&mut self, report: &EpochReport) -> TrainResult<()>;
}

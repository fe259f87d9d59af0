// ============================================================
// Layer 3 — Improvement and Patience Rules
// ============================================================
// The two decisions the training controller makes every epoch:
//
//   1. Did validation improve?  Strictly lower than best-so-far.
//      An equal loss is NOT an improvement, so it never
//      triggers a checkpoint.
//
//   2. Should `run` stop?  When the number of epochs since the
//      last improvement is strictly greater than the patience.
//      With patience 3 and an improvement at epoch 0, epochs
//      1, 2, 3 are tolerated and the loop breaks after epoch 4.

use std::fmt;

/// Strict improvement test used for checkpointing.
/// NaN never improves on anything.
pub fn is_improvement(candidate: f64, best: f64) -> bool {
    candidate < best
}

/// Tracks epochs since the last validation improvement during one `run`.
#[derive(Debug, Clone)]
pub struct PatienceWindow {
    patience:      usize,
    last_improved: usize,
}

impl PatienceWindow {
    /// `start_epoch` is the epoch `run` begins at; it counts as the
    /// reference point until the first improvement is observed.
    pub fn new(start_epoch: usize, patience: usize) -> Self {
        Self { patience, last_improved: start_epoch }
    }

    /// Feed one finished epoch. Returns true once patience is exceeded.
    pub fn observe(&mut self, epoch: usize, improved: bool) -> bool {
        if improved {
            self.last_improved = epoch;
        }
        epoch.saturating_sub(self.last_improved) > self.patience
    }

    pub fn last_improved(&self) -> usize {
        self.last_improved
    }
}

/// How a patience-bounded `run` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Patience ran out: the checkpoint holds the best model
    BestModelFound { last_improved_epoch: usize },
    /// `max_epochs_total` was spent before patience ran out
    BudgetExhausted,
}

impl RunOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, RunOutcome::BestModelFound { .. })
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::BestModelFound { last_improved_epoch } => write!(
                f,
                "Best model found (last improvement at epoch {last_improved_epoch})."
            ),
            RunOutcome::BudgetExhausted => f.write_str(
                "Best model not found because 'run' finished too early. \
                 Consider increasing max_epochs_total and running again.",
            ),
        }
    }
}

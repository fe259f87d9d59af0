// ============================================================
// Layer 3 — Data Split
// ============================================================
// The three independent batch sources a session works with.
// Used to label losses, errors and log lines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which batch source a pass runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Backpropagating passes update the model on this source
    Train,
    /// Drives checkpointing and early stopping
    Valid,
    /// Held out, only ever evaluated
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test  => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// Layer 3 — Session State Machine
// ============================================================
//
//            ┌──────────────────────────────────────────┐
//            ▼                                          │
//   Idle ──► RunningEpoch ──► Validating ──► Idle       │
//                                  │                    │
//                                  └──► Checkpointing ──┘
//
//   Stopped: entered when `run` finishes. A later run or
//   run_epochs call resumes from there.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Between epochs (also right after the seed validation pass)
    #[default]
    Idle,
    /// Backpropagating pass over the training source
    RunningEpoch,
    /// Evaluating the validation source
    Validating,
    /// Persisting a new best model
    Checkpointing,
    /// `run` has returned
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle          => "idle",
            SessionState::RunningEpoch  => "running-epoch",
            SessionState::Validating    => "validating",
            SessionState::Checkpointing => "checkpointing",
            SessionState::Stopped       => "stopped",
        };
        f.write_str(name)
    }
}

// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that define what a training
// session IS: its errors, its loss history, its state machine
// and the capabilities it depends on.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// TrainError taxonomy
pub mod error;

/// Per-epoch loss maps and checkpointed epochs
pub mod history;

/// Session states (Idle, RunningEpoch, ...)
pub mod state;

/// Train / valid / test
pub mod split;

/// Mean-loss accumulation for one pass
pub mod stats;

/// Improvement test, patience window, run outcome
pub mod stopping;

/// BatchSource, Learner, EpochObserver
pub mod traits;

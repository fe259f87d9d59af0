// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns the training controller only sees
// through traits:
//
//   checkpoint.rs — Saving and loading the best model
//                   Uses Burn's BinBytesRecorder (full
//                   precision) and an atomic rename. Also
//                   saves/loads the run config as JSON so
//                   evaluation can rebuild the model.
//
//   metrics.rs    — Per-epoch CSV log
//                   An EpochObserver that appends train and
//                   valid loss after every epoch.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Best-model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

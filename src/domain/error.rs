// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the training harness can surface. All of them
// are fatal for the operation that raised them; nothing here
// is retried automatically.
//
// The application and CLI layers wrap these in anyhow with
// extra context, the lower layers return them as-is.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::split::Split;

#[derive(Debug, Error)]
pub enum TrainError {
    /// A required construction parameter is missing or invalid
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A batch source produced zero batches, so its mean loss is undefined
    #[error("the {split} data source yielded no batches")]
    EmptyDataset { split: Split },

    /// The best model was requested but no checkpoint exists
    #[error("no checkpoint found at '{}'", .path.display())]
    CheckpointNotFound { path: PathBuf },

    /// The checkpoint medium could not be read, written or decoded
    #[error("checkpoint I/O failed for '{}': {reason}", .path.display())]
    CheckpointIo { path: PathBuf, reason: String },

    /// The model returned a reconstruction with a different shape than its input
    #[error("reconstruction shape {actual:?} does not match input shape {expected:?}")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    /// A data file is missing or malformed
    #[error("cannot load data file '{}': {reason}", .path.display())]
    Data { path: PathBuf, reason: String },

    /// Any other file the harness writes (metrics export)
    #[error("cannot write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type TrainResult<T> = Result<T, TrainError>;

// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per completed epoch so learning curves
// can be plotted after (or during) a run.
//
// Columns:
//   - epoch:        zero-based epoch index (0, 1, 2, ...)
//   - train_loss:   mean batch loss on the training set
//   - valid_loss:   mean batch loss on the validation set
//   - checkpointed: 1 when the epoch produced a new best model
//
// Example CSV output:
//   epoch,train_loss,valid_loss,checkpointed
//   0,0.912345,0.901234,1
//   1,0.884321,0.903456,0
//
// An existing file is appended to, so resumed runs keep their
// earlier rows.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::domain::{
    error::{TrainError, TrainResult},
    history::EpochReport,
    traits::EpochObserver,
};

const HEADER: &str = "epoch,train_loss,valid_loss,checkpointed";

/// Logs epoch reports to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(path: impl Into<PathBuf>) -> TrainResult<Self> {
        let csv_path = path.into();

        if !csv_path.exists() {
            let created = create_with_header(&csv_path);
            created.map_err(|source| TrainError::Io { path: csv_path.clone(), source })?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch as a new row.
    pub fn log(&self, report: &EpochReport) -> TrainResult<()> {
        let appended = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .and_then(|mut f| writeln!(f, "{}", format_row(report)));
        appended.map_err(|source| TrainError::Io { path: self.csv_path.clone(), source })?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, valid_loss={:.4}",
            report.epoch,
            report.train_loss,
            report.valid_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl EpochObserver for MetricsLogger {
    fn on_epoch(&mut self, report: &EpochReport) -> TrainResult<()> {
        self.log(report)
    }
}

fn create_with_header(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut f = fs::File::create(path)?;
    writeln!(f, "{HEADER}")
}

fn format_row(report: &EpochReport) -> String {
    format!(
        "{},{:.6},{:.6},{}",
        report.epoch,
        report.train_loss,
        report.valid_loss,
        u8::from(report.checkpointed),
    )
}

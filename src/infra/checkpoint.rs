// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Persists the best model seen so far to ONE file and restores
// it on demand. Every save overwrites the previous checkpoint.
//
// What gets saved:
//   1. <path>              — model parameters (Burn record,
//                            bincode, full precision)
//   2. <stem>.config.json  — the run configuration, written
//                            with every checkpoint so `evaluate`
//                            rebuilds the architecture the
//                            weights came from
//
// Writes go to <path>.partial first and are then renamed over
// <path>, so an interrupted save never leaves a truncated
// checkpoint behind.
//
// Loading needs a model "skeleton" of the right architecture:
// Burn records hold parameter values, not structure.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use burn::{
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::error::{TrainError, TrainResult};

type CheckpointRecorder = BinBytesRecorder<FullPrecisionSettings>;

/// Manages the single best-model checkpoint file.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    path:       PathBuf,
    /// Sidecar contents written next to every saved model
    run_config: Option<serde_json::Value>,
}

impl CheckpointManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), run_config: None }
    }

    /// Save this run configuration together with each checkpoint.
    pub fn with_run_config(mut self, config: Option<serde_json::Value>) -> Self {
        self.run_config = config;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the run configuration is stored, e.g.
    /// `models/best.bin` → `models/best.config.json`
    pub fn config_path(&self) -> PathBuf {
        self.path.with_extension("config.json")
    }

    /// Serialise the model's parameters, replacing any previous
    /// checkpoint and its sidecar.
    pub fn save<B: Backend, M: Module<B>>(&self, model: &M) -> TrainResult<()> {
        let recorder = CheckpointRecorder::default();
        let bytes = <CheckpointRecorder as Recorder<B>>::record(
            &recorder,
            model.clone().into_record(),
            (),
        )
        .map_err(|e| self.io_error(format!("cannot encode model: {e:?}")))?;

        self.write_atomically(&self.path, &bytes)?;
        tracing::debug!("Saved checkpoint ({} bytes) to '{}'", bytes.len(), self.path.display());

        if let Some(config) = &self.run_config {
            self.save_config(config)?;
        }
        Ok(())
    }

    /// Load the checkpoint into `skeleton`, which must have the
    /// architecture the checkpoint was saved from.
    pub fn load<B: Backend, M: Module<B>>(&self, skeleton: M, device: &B::Device) -> TrainResult<M> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TrainError::CheckpointNotFound { path: self.path.clone() },
            _ => self.io_error(e.to_string()),
        })?;

        let recorder = CheckpointRecorder::default();
        let record = <CheckpointRecorder as Recorder<B>>::load(&recorder, bytes, device)
            .map_err(|e| self.io_error(format!("cannot decode model: {e:?}")))?;

        tracing::debug!("Loaded checkpoint from '{}'", self.path.display());
        Ok(skeleton.load_record(record))
    }

    /// Save the run configuration next to the checkpoint.
    pub fn save_config<T: Serialize>(&self, config: &T) -> TrainResult<()> {
        let path = self.config_path();
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| self.io_error(format!("cannot encode config: {e}")))?;
        self.write_atomically(&path, json.as_bytes())?;
        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config<T: DeserializeOwned>(&self) -> TrainResult<T> {
        let path = self.config_path();
        let json = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TrainError::CheckpointNotFound { path: path.clone() },
            _ => TrainError::CheckpointIo { path: path.clone(), reason: e.to_string() },
        })?;
        serde_json::from_str(&json).map_err(|e| TrainError::CheckpointIo {
            path,
            reason: format!("cannot decode config: {e}"),
        })
    }

    fn write_atomically(&self, target: &Path, bytes: &[u8]) -> TrainResult<()> {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e.to_string()))?;
        }

        let mut partial = target.as_os_str().to_owned();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        fs::write(&partial, bytes).map_err(|e| self.io_error(e.to_string()))?;
        fs::rename(&partial, target).map_err(|e| self.io_error(e.to_string()))
    }

    fn io_error(&self, reason: String) -> TrainError {
        TrainError::CheckpointIo { path: self.path.clone(), reason }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::{DenseAutoencoder, DenseAutoencoderConfig, Reconstruct};
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn model(device: &<TestBackend as Backend>::Device) -> DenseAutoencoder<TestBackend> {
        DenseAutoencoderConfig::new(3).with_hidden_dim(5).with_latent_dim(2).init(device)
    }

    fn output(model: &DenseAutoencoder<TestBackend>) -> Vec<f32> {
        let device = Default::default();
        let input = Tensor::<TestBackend, 2>::from_floats([[0.1, 0.2, 0.3]], &device);
        model.reconstruct(input).into_data().to_vec().unwrap()
    }

    #[test]
    fn test_save_then_load_restores_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().join("best.bin"));
        let device = Default::default();

        let saved = model(&device);
        manager.save(&saved).unwrap();

        // A freshly initialised skeleton has different weights until loaded
        let restored = manager.load(model(&device), &device).unwrap();
        assert_eq!(output(&saved), output(&restored));
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().join("nested/best.bin"));
        let device = Default::default();

        manager.save(&model(&device)).unwrap();
        let second = model(&device);
        manager.save(&second).unwrap();

        let restored = manager.load(model(&device), &device).unwrap();
        assert_eq!(output(&second), output(&restored));
        assert!(manager.path().is_file());
        assert!(!dir.path().join("nested/best.bin.partial").exists());
    }

    #[test]
    fn test_missing_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().join("missing.bin"));
        let device = Default::default();
        let err = manager.load(model(&device), &device).unwrap_err();
        assert!(matches!(err, TrainError::CheckpointNotFound { .. }));
    }

    #[test]
    fn test_corrupt_checkpoint_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.bin");
        fs::write(&path, b"not a record").unwrap();
        let manager = CheckpointManager::new(path);
        let device = Default::default();
        let err = manager.load(model(&device), &device).unwrap_err();
        assert!(matches!(err, TrainError::CheckpointIo { .. }));
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().join("best.bin"));
        assert_eq!(manager.config_path(), dir.path().join("best.config.json"));

        let config = DenseAutoencoderConfig::new(7).with_latent_dim(3);
        manager.save_config(&config).unwrap();
        let loaded: DenseAutoencoderConfig = manager.load_config().unwrap();
        assert_eq!(loaded.input_dim, 7);
        assert_eq!(loaded.latent_dim, 3);
    }

    #[test]
    fn test_run_config_is_written_only_with_weights() {
        let dir = tempfile::tempdir().unwrap();
        let config = DenseAutoencoderConfig::new(3).with_hidden_dim(5).with_latent_dim(2);
        let manager = CheckpointManager::new(dir.path().join("best.bin"))
            .with_run_config(Some(serde_json::to_value(&config).unwrap()));
        assert!(!manager.config_path().exists());

        let device = Default::default();
        manager.save(&model(&device)).unwrap();

        let loaded: DenseAutoencoderConfig = manager.load_config().unwrap();
        assert_eq!(loaded.hidden_dim, 5);
        assert!(!dir.path().join("best.config.json.partial").exists());
    }
}

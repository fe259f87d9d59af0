// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Scores a saved checkpoint on a CSV file:
//   1. Read the run config saved next to the checkpoint
//   2. Rebuild the model skeleton and load the weights
//   3. Run one evaluation pass (same noise and loss as training)
//
// Runs on a plain backend: no autodiff, dropout inactive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::prelude::*;

use crate::application::train_use_case::{check_width, SavedRun};
use crate::data::{loader::CsvLoader, source::loader_source};
use crate::domain::{error::TrainError, split::Split, traits::BatchSource};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{model::DenseAutoencoder, runner::evaluate_pass};

#[derive(Debug, Clone)]
pub struct EvaluateReport {
    pub data_path: PathBuf,
    pub samples:   usize,
    pub loss:      f64,
}

pub struct EvaluateUseCase {
    checkpoint_path: PathBuf,
    /// Falls back to the saved test path
    data_path:       Option<PathBuf>,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_path: impl Into<PathBuf>, data_path: Option<PathBuf>) -> Self {
        Self { checkpoint_path: checkpoint_path.into(), data_path }
    }

    pub fn execute<B: Backend>(&self, device: B::Device) -> Result<EvaluateReport> {
        let checkpoints = CheckpointManager::new(&self.checkpoint_path);
        let saved: SavedRun = checkpoints
            .load_config()
            .with_context(|| format!("no run config for '{}'", self.checkpoint_path.display()))?;
        let cfg = &saved.config;

        if let Some(seed) = cfg.seed {
            B::seed(seed);
        }

        let data_path = self
            .data_path
            .clone()
            .or_else(|| cfg.test_path.clone())
            .ok_or_else(|| TrainError::Configuration("no data file given and none saved".into()))?;

        let dataset = CsvLoader::new(&data_path)
            .with_label_column(cfg.label_column)
            .load()?;
        check_width(&dataset, saved.model.input_dim)?;
        let samples = dataset.sample_count();

        let skeleton: DenseAutoencoder<B> = saved.model.init(&device);
        let model = checkpoints.load::<B, _>(skeleton, &device)?;
        tracing::info!("Loaded checkpoint '{}'", self.checkpoint_path.display());

        let source = loader_source::<B>(dataset, cfg.batch_size, cfg.num_workers, device.clone());
        let loss = evaluate_pass(
            &model,
            source.batches().map(|b| b.inputs),
            Split::Test,
            &cfg.noise,
            &cfg.loss,
            &device,
        )?;

        Ok(EvaluateReport { data_path, samples, loss })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{TrainConfig, TrainReport, TrainUseCase};
    use crate::ml::noise::NoiseKind;
    use burn::backend::{Autodiff, NdArray};
    use std::{fs, path::Path};

    #[test]
    fn test_missing_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let err = EvaluateUseCase::new(dir.path().join("none.bin"), None)
            .execute::<NdArray>(Default::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrainError>(),
            Some(TrainError::CheckpointNotFound { .. })
        ));
    }

    fn fixture(dir: &Path) -> TrainConfig {
        let data = dir.join("data.csv");
        fs::write(&data, "0.1,0.2,0.3,0.4\n0.4,0.3,0.2,0.1\n0.5,0.5,0.0,0.0\n0.9,0.1,0.9,0.1\n")
            .unwrap();
        TrainConfig {
            train_path:      Some(data.clone()),
            valid_path:      Some(data.clone()),
            test_path:       Some(data),
            batch_size:      2,
            noise:           NoiseKind::None,
            learning_rate:   1e-2,
            checkpoint_path: dir.join("best.bin"),
            hidden_dim:      8,
            latent_dim:      2,
            epochs:          Some(15),
            ..TrainConfig::default()
        }
    }

    fn train(cfg: TrainConfig) -> TrainReport {
        TrainUseCase::new(cfg)
            .with_verbose(false)
            .execute::<Autodiff<NdArray>>(Default::default())
            .unwrap()
    }

    #[test]
    fn test_evaluates_trained_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = fixture(dir.path());
        let checkpoint = cfg.checkpoint_path.clone();
        let data = cfg.test_path.clone().unwrap();

        let trained = train(cfg);
        assert_eq!(trained.checkpoint.as_deref(), Some(checkpoint.as_path()));

        let report = EvaluateUseCase::new(&checkpoint, None)
            .execute::<NdArray>(Default::default())
            .unwrap();

        assert_eq!(report.data_path, data);
        assert_eq!(report.samples, 4);
        // Same data, no noise, best model restored: both passes agree
        assert!((report.loss - trained.test_loss).abs() < 1e-5);
    }

    #[test]
    fn test_run_without_checkpoint_keeps_previous_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let first = fixture(dir.path());
        let checkpoint = first.checkpoint_path.clone();

        let trained = train(first.clone());
        assert!(trained.checkpoint.is_some());

        // Same path, different architecture, no epochs: nothing is saved
        let second = train(TrainConfig { hidden_dim: 16, epochs: Some(0), ..first });
        assert_eq!(second.checkpoint, None);

        let saved: SavedRun = CheckpointManager::new(&checkpoint).load_config().unwrap();
        assert_eq!(saved.model.hidden_dim, 8);
        assert_eq!(saved.config.hidden_dim, 8);

        let report = EvaluateUseCase::new(&checkpoint, None)
            .execute::<NdArray>(Default::default())
            .unwrap();
        assert!((report.loss - trained.test_loss).abs() < 1e-5);
    }
}

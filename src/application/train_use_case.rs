// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run in order:
//
//   Step 1: Validate the config             (Layer 2)
//   Step 2: Seed the backend RNG            (Layer 5 - ml)
//   Step 3: Load train/valid/test CSVs      (Layer 4 - data)
//   Step 4: Build the reference model       (Layer 5 - ml)
//   Step 5: Encode config sidecar           (Layer 6 - infra)
//   Step 6: Build learner + batch sources   (Layer 5 - ml)
//   Step 7: Run the training session        (Layer 2)
//   Step 8: Test the best known model       (Layer 2)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use burn::{
    optim::{AdamConfig, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::session::{TrainingSession, Verbosity};
use crate::data::{dataset::SampleDataset, loader::CsvLoader, source::loader_source};
use crate::domain::{
    error::{TrainError, TrainResult},
    split::Split,
    stopping::RunOutcome,
    traits::Learner,
};
use crate::infra::metrics::MetricsLogger;
use crate::ml::{
    learner::LearnerBuilder,
    loss::LossKind,
    model::{DenseAutoencoder, DenseAutoencoderConfig},
    noise::NoiseKind,
};

// ─── Optimizer Choice ────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "adam" => Ok(OptimizerKind::Adam),
            "sgd"  => Ok(OptimizerKind::Sgd),
            other  => Err(format!("unknown optimizer '{other}' (expected adam or sgd)")),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptimizerKind::Adam => "adam",
            OptimizerKind::Sgd  => "sgd",
        })
    }
}

// ─── Training Configuration ──────────────────────────────────────────────────
// Every option of a run. Serialisable so it can be read from a
// JSON file and saved next to the checkpoint for `evaluate`.
// Missing JSON fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub train_path:               Option<PathBuf>,
    pub valid_path:               Option<PathBuf>,
    pub test_path:                Option<PathBuf>,
    /// Zero-based CSV column holding a label to ignore
    pub label_column:             Option<usize>,
    pub batch_size:               usize,
    pub num_workers:              usize,
    pub noise:                    NoiseKind,
    pub loss:                     LossKind,
    pub optimizer:                OptimizerKind,
    pub learning_rate:            f64,
    pub checkpoint_path:          PathBuf,
    pub metrics_path:             Option<PathBuf>,
    pub hidden_dim:               usize,
    pub latent_dim:               usize,
    pub dropout:                  f64,
    pub seed:                     Option<u64>,
    pub max_epochs_total:         usize,
    pub max_epochs_without_valid: usize,
    /// Run exactly this many epochs instead of the patience-bound run
    pub epochs:                   Option<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_path:               None,
            valid_path:               None,
            test_path:                None,
            label_column:             None,
            batch_size:               20,
            num_workers:              0,
            noise:                    NoiseKind::default(),
            loss:                     LossKind::default(),
            optimizer:                OptimizerKind::default(),
            learning_rate:            1e-4,
            checkpoint_path:          PathBuf::from("checkpoint.bin"),
            metrics_path:             None,
            hidden_dim:               64,
            latent_dim:               16,
            dropout:                  0.0,
            seed:                     None,
            max_epochs_total:         1000,
            max_epochs_without_valid: 100,
            epochs:                   None,
        }
    }
}

impl TrainConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("cannot read config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("invalid config '{}'", path.display()))
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> TrainResult<()> {
        let invalid = |msg: String| Err(TrainError::Configuration(msg));

        for (split, path) in [
            (Split::Train, &self.train_path),
            (Split::Valid, &self.valid_path),
            (Split::Test,  &self.test_path),
        ] {
            if path.is_none() {
                return invalid(format!("missing path to the {split} dataset"));
            }
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1".into());
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if let NoiseKind::Gaussian { mean, std } = self.noise {
            if !mean.is_finite() || !std.is_finite() || std < 0.0 {
                return invalid(format!("invalid gaussian noise (mean={mean}, std={std})"));
            }
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return invalid(format!("dropout must be in [0, 1), got {}", self.dropout));
        }
        if self.hidden_dim == 0 || self.latent_dim == 0 {
            return invalid("hidden_dim and latent_dim must be at least 1".into());
        }
        Ok(())
    }

    fn data_path(&self, split: Split) -> TrainResult<&Path> {
        let path = match split {
            Split::Train => &self.train_path,
            Split::Valid => &self.valid_path,
            Split::Test  => &self.test_path,
        };
        path.as_deref().ok_or_else(|| {
            TrainError::Configuration(format!("missing path to the {split} dataset"))
        })
    }
}

// ─── Checkpoint Sidecar ──────────────────────────────────────────────────────
/// Saved as `<checkpoint stem>.config.json`; enough to rebuild
/// the exact model architecture and data handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRun {
    pub config: TrainConfig,
    pub model:  DenseAutoencoderConfig,
}

// ─── Report ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// None when a fixed number of epochs was requested
    pub outcome:         Option<RunOutcome>,
    pub epochs_run:      usize,
    pub best_valid_loss: f64,
    /// Test loss of the best known model
    pub test_loss:       f64,
    /// Set when this run wrote a checkpoint
    pub checkpoint:      Option<PathBuf>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config:  TrainConfig,
    verbose: bool,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config, verbose: true }
    }

    /// Print the per-epoch table (default on)
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Execute the full training pipeline on backend B.
    pub fn execute<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Seed ──────────────────────────────────────────────────────
        if let Some(seed) = cfg.seed {
            B::seed(seed);
            tracing::info!("Seeded backend RNG with {seed}");
        }

        // ── Step 3: Load data ─────────────────────────────────────────────────
        let train = self.load(Split::Train)?;
        let valid = self.load(Split::Valid)?;
        let test  = self.load(Split::Test)?;

        let input_dim = train
            .feature_dim()
            .ok_or(TrainError::EmptyDataset { split: Split::Train })?;
        check_width(&valid, input_dim)?;
        check_width(&test, input_dim)?;

        // ── Step 4: Build model ───────────────────────────────────────────────
        let model_cfg = DenseAutoencoderConfig::new(input_dim)
            .with_hidden_dim(cfg.hidden_dim)
            .with_latent_dim(cfg.latent_dim)
            .with_dropout(cfg.dropout);
        let model: DenseAutoencoder<B> = model_cfg.init(&device);
        tracing::info!(
            "Model ready: {} → {} → {} ({} parameters)",
            input_dim,
            cfg.hidden_dim,
            cfg.latent_dim,
            model.num_params(),
        );

        // ── Step 5: Encode config sidecar ─────────────────────────────────────
        // Written next to each checkpoint, never ahead of one
        let sidecar = serde_json::to_value(SavedRun { config: cfg.clone(), model: model_cfg })
            .context("cannot encode run config")?;

        // ── Step 6: Learner ───────────────────────────────────────────────────
        let builder = LearnerBuilder::<B, _>::new(model, device.clone())
            .train_source(loader_source::<B>(train, cfg.batch_size, cfg.num_workers, device.clone()))
            .valid_source(loader_source::<B::InnerBackend>(
                valid,
                cfg.batch_size,
                cfg.num_workers,
                device.clone(),
            ))
            .test_source(loader_source::<B::InnerBackend>(
                test,
                cfg.batch_size,
                cfg.num_workers,
                device,
            ))
            .noise(cfg.noise)
            .criterion(cfg.loss)
            .learning_rate(cfg.learning_rate)
            .checkpoint_path(&cfg.checkpoint_path)
            .run_config(sidecar);

        tracing::info!("Optimizer: {} (lr={})", cfg.optimizer, cfg.learning_rate);
        match cfg.optimizer {
            OptimizerKind::Adam => {
                let optimizer = AdamConfig::new().init::<B, DenseAutoencoder<B>>();
                self.train_with(builder.build_with(optimizer)?)
            }
            OptimizerKind::Sgd => {
                let optimizer = SgdConfig::new().init::<B, DenseAutoencoder<B>>();
                self.train_with(builder.build_with(optimizer)?)
            }
        }
    }

    // ── Steps 7 + 8 ───────────────────────────────────────────────────────────
    fn train_with<L: Learner>(&self, learner: L) -> Result<TrainReport> {
        let cfg = &self.config;

        let mut session = TrainingSession::new(learner).context("seed validation pass failed")?;
        if let Some(path) = &cfg.metrics_path {
            let logger = MetricsLogger::new(path)?;
            tracing::info!("Logging epoch metrics to '{}'", logger.csv_path().display());
            session.add_observer(logger);
        }

        let outcome = match cfg.epochs {
            Some(epochs) => {
                let verbosity = if self.verbose { Verbosity::table() } else { Verbosity::quiet() };
                session.run_epochs(epochs, verbosity)?;
                None
            }
            None => {
                let summary = session.run(
                    cfg.max_epochs_total,
                    cfg.max_epochs_without_valid,
                    self.verbose,
                )?;
                Some(summary.outcome)
            }
        };

        let checkpoint = session
            .history()
            .last_checkpoint()
            .map(|_| session.learner().checkpoint_path().to_path_buf());
        if checkpoint.is_none() {
            tracing::warn!("Validation loss never improved; no checkpoint was written");
        }

        session.restore_best_model()?;
        let test_loss = session.test()?;

        Ok(TrainReport {
            outcome,
            epochs_run: session.epoch(),
            best_valid_loss: session.best_valid_loss(),
            test_loss,
            checkpoint,
        })
    }

    fn load(&self, split: Split) -> Result<SampleDataset> {
        let path = self.config.data_path(split)?;
        CsvLoader::new(path)
            .with_label_column(self.config.label_column)
            .load()
            .with_context(|| format!("cannot load {split} data"))
    }
}

/// Every split must have the width the model was built for.
/// Empty splits are reported later, by the pass that reads them.
pub(crate) fn check_width(dataset: &SampleDataset, input_dim: usize) -> TrainResult<()> {
    match dataset.feature_dim() {
        Some(width) if width != input_dim => Err(TrainError::ShapeMismatch {
            expected: vec![input_dim],
            actual:   vec![width],
        }),
        _ => Ok(()),
    }
}

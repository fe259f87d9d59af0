// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and
// their flags.
//
// Every `train` flag is optional: unset flags keep the value
// from `--config <file.json>` (or the built-in default), set
// flags override it.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::application::train_use_case::{OptimizerKind, TrainConfig};
use crate::ml::{loss::LossKind, noise::NoiseKind};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the denoising autoencoder
    Train(TrainArgs),

    /// Score a saved checkpoint on a CSV file
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// JSON file with a full or partial TrainConfig
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Training data (CSV)
    #[arg(long)]
    pub train: Option<PathBuf>,

    /// Validation data (CSV)
    #[arg(long)]
    pub valid: Option<PathBuf>,

    /// Test data (CSV)
    #[arg(long)]
    pub test: Option<PathBuf>,

    /// Zero-based CSV column to drop as a label
    #[arg(long)]
    pub label_column: Option<usize>,

    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Background loader threads (0 = load on the training thread)
    #[arg(long)]
    pub num_workers: Option<usize>,

    /// Mean of the gaussian input noise
    #[arg(long)]
    pub noise_mean: Option<f64>,

    /// Standard deviation of the gaussian input noise
    #[arg(long)]
    pub noise_std: Option<f64>,

    /// Train on clean inputs
    #[arg(long, conflicts_with_all = ["noise_mean", "noise_std"])]
    pub no_noise: bool,

    /// rmse, mse or mae
    #[arg(long)]
    pub loss: Option<LossKind>,

    /// adam or sgd
    #[arg(long)]
    pub optimizer: Option<OptimizerKind>,

    #[arg(long, visible_alias = "lr")]
    pub learning_rate: Option<f64>,

    /// Where the best model is written
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Append per-epoch losses to this CSV file
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    #[arg(long)]
    pub hidden_dim: Option<usize>,

    #[arg(long)]
    pub latent_dim: Option<usize>,

    #[arg(long)]
    pub dropout: Option<f64>,

    /// Seed for weight initialisation and noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Upper bound on epochs for the patience-bound run
    #[arg(long)]
    pub max_epochs_total: Option<usize>,

    /// Stop after this many epochs without a new best validation loss
    #[arg(long, visible_alias = "patience")]
    pub max_epochs_without_valid: Option<usize>,

    /// Run exactly N epochs instead of stopping on patience
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Don't print the per-epoch table
    #[arg(long, short)]
    pub quiet: bool,
}

impl TrainArgs {
    /// Base config from `--config` (or defaults) with flags on top.
    pub fn to_config(&self) -> Result<TrainConfig> {
        let base = match &self.config {
            Some(path) => TrainConfig::from_file(path)?,
            None       => TrainConfig::default(),
        };
        Ok(self.overlay(base))
    }

    pub fn overlay(&self, mut cfg: TrainConfig) -> TrainConfig {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        set_opt(&mut cfg.train_path,   &self.train);
        set_opt(&mut cfg.valid_path,   &self.valid);
        set_opt(&mut cfg.test_path,    &self.test);
        set_opt(&mut cfg.label_column, &self.label_column);
        set_opt(&mut cfg.metrics_path, &self.metrics);
        set_opt(&mut cfg.seed,         &self.seed);
        set_opt(&mut cfg.epochs,       &self.epochs);

        set(&mut cfg.batch_size,               &self.batch_size);
        set(&mut cfg.num_workers,              &self.num_workers);
        set(&mut cfg.loss,                     &self.loss);
        set(&mut cfg.optimizer,                &self.optimizer);
        set(&mut cfg.learning_rate,            &self.learning_rate);
        set(&mut cfg.checkpoint_path,          &self.checkpoint);
        set(&mut cfg.hidden_dim,               &self.hidden_dim);
        set(&mut cfg.latent_dim,               &self.latent_dim);
        set(&mut cfg.dropout,                  &self.dropout);
        set(&mut cfg.max_epochs_total,         &self.max_epochs_total);
        set(&mut cfg.max_epochs_without_valid, &self.max_epochs_without_valid);

        if self.no_noise {
            cfg.noise = NoiseKind::None;
        } else if self.noise_mean.is_some() || self.noise_std.is_some() {
            let (base_mean, base_std) = match cfg.noise {
                NoiseKind::Gaussian { mean, std } => (mean, std),
                NoiseKind::None                   => (0.0, 1.0),
            };
            cfg.noise = NoiseKind::Gaussian {
                mean: self.noise_mean.unwrap_or(base_mean),
                std:  self.noise_std.unwrap_or(base_std),
            };
        }

        cfg
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Checkpoint written by `train` (its .config.json must sit next to it)
    #[arg(long, default_value = "checkpoint.bin")]
    pub checkpoint: PathBuf,

    /// CSV file to score; defaults to the test file used in training
    #[arg(long)]
    pub data: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_base_config() {
        let base = TrainConfig {
            batch_size: 32,
            noise:      NoiseKind::Gaussian { mean: 0.5, std: 2.0 },
            ..TrainConfig::default()
        };
        let args = TrainArgs {
            train:         Some(PathBuf::from("train.csv")),
            learning_rate: Some(0.01),
            noise_std:     Some(0.1),
            ..TrainArgs::default()
        };

        let cfg = args.overlay(base);
        assert_eq!(cfg.train_path, Some(PathBuf::from("train.csv")));
        assert_eq!(cfg.batch_size, 32);
        assert_eq!(cfg.learning_rate, 0.01);
        assert_eq!(cfg.noise, NoiseKind::Gaussian { mean: 0.5, std: 0.1 });
    }

    #[test]
    fn test_no_noise_flag() {
        let args = TrainArgs { no_noise: true, ..TrainArgs::default() };
        assert_eq!(args.overlay(TrainConfig::default()).noise, NoiseKind::None);
    }
}

// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with `clap` and routes them
// to the use cases in Layer 2.
//
// Two commands are supported:
//   1. `train`    — trains the autoencoder, checkpointing the
//                   best model
//   2. `evaluate` — scores a saved checkpoint on a CSV file
//
// The compute backend is picked once, here:
//   --backend wgpu    → GPU via WGPU (Autodiff<Wgpu> for training)
//   --backend ndarray → CPU
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use burn::backend::{
    ndarray::NdArrayDevice,
    wgpu::WgpuDevice,
    Autodiff, NdArray, Wgpu,
};
use clap::{Parser, ValueEnum};
use commands::{Commands, EvaluateArgs, TrainArgs};

use crate::application::{
    evaluate_use_case::EvaluateUseCase,
    train_use_case::TrainUseCase,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    #[default]
    Wgpu,
    Ndarray,
}

#[derive(Parser, Debug)]
#[command(
    name = "denoise-trainer",
    version,
    about = "Train a denoising autoencoder with early stopping and best-model checkpoints."
)]
pub struct Cli {
    /// Compute backend
    #[arg(long, value_enum, global = true, default_value_t = BackendKind::Wgpu)]
    pub backend: BackendKind,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let Cli { backend, command } = self;
        match command {
            Commands::Train(args)    => run_train(backend, args),
            Commands::Evaluate(args) => run_evaluate(backend, args),
        }
    }
}

fn run_train(backend: BackendKind, args: TrainArgs) -> Result<()> {
    let config   = args.to_config()?;
    let use_case = TrainUseCase::new(config).with_verbose(!args.quiet);

    tracing::info!("Training on backend {:?}", backend);
    let report = match backend {
        BackendKind::Wgpu    => use_case.execute::<Autodiff<Wgpu>>(WgpuDevice::default())?,
        BackendKind::Ndarray => use_case.execute::<Autodiff<NdArray>>(NdArrayDevice::Cpu)?,
    };

    if let Some(outcome) = report.outcome {
        println!("{outcome}");
    }
    println!("Epochs run:            {}", report.epochs_run);
    println!("Best validation loss:  {:.7}", report.best_valid_loss);
    println!("Test loss (best model): {:.7}", report.test_loss);
    match report.checkpoint {
        Some(path) => println!("Checkpoint:            {}", path.display()),
        None       => println!("No checkpoint written (validation loss never improved)."),
    }
    Ok(())
}

fn run_evaluate(backend: BackendKind, args: EvaluateArgs) -> Result<()> {
    let use_case = EvaluateUseCase::new(args.checkpoint, args.data);

    let report = match backend {
        BackendKind::Wgpu    => use_case.execute::<Wgpu>(WgpuDevice::default())?,
        BackendKind::Ndarray => use_case.execute::<NdArray>(NdArrayDevice::Cpu)?,
    };

    println!(
        "Loss on '{}' ({} samples): {:.7}",
        report.data_path.display(),
        report.samples,
        report.loss,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_train_flags() {
        let cli = Cli::try_parse_from([
            "denoise-trainer", "--backend", "ndarray", "train",
            "--train", "a.csv", "--valid", "b.csv", "--test", "c.csv",
            "--loss", "mae", "--lr", "0.01", "--patience", "5", "--quiet",
        ])
        .unwrap();

        assert_eq!(cli.backend, BackendKind::Ndarray);
        let Commands::Train(args) = cli.command else {
            panic!("expected train command");
        };
        let cfg = args.to_config().unwrap();
        assert!(args.quiet);
        assert_eq!(cfg.loss, crate::ml::loss::LossKind::Mae);
        assert_eq!(cfg.learning_rate, 0.01);
        assert_eq!(cfg.max_epochs_without_valid, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_evaluate_defaults() {
        let cli = Cli::try_parse_from(["denoise-trainer", "evaluate"]).unwrap();
        assert_eq!(cli.backend, BackendKind::Wgpu);
        let Commands::Evaluate(args) = cli.command else {
            panic!("expected evaluate command");
        };
        assert_eq!(args.checkpoint, std::path::PathBuf::from("checkpoint.bin"));
        assert!(args.data.is_none());
    }
}

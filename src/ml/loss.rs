// ============================================================
// Layer 5 — Reconstruction Criteria
// ============================================================
// Scalar distance between a reconstruction and its clean target.
//
//   MSE  = mean((x̂ - x)²)
//   RMSE = √MSE            (default)
//   MAE  = mean(|x̂ - x|)
//
// Each returns a rank-1 tensor of shape [1] so the training
// pass can call .backward() on it directly.

use burn::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub trait Criterion {
    fn loss<B: Backend>(&self, reconstruction: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MseLoss;

impl Criterion for MseLoss {
    fn loss<B: Backend>(&self, reconstruction: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
        (reconstruction - target).powf_scalar(2.0).mean()
    }
}

/// Root of the mean squared error.
#[derive(Debug, Clone, Copy, Default)]
pub struct RmseLoss;

impl Criterion for RmseLoss {
    fn loss<B: Backend>(&self, reconstruction: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
        MseLoss.loss(reconstruction, target).sqrt()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaeLoss;

impl Criterion for MaeLoss {
    fn loss<B: Backend>(&self, reconstruction: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
        (reconstruction - target).abs().mean()
    }
}

/// Config-selectable criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossKind {
    #[default]
    Rmse,
    Mse,
    Mae,
}

impl Criterion for LossKind {
    fn loss<B: Backend>(&self, reconstruction: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
        match self {
            LossKind::Rmse => RmseLoss.loss(reconstruction, target),
            LossKind::Mse  => MseLoss.loss(reconstruction, target),
            LossKind::Mae  => MaeLoss.loss(reconstruction, target),
        }
    }
}

impl FromStr for LossKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rmse" => Ok(LossKind::Rmse),
            "mse"  => Ok(LossKind::Mse),
            "mae"  => Ok(LossKind::Mae),
            other  => Err(format!("unknown loss '{other}' (expected rmse, mse or mae)")),
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LossKind::Rmse => "rmse",
            LossKind::Mse  => "mse",
            LossKind::Mae  => "mae",
        };
        f.write_str(name)
    }
}

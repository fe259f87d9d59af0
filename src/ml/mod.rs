// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that touches tensors, gradients or optimizers.
// The training controller in Layer 2 reaches this layer only
// through the Learner trait.
//
//   noise.rs   — input corruption (gaussian, identity)
//   loss.rs    — reconstruction criteria (RMSE, MSE, MAE)
//   model.rs   — Reconstruct capability + a small dense
//                reference autoencoder
//   runner.rs  — one train pass / one evaluation pass,
//                mean per-batch loss
//   learner.rs — model + optimizer + sources + checkpoints
//                behind the Learner trait, and its builder
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Noise injected into clean inputs
pub mod noise;

/// Reconstruction loss functions
pub mod loss;

/// Dense autoencoder and the Reconstruct trait
pub mod model;

/// Single-pass train / evaluate loops
pub mod runner;

/// Burn-backed Learner and LearnerBuilder
pub mod learner;

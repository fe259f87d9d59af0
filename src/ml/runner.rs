// ============================================================
// Layer 5 — Epoch Runner
// ============================================================
// One full pass over a batch source, returning the mean
// per-batch loss.
//
// Train pass (autodiff backend, dropout active):
//   for each batch:
//     noised         = noise(clean.clone())
//     reconstruction = model(noised)
//     loss           = criterion(reconstruction, clean)
//     grads          = loss.backward()
//     model          = optimizer.step(lr, model, grads)
//
//   burn builds a fresh gradient set on every backward(), so
//   there is no accumulated gradient state to zero out first.
//
// Evaluate pass (inner backend via model.valid(), no autograd):
//   the same noised-forward / clean-target loss, no updates.
//
// Reference: Burn Book §5 (Custom Training Loop)

use burn::{
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::AutoencoderBatch;
use crate::domain::{
    error::{TrainError, TrainResult},
    split::Split,
    stats::PassStats,
    traits::BatchSource,
};
use crate::ml::{loss::Criterion, model::Reconstruct, noise::Noise};

/// Backpropagating pass over the training source.
///
/// The model is moved through the optimizer batch by batch, so it is
/// handed back even when the pass fails part-way.
pub fn train_pass<B, M, O, N, C>(
    mut model:     M,
    optimizer:     &mut O,
    learning_rate: f64,
    source:        &dyn BatchSource<AutoencoderBatch<B>>,
    noise:         &N,
    criterion:     &C,
    device:        &B::Device,
) -> (M, TrainResult<f64>)
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Reconstruct<B>,
    O: Optimizer<M, B>,
    N: Noise,
    C: Criterion,
{
    let mut stats = PassStats::new(Split::Train);

    for batch in source.batches() {
        let clean          = batch.inputs.to_device(device);
        let noised         = noise.apply(clean.clone());
        let reconstruction = model.reconstruct(noised);
        if let Err(err) = check_shape(&reconstruction, &clean) {
            return (model, Err(err));
        }

        let loss = criterion.loss(reconstruction, clean);
        let batch_loss = loss.clone().into_scalar().elem::<f64>();
        stats.record(batch_loss);
        tracing::trace!("train batch {}: loss={:.6}", stats.batches(), batch_loss);

        let grads = GradientsParams::from_grads(loss.backward(), &model);
        model = optimizer.step(learning_rate, model, grads);
    }

    (model, stats.mean())
}

/// Pass without parameter updates. `batches` yields clean inputs.
pub fn evaluate_pass<B, M, N, C>(
    model:     &M,
    batches:   impl Iterator<Item = Tensor<B, 2>>,
    split:     Split,
    noise:     &N,
    criterion: &C,
    device:    &B::Device,
) -> TrainResult<f64>
where
    B: Backend,
    M: Reconstruct<B>,
    N: Noise,
    C: Criterion,
{
    let mut stats = PassStats::new(split);

    for clean in batches {
        let clean          = clean.to_device(device);
        let noised         = noise.apply(clean.clone());
        let reconstruction = model.reconstruct(noised);
        check_shape(&reconstruction, &clean)?;

        let batch_loss = criterion.loss(reconstruction, clean).into_scalar().elem::<f64>();
        stats.record(batch_loss);
    }

    stats.mean()
}

fn check_shape<B: Backend>(reconstruction: &Tensor<B, 2>, input: &Tensor<B, 2>) -> TrainResult<()> {
    let expected = input.dims();
    let actual   = reconstruction.dims();
    if expected != actual {
        return Err(TrainError::ShapeMismatch {
            expected: expected.to_vec(),
            actual:   actual.to_vec(),
        });
    }
    Ok(())
}

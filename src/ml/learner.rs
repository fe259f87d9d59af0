// ============================================================
// Layer 5 — Burn Learner
// ============================================================
// Bundles everything one epoch needs behind the Learner trait:
//
//   model      — AutodiffModule + Reconstruct, placed on `device`
//   optimizer  — any burn Optimizer (Adam by default)
//   noise      — corrupts each clean batch before the forward pass
//   criterion  — reconstruction loss against the clean batch
//   sources    — train (autodiff backend), valid + test (inner backend)
//   checkpoints — where the best model and its run config
//                 are persisted
//
// Built with LearnerBuilder, which checks that all three batch
// sources are present and forks the model onto the device once.
//
//   LearnerBuilder::new(model, device)
//       .train_source(..).valid_source(..).test_source(..)
//       .noise(GaussianNoise::default())
//       .criterion(RmseLoss)
//       .learning_rate(1e-4)
//       .checkpoint_path("checkpoint.bin")
//       .run_config(sidecar)
//       .build()?
//
// Reference: Burn Book §5 (Custom Training Loop)

use std::path::{Path, PathBuf};

use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, Optimizer},
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::AutoencoderBatch;
use crate::domain::{
    error::{TrainError, TrainResult},
    split::Split,
    traits::{BatchSource, Learner},
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    loss::{Criterion, RmseLoss},
    model::Reconstruct,
    noise::{GaussianNoise, Noise},
    runner::{evaluate_pass, train_pass},
};

type TrainSource<B> = Box<dyn BatchSource<AutoencoderBatch<B>>>;
type EvalSource<B>  = Box<dyn BatchSource<AutoencoderBatch<<B as AutodiffBackend>::InnerBackend>>>;

const DEFAULT_LEARNING_RATE: f64 = 1e-4;
const DEFAULT_CHECKPOINT: &str   = "checkpoint.bin";

pub struct BurnLearner<B: AutodiffBackend, M, O, N, C> {
    model:         M,
    optimizer:     O,
    learning_rate: f64,
    noise:         N,
    criterion:     C,
    train:         TrainSource<B>,
    valid:         EvalSource<B>,
    test:          EvalSource<B>,
    checkpoints:   CheckpointManager,
    device:        B::Device,
}

impl<B, M, O, N, C> Learner for BurnLearner<B, M, O, N, C>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Reconstruct<B>,
    M::InnerModule: Reconstruct<B::InnerBackend>,
    O: Optimizer<M, B> + Clone,
    N: Noise,
    C: Criterion,
{
    type Model = M;

    fn train_epoch(&mut self) -> TrainResult<f64> {
        let optimizer = self.optimizer.clone();
        let (model, loss) = train_pass(
            self.model.clone(),
            &mut self.optimizer,
            self.learning_rate,
            self.train.as_ref(),
            &self.noise,
            &self.criterion,
            &self.device,
        );
        // A failed pass keeps the model and optimizer state from before the epoch
        match &loss {
            Ok(_)  => self.model = model,
            Err(_) => self.optimizer = optimizer,
        }
        loss
    }

    fn evaluate(&mut self, split: Split) -> TrainResult<f64> {
        let model = self.model.valid();
        let (noise, criterion, device) = (&self.noise, &self.criterion, &self.device);

        match split {
            Split::Train => {
                let batches = self.train.batches().map(|b| b.inputs.inner());
                evaluate_pass(&model, batches, split, noise, criterion, device)
            }
            Split::Valid => {
                let batches = self.valid.batches().map(|b| b.inputs);
                evaluate_pass(&model, batches, split, noise, criterion, device)
            }
            Split::Test => {
                let batches = self.test.batches().map(|b| b.inputs);
                evaluate_pass(&model, batches, split, noise, criterion, device)
            }
        }
    }

    fn save_checkpoint(&mut self) -> TrainResult<()> {
        self.checkpoints.save::<B, M>(&self.model)
    }

    fn load_checkpoint(&self) -> TrainResult<M> {
        self.checkpoints.load::<B, M>(self.model.clone(), &self.device)
    }

    fn checkpoint_path(&self) -> &Path {
        self.checkpoints.path()
    }

    fn model(&self) -> &M {
        &self.model
    }

    fn set_model(&mut self, model: M) {
        self.model = model.fork(&self.device);
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────
pub struct LearnerBuilder<B: AutodiffBackend, M, N = GaussianNoise, C = RmseLoss> {
    model:           M,
    device:          B::Device,
    noise:           N,
    criterion:       C,
    learning_rate:   f64,
    checkpoint_path: PathBuf,
    run_config:      Option<serde_json::Value>,
    train:           Option<TrainSource<B>>,
    valid:           Option<EvalSource<B>>,
    test:            Option<EvalSource<B>>,
}

impl<B: AutodiffBackend, M: AutodiffModule<B>> LearnerBuilder<B, M> {
    pub fn new(model: M, device: B::Device) -> Self {
        Self {
            model,
            device,
            noise:           GaussianNoise::default(),
            criterion:       RmseLoss,
            learning_rate:   DEFAULT_LEARNING_RATE,
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT),
            run_config:      None,
            train:           None,
            valid:           None,
            test:            None,
        }
    }
}

impl<B, M, N, C> LearnerBuilder<B, M, N, C>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    pub fn train_source(mut self, source: impl BatchSource<AutoencoderBatch<B>> + 'static) -> Self {
        self.train = Some(Box::new(source));
        self
    }

    pub fn valid_source(
        mut self,
        source: impl BatchSource<AutoencoderBatch<B::InnerBackend>> + 'static,
    ) -> Self {
        self.valid = Some(Box::new(source));
        self
    }

    pub fn test_source(
        mut self,
        source: impl BatchSource<AutoencoderBatch<B::InnerBackend>> + 'static,
    ) -> Self {
        self.test = Some(Box::new(source));
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = path.into();
        self
    }

    /// Written as the checkpoint sidecar on every save
    pub fn run_config(mut self, config: serde_json::Value) -> Self {
        self.run_config = Some(config);
        self
    }

    pub fn noise<N2: Noise>(self, noise: N2) -> LearnerBuilder<B, M, N2, C> {
        LearnerBuilder {
            model:           self.model,
            device:          self.device,
            noise,
            criterion:       self.criterion,
            learning_rate:   self.learning_rate,
            checkpoint_path: self.checkpoint_path,
            run_config:      self.run_config,
            train:           self.train,
            valid:           self.valid,
            test:            self.test,
        }
    }

    pub fn criterion<C2: Criterion>(self, criterion: C2) -> LearnerBuilder<B, M, N, C2> {
        LearnerBuilder {
            model:           self.model,
            device:          self.device,
            noise:           self.noise,
            criterion,
            learning_rate:   self.learning_rate,
            checkpoint_path: self.checkpoint_path,
            run_config:      self.run_config,
            train:           self.train,
            valid:           self.valid,
            test:            self.test,
        }
    }

    /// Finish with an explicit optimizer.
    pub fn build_with<O: Optimizer<M, B>>(self, optimizer: O) -> TrainResult<BurnLearner<B, M, O, N, C>> {
        let missing: Vec<&str> = [
            (self.train.is_none(), "train"),
            (self.valid.is_none(), "valid"),
            (self.test.is_none(),  "test"),
        ]
        .into_iter()
        .filter_map(|(absent, name)| absent.then_some(name))
        .collect();

        let (Some(train), Some(valid), Some(test)) = (self.train, self.valid, self.test) else {
            return Err(TrainError::Configuration(format!(
                "missing batch source(s): {}",
                missing.join(", ")
            )));
        };

        let model = self.model.fork(&self.device);
        tracing::debug!("Learner ready: {} parameters on {:?}", model.num_params(), self.device);

        Ok(BurnLearner {
            model,
            optimizer,
            learning_rate: self.learning_rate,
            noise:         self.noise,
            criterion:     self.criterion,
            train,
            valid,
            test,
            checkpoints:   CheckpointManager::new(self.checkpoint_path)
                .with_run_config(self.run_config),
            device:        self.device,
        })
    }

    /// Finish with Adam at its default hyper-parameters.
    pub fn build(self) -> TrainResult<BurnLearner<B, M, impl Optimizer<M, B> + Clone, N, C>> {
        self.build_with(AdamConfig::new().init::<B, M>())
    }
}

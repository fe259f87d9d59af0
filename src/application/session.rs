// ============================================================
// Layer 2 — Training Session
// ============================================================
// The epoch-driven training controller. Decides, epoch by
// epoch, whether to keep training, when to persist a new best
// model and when to stop.
//
// One epoch:
//
//   Idle ──► RunningEpoch ──► Validating ──┬──► Checkpointing ──► Idle
//            (train pass)     (valid pass)  │    (new best saved)
//                                           └──────────────────► Idle
//
//   then: history += (epoch, train_loss, valid_loss), epoch += 1
//
// A failed epoch records nothing and leaves the state at Idle.
//
// `run` repeats single epochs until either
//   - more than `max_epochs_without_valid` epochs passed since
//     the last improvement   → BestModelFound
//   - `max_epochs_total` epochs ran                → BudgetExhausted
// and then enters Stopped. Any later call resumes training.
//
// The session only talks to a Learner, so everything here is
// independent of burn.
//
// Reference: Rust Book §10 (Generic Types and Traits)
//            Rust Book §17 (State Pattern)

use crate::domain::{
    error::{TrainError, TrainResult},
    history::{EpochReport, LossHistory},
    split::Split,
    state::SessionState,
    stopping::{is_improvement, PatienceWindow, RunOutcome},
    traits::{EpochObserver, Learner},
};

/// Controls the per-epoch table printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verbosity {
    pub verbose: bool,
    /// Print the column header before the first row
    pub header:  bool,
}

impl Verbosity {
    pub fn quiet() -> Self {
        Self { verbose: false, header: false }
    }

    pub fn table() -> Self {
        Self { verbose: true, header: true }
    }
}

/// What a `run` call produced.
#[derive(Debug, Clone)]
pub struct RunSummary<M> {
    pub outcome:    RunOutcome,
    pub epochs_run: usize,
    /// Best known model when the run stopped
    pub model:      M,
}

pub struct TrainingSession<L: Learner> {
    learner:         L,
    epoch:           usize,
    best_valid_loss: f64,
    history:         LossHistory,
    state:           SessionState,
    /// Model as it was when the session started
    baseline:        L::Model,
    observers:       Vec<Box<dyn EpochObserver>>,
}

impl<L: Learner> TrainingSession<L> {
    /// Measures validation loss once to seed the best-so-far value.
    pub fn new(mut learner: L) -> TrainResult<Self> {
        let best_valid_loss = learner.evaluate(Split::Valid)?;
        tracing::info!("Seed validation loss: {:.7}", best_valid_loss);

        let baseline = learner.model().clone();
        Ok(Self {
            learner,
            epoch: 0,
            best_valid_loss,
            history: LossHistory::default(),
            state: SessionState::Idle,
            baseline,
            observers: Vec::new(),
        })
    }

    /// Register a callback for every completed epoch.
    pub fn add_observer(&mut self, observer: impl EpochObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Run exactly `epochs` epochs, regardless of improvement.
    /// Returns the best known model.
    pub fn run_epochs(&mut self, epochs: usize, verbosity: Verbosity) -> TrainResult<L::Model> {
        if verbosity.verbose && verbosity.header {
            println!("{}", format_header());
        }

        for _ in 0..epochs {
            let report = self.run_one_epoch()?;
            if verbosity.verbose {
                println!("{}", format_row(&report));
            }
        }

        self.best_known_model()
    }

    /// Train until validation loss has not improved for more than
    /// `max_epochs_without_valid` epochs, or `max_epochs_total`
    /// epochs have run.
    pub fn run(
        &mut self,
        max_epochs_total:         usize,
        max_epochs_without_valid: usize,
        verbose:                  bool,
    ) -> TrainResult<RunSummary<L::Model>> {
        if max_epochs_total < max_epochs_without_valid {
            tracing::warn!(
                "max_epochs_without_valid ({}) is greater than max_epochs_total ({}): \
                 all {} epochs will run",
                max_epochs_without_valid,
                max_epochs_total,
                max_epochs_total,
            );
        }

        if verbose {
            println!("{}", format_header());
        }

        let start       = self.epoch;
        let mut window  = PatienceWindow::new(start, max_epochs_without_valid);
        let mut outcome = RunOutcome::BudgetExhausted;

        for _ in 0..max_epochs_total {
            let report = self.run_one_epoch()?;
            if verbose {
                println!("{}", format_row(&report));
            }

            if window.observe(report.epoch, report.checkpointed) {
                outcome = RunOutcome::BestModelFound {
                    last_improved_epoch: window.last_improved(),
                };
                break;
            }
        }

        self.state = SessionState::Stopped;
        if outcome.is_found() {
            tracing::info!("{outcome}");
        } else {
            tracing::warn!("{outcome}");
        }

        Ok(RunSummary {
            outcome,
            epochs_run: self.epoch - start,
            model:      self.best_known_model()?,
        })
    }

    /// Load the checkpoint this session wrote.
    pub fn best_model(&self) -> TrainResult<L::Model> {
        if self.history.valid_epochs().is_empty() {
            return Err(TrainError::CheckpointNotFound {
                path: self.learner.checkpoint_path().to_path_buf(),
            });
        }
        self.learner.load_checkpoint()
    }

    /// The model as it is right now (unlikely to be the best one).
    pub fn last_model(&self) -> &L::Model {
        self.learner.model()
    }

    /// Swap the best known model back into the learner, so `test`
    /// and `last_model` see it. Training continues from there.
    pub fn restore_best_model(&mut self) -> TrainResult<()> {
        let best = self.best_known_model()?;
        self.learner.set_model(best);
        Ok(())
    }

    /// Mean loss over the test source with the current model.
    pub fn test(&mut self) -> TrainResult<f64> {
        let loss = self.learner.evaluate(Split::Test)?;
        tracing::info!("Test loss: {:.7}", loss);
        Ok(loss)
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn best_valid_loss(&self) -> f64 {
        self.best_valid_loss
    }

    pub fn history(&self) -> &LossHistory {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn learner(&self) -> &L {
        &self.learner
    }

    // ─── internals ────────────────────────────────────────────────────────────

    fn run_one_epoch(&mut self) -> TrainResult<EpochReport> {
        let result = self.step_epoch();
        self.state = SessionState::Idle;
        let report = result?;

        tracing::debug!(
            "epoch {}: train={:.7} valid={:.7}{}",
            report.epoch,
            report.train_loss,
            report.valid_loss,
            if report.checkpointed { " (checkpoint)" } else { "" },
        );

        for observer in self.observers.iter_mut() {
            observer.on_epoch(&report)?;
        }
        Ok(report)
    }

    /// All-or-nothing: history and counters change only at the end.
    fn step_epoch(&mut self) -> TrainResult<EpochReport> {
        self.state = SessionState::RunningEpoch;
        let train_loss = self.learner.train_epoch()?;

        self.state = SessionState::Validating;
        let valid_loss   = self.learner.evaluate(Split::Valid)?;
        let checkpointed = is_improvement(valid_loss, self.best_valid_loss);

        if checkpointed {
            self.state = SessionState::Checkpointing;
            self.learner.save_checkpoint()?;
            self.best_valid_loss = valid_loss;
        }

        let report = EpochReport { epoch: self.epoch, train_loss, valid_loss, checkpointed };
        self.history.record(&report);
        self.epoch += 1;
        Ok(report)
    }

    fn best_known_model(&self) -> TrainResult<L::Model> {
        if self.history.valid_epochs().is_empty() {
            return Ok(self.baseline.clone());
        }
        self.learner.load_checkpoint()
    }
}

fn format_header() -> String {
    format!("{:>6}  {:>14}  {:>16}  {}", "Epoch", "Training Loss", "Validation Loss", "Saved")
}

fn format_row(report: &EpochReport) -> String {
    format!(
        "{:>6}  {:>14.7}  {:>16.7}  {}",
        report.epoch,
        report.train_loss,
        report.valid_loss,
        if report.checkpointed { "✓" } else { "" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::RefCell,
        io,
        path::{Path, PathBuf},
        rc::Rc,
        sync::{Arc, Mutex},
    };

    /// Replays fixed validation losses. The model is a version
    /// counter bumped by every train pass.
    struct ScriptedLearner {
        /// First entry is the seed measurement; the last one repeats
        valid:       Vec<f64>,
        evaluations: usize,
        version:     u32,
        saved:       Option<u32>,
        saves:       usize,
        empty_train: bool,
        path:        PathBuf,
    }

    impl ScriptedLearner {
        fn new(valid: &[f64]) -> Self {
            Self {
                valid:       valid.to_vec(),
                evaluations: 0,
                version:     0,
                saved:       None,
                saves:       0,
                empty_train: false,
                path:        PathBuf::from("scripted.bin"),
            }
        }

        fn with_empty_train(mut self) -> Self {
            self.empty_train = true;
            self
        }
    }

    impl Learner for ScriptedLearner {
        type Model = u32;

        fn train_epoch(&mut self) -> TrainResult<f64> {
            if self.empty_train {
                return Err(TrainError::EmptyDataset { split: Split::Train });
            }
            self.version += 1;
            Ok(1.0 / f64::from(self.version))
        }

        fn evaluate(&mut self, split: Split) -> TrainResult<f64> {
            if split == Split::Test {
                return Ok(0.25);
            }
            let index = self.evaluations.min(self.valid.len() - 1);
            self.evaluations += 1;
            Ok(self.valid[index])
        }

        fn save_checkpoint(&mut self) -> TrainResult<()> {
            self.saved = Some(self.version);
            self.saves += 1;
            Ok(())
        }

        fn load_checkpoint(&self) -> TrainResult<u32> {
            self.saved.ok_or_else(|| TrainError::CheckpointNotFound { path: self.path.clone() })
        }

        fn checkpoint_path(&self) -> &Path {
            &self.path
        }

        fn model(&self) -> &u32 {
            &self.version
        }

        fn set_model(&mut self, model: u32) {
            self.version = model;
        }
    }

    struct Recorder(Rc<RefCell<Vec<EpochReport>>>);

    impl EpochObserver for Recorder {
        fn on_epoch(&mut self, report: &EpochReport) -> TrainResult<()> {
            self.0.borrow_mut().push(*report);
            Ok(())
        }
    }

    fn session(valid: &[f64]) -> TrainingSession<ScriptedLearner> {
        TrainingSession::new(ScriptedLearner::new(valid)).unwrap()
    }

    #[test]
    fn test_construction_seeds_best_loss() {
        let s = session(&[0.8, 0.5]);
        assert_eq!(s.epoch(), 0);
        assert_eq!(s.best_valid_loss(), 0.8);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_run_epochs_advances_epoch_and_history() {
        let mut s = session(&[1.0, 0.9, 0.95, 0.7]);
        s.run_epochs(3, Verbosity::quiet()).unwrap();

        assert_eq!(s.epoch(), 3);
        assert_eq!(s.history().loss_train().len(), 3);
        assert_eq!(s.history().loss_valid().len(), 3);

        s.run_epochs(2, Verbosity::quiet()).unwrap();
        assert_eq!(s.epoch(), 5);
        assert_eq!(s.history().loss_valid().len(), 5);
    }

    #[test]
    fn test_best_loss_is_monotone_and_tracks_checkpoints() {
        let mut s = session(&[1.0, 0.9, 0.95, 0.7, 0.8, 0.6]);
        let mut previous = s.best_valid_loss();
        for _ in 0..5 {
            s.run_epochs(1, Verbosity::quiet()).unwrap();
            assert!(s.best_valid_loss() <= previous);
            previous = s.best_valid_loss();
        }

        assert_eq!(s.history().valid_epochs(), &[0, 2, 4]);
        assert_eq!(s.best_valid_loss(), 0.6);
        assert_eq!(s.learner().saves, 3);

        let min_checkpointed = s
            .history()
            .valid_epochs()
            .iter()
            .map(|e| s.history().loss_valid()[e])
            .fold(f64::INFINITY, f64::min);
        assert_eq!(min_checkpointed, s.best_valid_loss());
    }

    #[test]
    fn test_equal_loss_does_not_checkpoint() {
        let mut s = session(&[0.5, 0.5]);
        s.run_epochs(3, Verbosity::quiet()).unwrap();
        assert!(s.history().valid_epochs().is_empty());
        assert_eq!(s.learner().saves, 0);
    }

    #[test]
    fn test_split_runs_match_single_run() {
        let script = [1.0, 0.9, 0.95, 0.7, 0.8];

        let mut twice = session(&script);
        twice.run_epochs(2, Verbosity::quiet()).unwrap();
        twice.run_epochs(2, Verbosity::quiet()).unwrap();

        let mut four = session(&script);
        for _ in 0..4 {
            four.run_epochs(1, Verbosity::quiet()).unwrap();
        }

        assert_eq!(twice.epoch(), four.epoch());
        assert_eq!(twice.best_valid_loss(), four.best_valid_loss());
        assert_eq!(twice.history().loss_train(), four.history().loss_train());
        assert_eq!(twice.history().loss_valid(), four.history().loss_valid());
        assert_eq!(twice.history().valid_epochs(), four.history().valid_epochs());
    }

    #[test]
    fn test_run_without_improvement_exhausts_budget() {
        let mut s = session(&[0.5, 0.7]);
        let summary = s.run(5, 100, false).unwrap();

        assert_eq!(summary.outcome, RunOutcome::BudgetExhausted);
        assert_eq!(summary.epochs_run, 5);
        assert_eq!(s.epoch(), 5);
        // Nothing was checkpointed: the seed model comes back
        assert_eq!(summary.model, 0);
        assert_eq!(*s.last_model(), 5);
        assert_eq!(s.state(), SessionState::Stopped);
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_warns_when_patience_exceeds_budget() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut s = session(&[0.5, 0.7]);
        let summary = tracing::subscriber::with_default(subscriber, || s.run(2, 5, false)).unwrap();
        assert_eq!(summary.epochs_run, 2);

        let text = logs.text();
        let warning = text
            .lines()
            .find(|line| line.contains("max_epochs_without_valid (5) is greater than max_epochs_total (2)"))
            .unwrap_or_else(|| panic!("no budget warning in:\n{text}"));
        assert!(warning.contains("WARN"));
    }

    #[test]
    fn test_no_budget_warning_when_patience_fits() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut s = session(&[0.5, 0.7]);
        tracing::subscriber::with_default(subscriber, || s.run(5, 2, false)).unwrap();
        assert!(!logs.text().contains("is greater than max_epochs_total"));
    }

    #[test]
    fn test_run_stops_after_patience_is_exceeded() {
        let mut s = session(&[1.0, 0.5, 0.9]);
        let summary = s.run(100, 3, false).unwrap();

        assert_eq!(summary.outcome, RunOutcome::BestModelFound { last_improved_epoch: 0 });
        assert_eq!(s.epoch(), 5);
        assert_eq!(summary.epochs_run, 5);
        // Checkpoint written after the first train pass
        assert_eq!(summary.model, 1);
    }

    #[test]
    fn test_run_resumes_from_stopped() {
        let mut s = session(&[1.0, 0.5, 0.9]);
        s.run(2, 1, false).unwrap();
        assert_eq!(s.state(), SessionState::Stopped);

        s.run_epochs(1, Verbosity::quiet()).unwrap();
        assert_eq!(s.epoch(), 3);
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_failed_epoch_records_nothing() {
        let mut s = TrainingSession::new(ScriptedLearner::new(&[1.0]).with_empty_train()).unwrap();
        let err = s.run_epochs(1, Verbosity::quiet()).unwrap_err();

        assert!(matches!(err, TrainError::EmptyDataset { split: Split::Train }));
        assert_eq!(s.epoch(), 0);
        assert!(s.history().is_empty());
        assert_eq!(s.best_valid_loss(), 1.0);
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_best_model_requires_a_checkpoint() {
        let mut s = session(&[0.5, 0.6]);
        s.run_epochs(2, Verbosity::quiet()).unwrap();
        assert!(matches!(s.best_model(), Err(TrainError::CheckpointNotFound { .. })));

        let mut s = session(&[0.5, 0.4]);
        s.run_epochs(2, Verbosity::quiet()).unwrap();
        assert_eq!(s.best_model().unwrap(), 1);
    }

    #[test]
    fn test_observers_see_every_epoch() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut s = session(&[1.0, 0.9, 0.95]);
        s.add_observer(Recorder(Rc::clone(&seen)));

        s.run_epochs(3, Verbosity::quiet()).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].epoch, 0);
        assert!(seen[0].checkpointed);
        assert!(!seen[1].checkpointed);
    }

    #[test]
    fn test_restore_best_model() {
        let mut s = session(&[1.0, 0.5, 0.9]);
        s.run_epochs(3, Verbosity::quiet()).unwrap();
        assert_eq!(*s.last_model(), 3);

        s.restore_best_model().unwrap();
        assert_eq!(*s.last_model(), 1);

        // Without a checkpoint the seed model is restored
        let mut s = session(&[0.5, 0.9]);
        s.run_epochs(2, Verbosity::quiet()).unwrap();
        s.restore_best_model().unwrap();
        assert_eq!(*s.last_model(), 0);
    }

    #[test]
    fn test_test_does_not_touch_history() {
        let mut s = session(&[1.0, 0.9]);
        s.run_epochs(1, Verbosity::quiet()).unwrap();
        assert_eq!(s.test().unwrap(), 0.25);
        assert_eq!(s.epoch(), 1);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_row_marks_checkpointed_epochs() {
        let report = EpochReport { epoch: 3, train_loss: 0.5, valid_loss: 0.25, checkpointed: true };
        let row = format_row(&report);
        assert!(row.trim_start().starts_with('3'));
        assert!(row.ends_with('✓'));
        assert!(format_header().contains("Validation Loss"));
    }
}

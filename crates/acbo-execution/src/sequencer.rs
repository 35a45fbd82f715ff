//! Cancellable step sequencer.
//!
//! A `StepSequencer` walks an ordered list of steps on a fixed cadence and
//! calls back once per step. There is one sequencer per track, and at most one
//! run per sequencer is live: starting a run supersedes the previous one.
//!
//! Supersession is enforced with an epoch held under the sequencer's gate.
//! `run` bumps the epoch under the gate, and every advance re-checks its own
//! epoch under that same gate right before invoking the callback. Once `run`
//! (or `cancel`) has returned, no callback from an older run can fire.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use acbo_core::error::{AcboError, Result};
use acbo_core::track::{Track, TrackState};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How a run ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step was dispatched.
    Completed { steps: usize },
    /// A newer run (or an explicit cancel) took over before the last step.
    Superseded,
}

struct Gate {
    epoch: u64,
    token: CancellationToken,
    state: TrackState,
}

type SharedGate = Arc<Mutex<Gate>>;

fn lock(gate: &SharedGate) -> MutexGuard<'_, Gate> {
    // Callbacks run under the gate; a panicking callback must not wedge the track.
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives one track's step animation.
pub struct StepSequencer {
    track: Track,
    max_duration: Option<Duration>,
    gate: SharedGate,
}

impl StepSequencer {
    pub fn new(track: Track) -> Self {
        Self {
            track,
            max_duration: None,
            gate: Arc::new(Mutex::new(Gate {
                epoch: 0,
                token: CancellationToken::new(),
                state: TrackState::Idle,
            })),
        }
    }

    /// Fails runs that take longer than `limit`. `None` disables the guard.
    pub fn with_max_duration(mut self, limit: Option<Duration>) -> Self {
        self.max_duration = limit;
        self
    }

    pub fn track(&self) -> Track {
        self.track
    }

    /// Current state of this track.
    pub fn state(&self) -> TrackState {
        lock(&self.gate).state.clone()
    }

    /// Starts a run over `steps`, superseding any run in progress.
    ///
    /// Waits `step_delay`, calls `on_advance(0, &steps[0])`, waits again, and
    /// so on until every step is dispatched. Must be called from within a
    /// tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `steps` - Ordered steps of the track
    /// * `step_delay` - Delay before each step
    /// * `on_advance` - Called with the step index and the step. Returning an
    ///   error fails the run with `SequencerFailed`.
    ///
    /// # Returns
    ///
    /// A handle to wait on or cancel the run.
    pub fn run<S, F>(&self, steps: Vec<S>, step_delay: Duration, on_advance: F) -> RunHandle
    where
        S: Send + Sync + 'static,
        F: FnMut(usize, &S) -> Result<()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let epoch = {
            let mut gate = lock(&self.gate);
            gate.token.cancel();
            gate.epoch += 1;
            gate.token = token.clone();
            gate.state = TrackState::Idle;
            gate.epoch
        };

        tracing::info!(
            "[StepSequencer] {} run #{} started ({} steps, {:?}/step)",
            self.track,
            epoch,
            steps.len(),
            step_delay
        );

        let run = Run {
            track: self.track,
            epoch,
            gate: Arc::clone(&self.gate),
            token: token.clone(),
        };
        let task = tokio::spawn(run.drive(steps, step_delay, on_advance, self.max_duration));

        RunHandle {
            track: self.track,
            epoch,
            gate: Arc::clone(&self.gate),
            token,
            task,
        }
    }

    /// Cancels the run in progress, if any, and returns the track to idle.
    pub fn cancel(&self) {
        let mut gate = lock(&self.gate);
        gate.token.cancel();
        gate.epoch += 1;
        gate.state = TrackState::Idle;
    }
}

/// Handle to a single run.
///
/// Dropping the handle detaches the run; it keeps going until it completes or
/// is superseded.
pub struct RunHandle {
    track: Track,
    epoch: u64,
    gate: SharedGate,
    token: CancellationToken,
    task: JoinHandle<Result<usize>>,
}

impl RunHandle {
    /// Cancels this run. No callback of this run fires after this returns.
    ///
    /// Has no effect on the track if a newer run already replaced this one.
    pub fn cancel(&self) {
        let mut gate = lock(&self.gate);
        self.token.cancel();
        if gate.epoch == self.epoch {
            gate.epoch += 1;
            gate.state = TrackState::Idle;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits for the run to end.
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome::Completed { steps })` when every step was dispatched
    /// * `Ok(RunOutcome::Superseded)` when the run was replaced or cancelled
    /// * `Err(AcboError::SequencerTimeout)` or `Err(AcboError::SequencerFailed)`
    ///   when the run failed; the track is then `Failed`
    pub async fn wait(self) -> Result<RunOutcome> {
        match self.task.await {
            Ok(Ok(steps)) => Ok(RunOutcome::Completed { steps }),
            Ok(Err(e)) if e.is_cancelled() => {
                tracing::warn!("[StepSequencer] {} run #{} superseded", self.track, self.epoch);
                Ok(RunOutcome::Superseded)
            }
            Ok(Err(e)) => Err(e),
            Err(join_err) if join_err.is_cancelled() => Ok(RunOutcome::Superseded),
            Err(join_err) => Err(AcboError::sequencer_failed(
                self.track,
                format!("run task panicked: {}", join_err),
            )),
        }
    }
}

// ============================================================================
// Run task
// ============================================================================

struct Run {
    track: Track,
    epoch: u64,
    gate: SharedGate,
    token: CancellationToken,
}

impl Run {
    async fn drive<S, F>(
        self,
        steps: Vec<S>,
        step_delay: Duration,
        mut on_advance: F,
        max_duration: Option<Duration>,
    ) -> Result<usize>
    where
        F: FnMut(usize, &S) -> Result<()>,
    {
        let started = Instant::now();
        let advancing = self.advance_all(&steps, step_delay, &mut on_advance);

        let result = match max_duration {
            Some(limit) => match tokio::time::timeout(limit, advancing).await {
                Ok(result) => result,
                Err(_) => Err(AcboError::SequencerTimeout {
                    track: self.track,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                }),
            },
            None => advancing.await,
        };

        self.finish(&result);
        result
    }

    async fn advance_all<S, F>(&self, steps: &[S], step_delay: Duration, on_advance: &mut F) -> Result<usize>
    where
        F: FnMut(usize, &S) -> Result<()>,
    {
        for (index, step) in steps.iter().enumerate() {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return Err(AcboError::SequencerCancelled),
                _ = tokio::time::sleep(step_delay) => {}
            }

            let mut gate = lock(&self.gate);
            if gate.epoch != self.epoch || self.token.is_cancelled() {
                return Err(AcboError::SequencerCancelled);
            }
            gate.state = TrackState::Running { step: index };
            if let Err(e) = on_advance(index, step) {
                return Err(AcboError::sequencer_failed(self.track, e.to_string()));
            }
        }
        Ok(steps.len())
    }

    fn finish(&self, result: &Result<usize>) {
        let mut gate = lock(&self.gate);
        if gate.epoch != self.epoch {
            return;
        }
        match result {
            Ok(steps) => {
                gate.state = TrackState::Completed;
                tracing::info!("[StepSequencer] {} run #{} completed {} steps", self.track, self.epoch, steps);
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                gate.state = TrackState::Failed { reason: e.to_string() };
                tracing::warn!("[StepSequencer] {} run #{} failed: {}", self.track, self.epoch, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Arc<Mutex<Vec<(&'static str, usize)>>>;

    fn recorder(log: &Log, run: &'static str) -> impl FnMut(usize, &u32) -> Result<()> + Send + 'static {
        let log = Arc::clone(log);
        move |index, _| {
            log.lock().unwrap().push((run, index));
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_dispatches_every_step_in_order() {
        let sequencer = StepSequencer::new(Track::Baseline);
        let log: Log = Arc::default();

        let handle = sequencer.run(vec![0u32; 4], Duration::from_millis(800), recorder(&log, "a"));
        let outcome = handle.wait().await.unwrap();

        assert_eq!(outcome, RunOutcome::Completed { steps: 4 });
        assert_eq!(*log.lock().unwrap(), vec![("a", 0), ("a", 1), ("a", 2), ("a", 3)]);
        assert_eq!(sequencer.state(), TrackState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_fire_on_cadence() {
        let sequencer = StepSequencer::new(Track::Optimized);
        let start = Instant::now();
        let times = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&times);

        sequencer
            .run(vec!["a", "b", "c"], Duration::from_millis(700), move |_, _| {
                sink.lock().unwrap().push(start.elapsed().as_millis());
                Ok(())
            })
            .wait()
            .await
            .unwrap();

        let times = times.lock().unwrap();
        for (i, elapsed) in times.iter().enumerate() {
            let expected = 700 * (i as u128 + 1);
            assert!(*elapsed >= expected && *elapsed < expected + 5, "step {} at {}ms", i, elapsed);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_run_supersedes_previous() {
        let sequencer = StepSequencer::new(Track::Baseline);
        let log: Log = Arc::default();

        let first = sequencer.run(vec![0u32; 5], Duration::from_millis(100), recorder(&log, "a"));
        tokio::time::sleep(Duration::from_millis(250)).await;

        let second = sequencer.run(vec![0u32; 3], Duration::from_millis(100), recorder(&log, "b"));
        let started_b = log.lock().unwrap().len();

        assert_eq!(first.wait().await.unwrap(), RunOutcome::Superseded);
        assert_eq!(second.wait().await.unwrap(), RunOutcome::Completed { steps: 3 });

        let log = log.lock().unwrap();
        assert!(log[started_b..].iter().all(|(run, _)| *run == "b"));
        assert_eq!(*log, vec![("a", 0), ("a", 1), ("b", 0), ("b", 1), ("b", 2)]);
        assert_eq!(sequencer.state(), TrackState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_cancel_stops_callbacks() {
        let sequencer = StepSequencer::new(Track::Baseline);
        let log: Log = Arc::default();

        let handle = sequencer.run(vec![0u32; 4], Duration::from_millis(100), recorder(&log, "a"));
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.cancel();
        assert!(handle.is_cancelled());

        assert_eq!(handle.wait().await.unwrap(), RunOutcome::Superseded);
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(*log.lock().unwrap(), vec![("a", 0)]);
        assert_eq!(sequencer.state(), TrackState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequencer_cancel_returns_to_idle() {
        let sequencer = StepSequencer::new(Track::Optimized);
        let log: Log = Arc::default();

        let handle = sequencer.run(vec![0u32; 3], Duration::from_millis(100), recorder(&log, "a"));
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(sequencer.state(), TrackState::Running { step: 0 });

        sequencer.cancel();

        assert_eq!(handle.wait().await.unwrap(), RunOutcome::Superseded);
        assert_eq!(sequencer.state(), TrackState::Idle);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_duration_fails_track() {
        let sequencer =
            StepSequencer::new(Track::Optimized).with_max_duration(Some(Duration::from_millis(250)));
        let log: Log = Arc::default();

        let err = sequencer
            .run(vec![0u32; 5], Duration::from_millis(100), recorder(&log, "a"))
            .wait()
            .await
            .unwrap_err();

        assert!(matches!(err, AcboError::SequencerTimeout { track: Track::Optimized, .. }));
        assert!(err.is_retryable());
        assert!(matches!(sequencer.state(), TrackState::Failed { .. }));
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_step_fails_run() {
        let sequencer = StepSequencer::new(Track::Baseline);

        let err = sequencer
            .run(vec![1u32, 2, 3], Duration::from_millis(10), |index, _| {
                if index == 1 {
                    Err(AcboError::backend("retrieval unavailable"))
                } else {
                    Ok(())
                }
            })
            .wait()
            .await
            .unwrap_err();

        assert!(matches!(err, AcboError::SequencerFailed { track: Track::Baseline, .. }));
        match sequencer.state() {
            TrackState::Failed { reason } => assert!(reason.contains("retrieval unavailable")),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_run_completes_immediately() {
        let sequencer = StepSequencer::new(Track::Baseline);
        let outcome = sequencer
            .run(Vec::<u32>::new(), Duration::from_secs(1), |_, _| Ok(()))
            .wait()
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Completed { steps: 0 });
        assert_eq!(sequencer.state(), TrackState::Completed);
    }
}

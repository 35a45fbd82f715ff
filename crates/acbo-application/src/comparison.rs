//! Comparison use case.
//!
//! Plays a query back on the baseline and optimized tracks, then records the
//! canned results. A newer comparison (or single query) supersedes any run in
//! flight: the older one records nothing and reports `Superseded`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use acbo_core::config::AcboConfig;
use acbo_core::error::{AcboError, Result};
use acbo_core::query::{QueryResult, ResultMode};
use acbo_core::scenario::{DemoScenario, PipelineStep};
use acbo_core::track::{Track, TrackProgress, TrackState};
use acbo_core::{AppStore, ScenarioRegistry};
use acbo_execution::{RunOutcome, StepSequencer};

/// Per-step hook run before a step is shown. An error fails the track.
///
/// Stands in for real backend work behind a step.
pub type StepCheck = Arc<dyn Fn(ResultMode, usize) -> Result<()> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOutcome {
    Completed {
        baseline: QueryResult,
        optimized: QueryResult,
    },
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Completed(QueryResult),
    Superseded,
}

/// Drives side-by-side and single-track query playback.
pub struct ComparisonUseCase {
    store: Arc<AppStore>,
    config: AcboConfig,
    baseline: StepSequencer,
    optimized: StepSequencer,
    /// Bumped by every comparison or query; guards all of their store writes.
    generation: Mutex<u64>,
    step_check: Option<StepCheck>,
}

impl ComparisonUseCase {
    pub fn new(store: Arc<AppStore>, config: AcboConfig) -> Self {
        let max_run = config.pacing.max_run();
        Self {
            store,
            baseline: StepSequencer::new(Track::Baseline).with_max_duration(max_run),
            optimized: StepSequencer::new(Track::Optimized).with_max_duration(max_run),
            config,
            generation: Mutex::new(0),
            step_check: None,
        }
    }

    pub fn with_step_check(mut self, check: StepCheck) -> Self {
        self.step_check = Some(check);
        self
    }

    pub fn store(&self) -> &Arc<AppStore> {
        &self.store
    }

    /// Runs a catalog scenario in compare mode.
    ///
    /// # Errors
    ///
    /// `NotFound` if `scenario_id` is not in the registry; the store is left
    /// untouched.
    pub async fn run_scenario(&self, scenario_id: &str) -> Result<ComparisonOutcome> {
        let scenario = ScenarioRegistry::find(scenario_id)
            .ok_or_else(|| AcboError::not_found("DemoScenario", scenario_id))?;

        tracing::info!("[ComparisonUseCase] Running scenario '{}'", scenario.id);
        self.store.set_domain(scenario.domain.clone());
        self.store.set_active_scenario(Some(scenario.clone()));
        self.store.set_compare_mode(true);

        self.run_comparison(&scenario.query_text).await
    }

    /// Plays both tracks concurrently, waits the settle delay, then records
    /// the baseline result followed by the optimized one.
    ///
    /// # Returns
    ///
    /// `Superseded` if another comparison or query started meanwhile. Nothing
    /// is recorded in that case.
    ///
    /// # Errors
    ///
    /// * `Config` if the pacing would let the optimized track finish first
    /// * `SequencerTimeout` / `SequencerFailed` once a track has used up its
    ///   retries; that track stays `Failed` in the store
    pub async fn run_comparison(&self, query: &str) -> Result<ComparisonOutcome> {
        self.config.pacing.check_track_order(
            ScenarioRegistry::baseline_steps().len(),
            ScenarioRegistry::optimized_steps().len(),
        )?;

        let generation = self.begin(query);
        tracing::info!("[ComparisonUseCase] Comparison #{} started: {}", generation, query);

        let (baseline, optimized) = tokio::join!(
            self.run_track(ResultMode::Baseline, generation),
            self.run_track(ResultMode::Optimized, generation),
        );

        match (baseline, optimized) {
            (Ok(RunOutcome::Superseded), _) | (_, Ok(RunOutcome::Superseded)) => {
                return Ok(ComparisonOutcome::Superseded);
            }
            (Err(e), _) | (_, Err(e)) => {
                self.abort(generation);
                return Err(e);
            }
            _ => {}
        }

        tokio::time::sleep(self.config.pacing.settle()).await;

        let scenario = self.scenario_for(query);
        let budget = self.config.budget.token_limit;
        let baseline = QueryResult::new(query, scenario.baseline_result(), budget);
        let optimized = QueryResult::new(query, scenario.optimized_result(), budget);

        let recorded = self.if_current(generation, |store| {
            store.add_query_result(baseline.clone());
            store.add_query_result(optimized.clone());
            store.set_results_visible(true);
            store.set_is_querying(false);
        });
        if !recorded {
            return Ok(ComparisonOutcome::Superseded);
        }

        tracing::info!(
            "[ComparisonUseCase] Comparison #{} finished: baseline {:.2}, optimized {:.2}",
            generation,
            baseline.overall_quality_score(),
            optimized.overall_quality_score()
        );
        Ok(ComparisonOutcome::Completed { baseline, optimized })
    }

    /// Single-track playback: the optimized track when ACBO is enabled, the
    /// baseline track otherwise. Records the one matching result.
    pub async fn run_query(&self, query: &str) -> Result<QueryOutcome> {
        let mode = if self.store.read(|s| s.acbo_enabled) {
            ResultMode::Optimized
        } else {
            ResultMode::Baseline
        };

        let generation = self.begin(query);
        tracing::info!("[ComparisonUseCase] Query #{} ({}) started: {}", generation, mode, query);

        match self.run_track(mode, generation).await {
            Ok(RunOutcome::Superseded) => return Ok(QueryOutcome::Superseded),
            Ok(RunOutcome::Completed { .. }) => {}
            Err(e) => {
                self.abort(generation);
                return Err(e);
            }
        }

        tokio::time::sleep(self.config.pacing.settle()).await;

        let scenario = self.scenario_for(query);
        let outcome = match mode {
            ResultMode::Baseline => scenario.baseline_result(),
            ResultMode::Optimized => scenario.optimized_result(),
        };
        let result = QueryResult::new(query, outcome, self.config.budget.token_limit);

        let recorded = self.if_current(generation, |store| {
            store.add_query_result(result.clone());
            store.set_results_visible(true);
            store.set_is_querying(false);
        });
        if !recorded {
            return Ok(QueryOutcome::Superseded);
        }
        Ok(QueryOutcome::Completed(result))
    }

    /// The scenario whose query matches, else the active scenario, else the
    /// default one.
    fn scenario_for(&self, query: &str) -> DemoScenario {
        let query = query.trim();
        if let Some(scenario) = ScenarioRegistry::scenarios().iter().find(|s| s.query_text == query) {
            return scenario.clone();
        }
        self.store
            .read(|s| s.active_scenario.clone())
            .unwrap_or_else(|| ScenarioRegistry::default_scenario().clone())
    }

    // ========================================================================
    // Run bookkeeping
    // ========================================================================

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Supersedes whatever is in flight and resets the query state.
    fn begin(&self, query: &str) -> u64 {
        let mut generation = self.lock_generation();
        *generation += 1;
        self.baseline.cancel();
        self.optimized.cancel();

        self.store.set_current_query(query);
        self.store.set_is_querying(true);
        self.store.reset_tracks();
        *generation
    }

    /// Applies `f` only if `generation` is still the latest run.
    fn if_current(&self, generation: u64, f: impl FnOnce(&AppStore)) -> bool {
        let current = self.lock_generation();
        if *current != generation {
            return false;
        }
        f(&self.store);
        true
    }

    fn abort(&self, generation: u64) {
        self.if_current(generation, |store| store.set_is_querying(false));
    }

    fn sequencer(&self, mode: ResultMode) -> &StepSequencer {
        match mode {
            ResultMode::Baseline => &self.baseline,
            ResultMode::Optimized => &self.optimized,
        }
    }

    /// Runs one track, retrying the whole run on timeout or failure.
    async fn run_track(&self, mode: ResultMode, generation: u64) -> Result<RunOutcome> {
        let (steps, step_delay) = match mode {
            ResultMode::Baseline => (ScenarioRegistry::baseline_steps(), self.config.pacing.baseline_step()),
            ResultMode::Optimized => (ScenarioRegistry::optimized_steps(), self.config.pacing.optimized_step()),
        };
        let total_steps = steps.len();
        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let handle = {
                let current = self.lock_generation();
                if *current != generation {
                    return Ok(RunOutcome::Superseded);
                }
                self.store.set_track_progress(mode, TrackProgress::started(total_steps));

                let store = Arc::clone(&self.store);
                let check = self.step_check.clone();
                self.sequencer(mode).run(steps.to_vec(), step_delay, move |index, _: &PipelineStep| {
                    if let Some(check) = &check {
                        check(mode, index)?;
                    }
                    store.set_track_progress(
                        mode,
                        TrackProgress {
                            state: TrackState::Running { step: index },
                            total_steps,
                        },
                    );
                    Ok(())
                })
            };

            match handle.wait().await {
                Ok(RunOutcome::Completed { steps }) => {
                    let current = self.if_current(generation, |store| {
                        store.set_track_progress(
                            mode,
                            TrackProgress {
                                state: TrackState::Completed,
                                total_steps,
                            },
                        )
                    });
                    if !current {
                        return Ok(RunOutcome::Superseded);
                    }
                    return Ok(RunOutcome::Completed { steps });
                }
                Ok(RunOutcome::Superseded) => return Ok(RunOutcome::Superseded),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        "[ComparisonUseCase] {} track attempt {}/{} failed, retrying: {}",
                        mode,
                        attempt,
                        max_attempts,
                        e
                    );
                }
                Err(e) => {
                    let current = self.if_current(generation, |store| {
                        store.set_track_progress(
                            mode,
                            TrackProgress {
                                state: TrackState::Failed { reason: e.to_string() },
                                total_steps,
                            },
                        )
                    });
                    if !current {
                        return Ok(RunOutcome::Superseded);
                    }
                    tracing::error!("[ComparisonUseCase] {} track failed: {}", mode, e);
                    return Err(e);
                }
            }
        }
    }
}

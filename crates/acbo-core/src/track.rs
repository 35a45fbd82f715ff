//! Per-track progress of the simulated pipelines.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::query::ResultMode;

/// A timed sequence the pilot animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Track {
    Baseline,
    Optimized,
    /// Document ingestion stages.
    Processing,
}

impl From<ResultMode> for Track {
    fn from(mode: ResultMode) -> Self {
        match mode {
            ResultMode::Baseline => Track::Baseline,
            ResultMode::Optimized => Track::Optimized,
        }
    }
}

/// Lifecycle of one sequencer track.
///
/// `Idle -> Running { step } -> Completed`, or `Failed` when a run times
/// out or its step source errors. A superseded run leaves the state to the
/// run that replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackState {
    #[default]
    Idle,
    Running {
        step: usize,
    },
    Completed,
    Failed {
        reason: String,
    },
}

impl TrackState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrackState::Completed | TrackState::Failed { .. })
    }

    /// Index of the last dispatched step, if running.
    pub fn current_step(&self) -> Option<usize> {
        match self {
            TrackState::Running { step } => Some(*step),
            _ => None,
        }
    }
}

/// Progress of one track as seen by the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackProgress {
    pub state: TrackState,
    /// Number of steps in the run, `0` before the first run.
    pub total_steps: usize,
}

impl TrackProgress {
    pub fn started(total_steps: usize) -> Self {
        Self {
            state: TrackState::Idle,
            total_steps,
        }
    }

    /// Whether step `index` has been reached and passed.
    pub fn is_step_complete(&self, index: usize) -> bool {
        match &self.state {
            TrackState::Running { step } => index < *step,
            TrackState::Completed => index < self.total_steps,
            _ => false,
        }
    }
}

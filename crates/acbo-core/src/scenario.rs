//! Demo scenario domain models.
//!
//! A scenario is a fully pre-scripted query together with the two canned
//! payloads shown side by side. The supporting types here (pipeline steps,
//! quality-gate attempts, chunk candidates, processing stages) are the other
//! canned data the registry exposes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::query::{CannedResult, ResultPayload};

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoScenario {
    pub id: String,
    pub display_name: String,
    pub domain: String,
    pub query_text: String,
    pub description: String,
    pub baseline: ResultPayload,
    pub optimized: ResultPayload,
}

impl DemoScenario {
    pub fn baseline_result(&self) -> CannedResult {
        CannedResult::Baseline(self.baseline.clone())
    }

    pub fn optimized_result(&self) -> CannedResult {
        CannedResult::Optimized(self.optimized.clone())
    }
}

/// Display status pre-assigned to a canned pipeline step.
///
/// This is what the step *shows* once reached; the sequencer itself never
/// fails because of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepStatus {
    Success,
    Warning,
    Error,
    Pending,
}

/// One named step of a simulated pipeline track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub title: String,
    pub description: String,
    pub status: StepStatus,
}

impl PipelineStep {
    pub fn new(title: impl Into<String>, description: impl Into<String>, status: StepStatus) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status,
        }
    }
}

/// A stage of the simulated document processing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStage {
    pub name: String,
    pub description: String,
}

/// One attempt of the quality gate in the seeded timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAttempt {
    pub attempt: u32,
    pub elapsed_label: String,
    /// Dimension name and score, in display order.
    pub dimensions: Vec<(String, f64)>,
    pub passed: bool,
    pub action: String,
}

/// A candidate context chunk on the budget optimizer screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkCandidate {
    pub id: u32,
    pub text: String,
    pub score: f64,
    pub tokens: u32,
    pub selected: bool,
}

/// Totals for the selected chunks against a token budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub selected: usize,
    pub candidates: usize,
    pub total_tokens: u32,
    pub average_score: f64,
    /// `1 - total_tokens / budget`, floored at 0.
    pub budget_saved: f64,
}

impl BudgetSummary {
    pub fn compute(candidates: &[ChunkCandidate], budget: u32) -> Self {
        let chosen: Vec<&ChunkCandidate> = candidates.iter().filter(|c| c.selected).collect();
        let total_tokens: u32 = chosen.iter().map(|c| c.tokens).sum();
        let average_score = if chosen.is_empty() {
            0.0
        } else {
            chosen.iter().map(|c| c.score).sum::<f64>() / chosen.len() as f64
        };
        let budget_saved = if budget == 0 {
            0.0
        } else {
            (1.0 - total_tokens as f64 / budget as f64).max(0.0)
        };

        Self {
            selected: chosen.len(),
            candidates: candidates.len(),
            total_tokens,
            average_score,
            budget_saved,
        }
    }
}

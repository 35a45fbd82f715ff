//! Query results.
//!
//! A `QueryResult` is always built from exactly one canned payload, carried
//! in the `CannedResult` variant. The result's mode is read off that variant,
//! so baseline and optimized fields cannot be mixed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::quality::QualityDimension;

/// Which pipeline produced a result (and which sequencer track it ran on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultMode {
    Baseline,
    Optimized,
}

/// User verdict on a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Feedback {
    Positive,
    Negative,
}

/// A cited evidence snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub text: String,
    pub source_label: String,
    /// Relevance in `[0, 1]`.
    pub relevance: f64,
}

impl Evidence {
    pub fn new(text: impl Into<String>, source_label: impl Into<String>, relevance: f64) -> Self {
        Self {
            text: text.into(),
            source_label: source_label.into(),
            relevance,
        }
    }
}

/// The canned fields of one pipeline's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub response_text: String,
    pub overall_quality_score: f64,
    pub tokens_used: u32,
    pub attempt_count: u32,
    #[serde(default)]
    pub dimensions: Vec<QualityDimension>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

/// A payload tagged with the pipeline that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "payload", rename_all = "snake_case")]
pub enum CannedResult {
    Baseline(ResultPayload),
    Optimized(ResultPayload),
}

impl CannedResult {
    pub fn mode(&self) -> ResultMode {
        match self {
            CannedResult::Baseline(_) => ResultMode::Baseline,
            CannedResult::Optimized(_) => ResultMode::Optimized,
        }
    }

    pub fn payload(&self) -> &ResultPayload {
        match self {
            CannedResult::Baseline(p) | CannedResult::Optimized(p) => p,
        }
    }
}

/// A completed query, as recorded in the store's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Unique identifier (UUID format)
    pub id: String,
    pub query_text: String,
    pub outcome: CannedResult,
    pub budget_limit: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

impl QueryResult {
    /// Creates a result with a fresh id and the current timestamp.
    pub fn new(query_text: impl Into<String>, outcome: CannedResult, budget_limit: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query_text: query_text.into(),
            outcome,
            budget_limit,
            timestamp: Utc::now(),
            feedback: None,
        }
    }

    pub fn mode(&self) -> ResultMode {
        self.outcome.mode()
    }

    pub fn response_text(&self) -> &str {
        &self.outcome.payload().response_text
    }

    pub fn overall_quality_score(&self) -> f64 {
        self.outcome.payload().overall_quality_score
    }

    pub fn tokens_used(&self) -> u32 {
        self.outcome.payload().tokens_used
    }

    pub fn attempt_count(&self) -> u32 {
        self.outcome.payload().attempt_count
    }

    pub fn dimensions(&self) -> &[QualityDimension] {
        &self.outcome.payload().dimensions
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.outcome.payload().evidence
    }

    /// Fraction of the budget consumed; may exceed 1.0 for the baseline.
    pub fn budget_usage(&self) -> f64 {
        if self.budget_limit == 0 {
            return 0.0;
        }
        self.tokens_used() as f64 / self.budget_limit as f64
    }
}

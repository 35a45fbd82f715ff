//! Learning insights and the accuracy time series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InsightCategory {
    Pattern,
    Optimization,
    Correction,
    Feedback,
}

/// Something the (hypothetical) offline analysis learned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningInsight {
    pub id: String,
    pub category: InsightCategory,
    pub description: String,
    /// Estimated quality impact as a fraction.
    pub impact_fraction: f64,
    pub timestamp: DateTime<Utc>,
    pub applied: bool,
}

/// One point of the weekly accuracy comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyPoint {
    pub label: String,
    pub baseline: f64,
    pub optimized: f64,
}

impl AccuracyPoint {
    pub fn gain(&self) -> f64 {
        self.optimized - self.baseline
    }
}

/// Gain of the most recent point in a series.
pub fn latest_gain(history: &[AccuracyPoint]) -> Option<f64> {
    history.last().map(AccuracyPoint::gain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_gain() {
        let history = vec![
            AccuracyPoint {
                label: "Week 1".into(),
                baseline: 0.45,
                optimized: 0.72,
            },
            AccuracyPoint {
                label: "Week 2".into(),
                baseline: 0.40,
                optimized: 0.90,
            },
        ];
        let gain = latest_gain(&history).unwrap();
        assert!((gain - 0.5).abs() < 1e-9);
        assert!(latest_gain(&[]).is_none());
    }
}

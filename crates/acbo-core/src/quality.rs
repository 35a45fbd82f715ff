//! Quality dimensions.
//!
//! A dimension is one named axis of a canned quality score together with its
//! pass threshold. Whether it passed is always derived from the two numbers,
//! never stored.

use serde::{Deserialize, Serialize};

/// One named quality axis (coverage, coherence, ...) with its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "DimensionRepr", from = "DimensionRepr")]
pub struct QualityDimension {
    name: String,
    score: f64,
    threshold: f64,
    description: String,
}

impl QualityDimension {
    /// Creates a dimension. `score` and `threshold` are clamped into `[0, 1]`;
    /// NaN becomes 0.
    pub fn new(
        name: impl Into<String>,
        score: f64,
        threshold: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            score: unit_interval(score),
            threshold: unit_interval(threshold),
            description: description.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// `score >= threshold`.
    pub fn passed(&self) -> bool {
        self.score >= self.threshold
    }
}

fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Mean score across dimensions, or `None` for an empty slice.
pub fn mean_score(dimensions: &[QualityDimension]) -> Option<f64> {
    if dimensions.is_empty() {
        return None;
    }
    let total: f64 = dimensions.iter().map(QualityDimension::score).sum();
    Some(total / dimensions.len() as f64)
}

/// Wire form. `passed` is emitted for readers and ignored on the way in.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DimensionRepr {
    name: String,
    score: f64,
    threshold: f64,
    #[serde(default)]
    passed: bool,
    description: String,
}

impl From<QualityDimension> for DimensionRepr {
    fn from(d: QualityDimension) -> Self {
        Self {
            passed: d.passed(),
            name: d.name,
            score: d.score,
            threshold: d.threshold,
            description: d.description,
        }
    }
}

impl From<DimensionRepr> for QualityDimension {
    fn from(r: DimensionRepr) -> Self {
        QualityDimension::new(r.name, r.score, r.threshold, r.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_when_score_above_threshold() {
        let d = QualityDimension::new("Coverage", 0.95, 0.8, "");
        assert!(d.passed());
    }

    #[test]
    fn test_failed_when_score_below_threshold() {
        let d = QualityDimension::new("Coherence", 0.6, 0.7, "");
        assert!(!d.passed());
    }

    #[test]
    fn test_passed_at_exact_threshold() {
        let d = QualityDimension::new("Temporal", 0.7, 0.7, "");
        assert!(d.passed());
    }

    #[test]
    fn test_values_are_clamped() {
        let d = QualityDimension::new("Redundancy", 1.4, f64::NAN, "");
        assert_eq!(d.score(), 1.0);
        assert_eq!(d.threshold(), 0.0);
    }

    #[test]
    fn test_stale_passed_flag_is_recomputed_on_deserialize() {
        let json = r#"{"name":"Coverage","score":0.6,"threshold":0.7,"passed":true,"description":"x"}"#;
        let d: QualityDimension = serde_json::from_str(json).unwrap();
        assert!(!d.passed());

        let out = serde_json::to_value(&d).unwrap();
        assert_eq!(out["passed"], serde_json::json!(false));
    }

    #[test]
    fn test_mean_score() {
        let dims = vec![
            QualityDimension::new("a", 0.5, 0.1, ""),
            QualityDimension::new("b", 1.0, 0.1, ""),
        ];
        assert_eq!(mean_score(&dims), Some(0.75));
        assert_eq!(mean_score(&[]), None);
    }
}

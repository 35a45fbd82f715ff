//! Configuration model.
//!
//! Loaded from `~/.config/acbo/config.toml` by the infrastructure layer's
//! `ConfigService`. Every section has defaults, so a missing file or a
//! partial file is fine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AcboError, Result};

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AcboConfig {
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AcboConfig {
    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.pacing.validate()?;
        if self.retry.max_attempts == 0 {
            return Err(AcboError::config("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }
}

/// Per-step delays for the simulated tracks, in milliseconds.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PacingConfig {
    pub baseline_step_ms: u64,
    pub optimized_step_ms: u64,
    /// Pause between both tracks finishing and the results being shown.
    pub settle_ms: u64,
    pub processing_stage_ms: u64,
    /// Upper bound for one sequencer run; `0` disables the guard.
    pub max_run_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            baseline_step_ms: 800,
            optimized_step_ms: 700,
            settle_ms: 500,
            processing_stage_ms: 1500,
            max_run_ms: 30_000,
        }
    }
}

impl PacingConfig {
    pub fn baseline_step(&self) -> Duration {
        Duration::from_millis(self.baseline_step_ms)
    }

    pub fn optimized_step(&self) -> Duration {
        Duration::from_millis(self.optimized_step_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn processing_stage(&self) -> Duration {
        Duration::from_millis(self.processing_stage_ms)
    }

    pub fn max_run(&self) -> Option<Duration> {
        (self.max_run_ms > 0).then(|| Duration::from_millis(self.max_run_ms))
    }

    /// The optimized track must finish after the baseline track for the
    /// given step counts.
    pub fn check_track_order(&self, baseline_steps: usize, optimized_steps: usize) -> Result<()> {
        let baseline_total = self.baseline_step_ms * baseline_steps as u64;
        let optimized_total = self.optimized_step_ms * optimized_steps as u64;
        if optimized_total <= baseline_total {
            return Err(AcboError::config(format!(
                "optimized track ({}ms) must finish after baseline track ({}ms)",
                optimized_total, baseline_total
            )));
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.baseline_step_ms == 0 || self.optimized_step_ms == 0 {
            return Err(AcboError::config("step delays must be non-zero"));
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Whole-run attempts per track, including the first.
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BudgetConfig {
    pub token_limit: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self { token_limit: 8000 }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            model: "gpt-4.1-mini".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AcboConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.pacing.check_track_order(4, 5).is_ok());
        assert_eq!(config.budget.token_limit, 8000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AcboConfig = toml::from_str(
            r#"
            [pacing]
            baseline_step_ms = 600
            optimized_step_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.pacing.baseline_step_ms, 600);
        assert_eq!(config.pacing.settle_ms, 500);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_track_order_rejects_faster_optimized_track() {
        let pacing = PacingConfig {
            optimized_step_ms: 100,
            ..PacingConfig::default()
        };
        let err = pacing.check_track_order(4, 5).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = AcboConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_run_guard_can_be_disabled() {
        let pacing = PacingConfig {
            max_run_ms: 0,
            ..PacingConfig::default()
        };
        assert!(pacing.max_run().is_none());
    }
}

//! Error types for the ACBO pilot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::track::Track;

/// A shared error type for the entire ACBO pilot.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AcboError {
    /// Credentials were rejected by the authenticator
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A sequencer run was superseded by a newer run on the same track.
    ///
    /// Never surfaced to the user; `RunHandle::wait` maps it to
    /// `RunOutcome::Superseded`.
    #[error("Sequencer run cancelled")]
    SequencerCancelled,

    /// A sequencer run exceeded its maximum duration
    #[error("Sequencer timeout on {track} track after {elapsed_ms}ms")]
    SequencerTimeout { track: Track, elapsed_ms: u64 },

    /// A sequencer run could not complete
    #[error("Sequencer failed on {track} track: {reason}")]
    SequencerFailed { track: Track, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Error reported by (or while talking to) the RAG backend
    #[error("Backend error: {0}")]
    Backend(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AcboError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a SequencerFailed error
    pub fn sequencer_failed(track: Track, reason: impl Into<String>) -> Self {
        Self::SequencerFailed {
            track,
            reason: reason.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an Auth error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error represents a superseded sequencer run
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::SequencerCancelled)
    }

    /// Check if a whole-run retry may recover from this error.
    ///
    /// Returns true for sequencer timeouts and failures. Cancellation is not
    /// retryable: a newer run already owns the track.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SequencerTimeout { .. } | Self::SequencerFailed { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AcboError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AcboError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AcboError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AcboError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error
impl From<anyhow::Error> for AcboError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, AcboError>`.
pub type Result<T> = std::result::Result<T, AcboError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = AcboError::not_found("QueryResult", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: QueryResult 'abc'");
    }

    #[test]
    fn test_retryable() {
        let timeout = AcboError::SequencerTimeout {
            track: Track::Optimized,
            elapsed_ms: 100,
        };
        assert!(timeout.is_retryable());
        assert!(AcboError::sequencer_failed(Track::Baseline, "boom").is_retryable());
        assert!(!AcboError::SequencerCancelled.is_retryable());
        assert!(!AcboError::auth("nope").is_retryable());
    }

    #[test]
    fn test_from_toml_error() {
        let err: AcboError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, AcboError::Serialization { ref format, .. } if format == "TOML"));
    }
}

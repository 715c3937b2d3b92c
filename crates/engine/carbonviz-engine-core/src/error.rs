//! Error types for the reconciliation engine

use serde::{Deserialize, Serialize};

/// Failures raised while building scales or scheduling transitions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum EngineError {
    /// Band padding outside [0, 1)
    #[error("Invalid band padding: {padding} (expected 0 <= padding < 1)")]
    InvalidPadding { padding: f32 },

    /// Transition timing that is negative or not finite
    #[error("Invalid transition timing: duration={duration_ms}ms delay={delay_ms}ms")]
    InvalidTiming { duration_ms: f64, delay_ms: f64 },

    /// Scale kind paired with a domain or range of the wrong shape
    #[error("Scale mismatch for {kind}: {reason}")]
    ScaleMismatch { kind: String, reason: String },

    /// Key with no element on stage
    #[error("Unknown element key: {key}")]
    UnknownKey { key: String },
}

impl EngineError {
    /// Check if this is a recoverable error
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidTiming { .. } | Self::UnknownKey { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidPadding { .. } | Self::ScaleMismatch { .. } => "scale",
            Self::InvalidTiming { .. } => "transition",
            Self::UnknownKey { .. } => "stage",
        }
    }
}

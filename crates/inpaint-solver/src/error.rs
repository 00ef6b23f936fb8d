//! Error types for session setup, configuration and capture.
//!
//! Every variant is fatal for the session that raised it. A capture source
//! with no new frame is not an error and never shows up here.

use std::path::PathBuf;
use thiserror::Error;

use inpaint_compute::ComputeError;

/// Result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;

/// Errors raised while building or driving an inpainting session.
#[derive(Debug, Error)]
pub enum SolverError {
    /// I/O error reading or writing config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// A configuration value is out of range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the config.
        name: &'static str,
        /// Description of what's wrong.
        reason: String,
    },

    /// The capture source does not deliver single-channel 8-bit frames.
    #[error("unsupported capture format: {format} (expected GRAY8)")]
    UnsupportedFormat {
        /// Format reported by the source.
        format: String,
    },

    /// The capture source failed to produce a frame.
    #[error("capture failed: {0}")]
    Capture(String),

    /// Field construction error.
    #[error(transparent)]
    Field(#[from] inpaint_core::Error),

    /// Backend or kernel error.
    #[error(transparent)]
    Compute(#[from] ComputeError),
}

impl SolverError {
    /// Shorthand for [`SolverError::InvalidParameter`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// `true` for errors caused by the configuration rather than the runtime.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Yaml(_) | Self::ConfigNotFound { .. } | Self::InvalidParameter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SolverError::invalid("alpha", "must be finite");
        assert_eq!(err.to_string(), "invalid parameter 'alpha': must be finite");
        assert!(err.is_config_error());

        let err = SolverError::UnsupportedFormat { format: "RGB8".into() };
        assert!(err.to_string().contains("GRAY8"));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_from_compute() {
        let err: SolverError = ComputeError::InvalidDimensions(0, 3).into();
        assert!(matches!(err, SolverError::Compute(_)));
    }
}

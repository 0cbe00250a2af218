//! Error types for the entropy-window crate.
//!
//! Domain violations are fatal for the configuration that caused them.
//! Threshold searches that run out of iterations are not errors; they come
//! back as [`ThresholdStatus::LowConfidence`](crate::threshold::ThresholdStatus).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum WindowError {
    // ---------------------------------------------------------------------
    // Domain violations
    // ---------------------------------------------------------------------
    #[error("{name} = {value} is outside the open interval (0, 1)")]
    Domain { name: &'static str, value: f64 },

    #[error("Δ(p) is NaN at every sampled point of the {what}")]
    NoFiniteSamples { what: &'static str },

    #[error("empty window: need γ ≤ β after clamping to [0, 1/2] (γ = {gamma}, β = {beta})")]
    EmptyWindow { gamma: f64, beta: f64 },

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ---------------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------------
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl WindowError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// True for the errors that mean "parameters outside the model's domain".
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::Domain { .. } | Self::NoFiniteSamples { .. } | Self::EmptyWindow { .. }
        )
    }
}

/// Result type alias for entropy-window.
pub type Result<T> = std::result::Result<T, WindowError>;

/// Check that `value` lies strictly inside (0, 1).
pub fn check_unit_open(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(WindowError::Domain { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_unit_open_rejects_endpoints() {
        assert!(check_unit_open("beta", 0.0).is_err());
        assert!(check_unit_open("beta", 1.0).is_err());
        assert!(check_unit_open("beta", f64::NAN).is_err());
        assert!(check_unit_open("beta", -0.2).is_err());
        assert_eq!(check_unit_open("beta", 0.34).unwrap(), 0.34);
    }

    #[test]
    fn test_domain_classification() {
        let err = check_unit_open("theta", 1.5).unwrap_err();
        assert!(err.is_domain());
        assert!(err.to_string().contains("theta"));
        assert!(!WindowError::InvalidConfig("x".into()).is_domain());
        assert!(WindowError::EmptyWindow { gamma: 0.3, beta: 0.1 }.is_domain());
    }
}

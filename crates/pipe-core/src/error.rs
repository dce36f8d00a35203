//! Error types for the synthesis engine.

use thiserror::Error;

/// Errors surfaced to the caller. Every variant is raised before any mesh
/// buffer is allocated, so a failed call never leaves partial output.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// A geometry parameter is out of range.
    #[error("invalid geometry: {field} {reason}")]
    InvalidGeometry {
        /// Offending parameter name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A calibration constant is out of range.
    #[error("invalid calibration: {field} {reason}")]
    InvalidCalibration {
        /// Offending constant name.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A reading cannot be placed or evaluated.
    #[error("invalid reading {id}: {reason}")]
    InvalidReading {
        /// Reading id.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A raw sample could not be parsed into readings.
    #[error("malformed sample: {0}")]
    MalformedSample(String),

    /// JSON encoding or decoding failed.
    #[error("wire format error: {0}")]
    Wire(#[from] serde_json::Error),
}

impl SynthesisError {
    /// Creates an invalid geometry error.
    #[must_use]
    pub fn invalid_geometry(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            field,
            reason: reason.into(),
        }
    }

    /// Creates an invalid calibration error.
    #[must_use]
    pub const fn invalid_calibration(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidCalibration { field, reason }
    }

    /// Creates an invalid reading error.
    #[must_use]
    pub fn invalid_reading(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReading {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a malformed sample error.
    #[must_use]
    pub fn malformed_sample(reason: impl Into<String>) -> Self {
        Self::MalformedSample(reason.into())
    }
}

/// Result type for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthesisError>;

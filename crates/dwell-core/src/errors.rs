//! Cross-cutting error types for Dwell.
//!
//! Domain-specific errors (e.g., `GenAiError`, `PipelineError`) are defined in
//! their respective crates. `CoreError` covers failures of the data contracts
//! themselves.

use thiserror::Error;

/// Errors raised by the core data contracts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A spatial model or material list broke one or more structural invariants.
    #[error("Schema violation: {}", violations.join("; "))]
    SchemaViolation { violations: Vec<String> },

    /// The image bytes are not a raster format the generative backend accepts.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// A data URL or base64 payload could not be decoded.
    #[error("Invalid image payload: {0}")]
    InvalidImage(String),
}

impl CoreError {
    /// Build a `SchemaViolation` from a single message.
    #[must_use]
    pub fn violation(message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            violations: vec![message.into()],
        }
    }
}

//! Pipeline error types.

use dwell_core::CoreError;
use thiserror::Error;

use crate::resilience::{OperationContext, ServiceError};

/// Errors surfaced by pipeline operations and design sessions.
///
/// Every message is written for the end user and suggests a next step.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No generative backend credential is configured. Never retried.
    #[error(
        "The design service is not configured ({0}). Set DWELL_GENAI__API_KEY or GEMINI_API_KEY and try again."
    )]
    Configuration(String),

    /// A spatial model handed to the pipeline breaks its invariants.
    #[error("The spatial model is invalid: {}", violations.join("; "))]
    SchemaViolation {
        /// One entry per broken invariant.
        violations: Vec<String>,
    },

    /// The uploaded image is not a raster format the service accepts.
    #[error("Unsupported image: {0}. Please upload a PNG, JPEG, WebP, or GIF file.")]
    UnsupportedImage(String),

    /// The requested room is not in the spatial model.
    #[error("Room \"{room}\" was not found in the floorplan. Available rooms: {}", available.join(", "))]
    RoomNotFound {
        room: String,
        available: Vec<String>,
    },

    /// The backend answered without any image.
    #[error("No image was produced during {context}. Please try again or pick a different style.")]
    NoImageProduced { context: OperationContext },

    /// The backend answered with neither an image nor an explanation.
    #[error("The service returned an empty response during {context}. Please rephrase your request and try again.")]
    EmptyResponse { context: OperationContext },

    /// A refinement was requested without an instruction.
    #[error("Please describe the change you would like to make.")]
    EmptyInstruction,

    /// The backend returned the input image unchanged.
    #[error(
        "The service returned the design unchanged. Please describe the change more specifically and try again."
    )]
    UnchangedImage,

    #[error("{0}")]
    Analysis(ServiceError),

    #[error("{0}")]
    Generation(ServiceError),

    #[error("{0}")]
    Refinement(ServiceError),

    #[error("{0}")]
    Extraction(ServiceError),

    /// The schema registry is missing a contract (programming error).
    #[error("schema error: {0}")]
    Schema(#[from] dwell_schema::SchemaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No design version with that number exists in the session.
    #[error("Version {0} does not exist in this session.")]
    VersionNotFound(usize),

    /// Selecting another final design would exceed the cap.
    #[error("You can select at most {max} final designs. Deselect one first.")]
    SelectionLimit { max: usize },

    /// The supplier request is missing required content.
    #[error("Cannot send to suppliers: {0}")]
    IncompleteSupplierRequest(String),
}

impl PipelineError {
    /// The wrapped service error, for the four operation-context variants.
    #[must_use]
    pub const fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Analysis(e) | Self::Generation(e) | Self::Refinement(e) | Self::Extraction(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}

impl From<CoreError> for PipelineError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::SchemaViolation { violations } => Self::SchemaViolation { violations },
            CoreError::UnsupportedFormat(msg) | CoreError::InvalidImage(msg) => {
                Self::UnsupportedImage(msg)
            }
        }
    }
}

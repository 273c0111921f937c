//! # dwell-genai
//!
//! Adapter for the external generative backend.
//!
//! Two capabilities are exposed through [`GenerativeBackend`]:
//! - **structured generation**: prompt (plus optional image) and a JSON
//!   Schema in, schema-conformant JSON out
//! - **generative generation**: prompt plus images in, interleaved text and
//!   image parts out
//!
//! [`GeminiClient`] is the production implementation. Everything above this
//! crate depends on the trait, so tests can script responses without a
//! network.

mod error;
mod gemini;
mod http;
mod wire;

pub use error::{ErrorKind, GenAiError};
pub use gemini::GeminiClient;

use std::future::Future;

use dwell_core::DesignImage;

/// A request for schema-constrained JSON output.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub model: String,
    pub prompt: String,
    pub image: Option<DesignImage>,
    /// JSON Schema the response must satisfy.
    pub schema: serde_json::Value,
    pub temperature: Option<f32>,
}

/// A request that may produce images.
#[derive(Debug, Clone)]
pub struct GenerativeRequest {
    pub model: String,
    pub prompt: String,
    /// Input images, in prompt order.
    pub images: Vec<DesignImage>,
    /// Requested output aspect ratio, e.g. `16:9`.
    pub aspect_ratio: Option<String>,
}

/// Text and image parts of a generative response, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerativeResponse {
    pub images: Vec<DesignImage>,
    pub texts: Vec<String>,
}

impl GenerativeResponse {
    /// The first image part, dropping the rest of the response.
    #[must_use]
    pub fn into_first_image(self) -> Option<DesignImage> {
        self.images.into_iter().next()
    }

    /// All text parts joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.texts.join("\n")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.texts.iter().all(|t| t.trim().is_empty())
    }
}

/// The generative backend seam.
pub trait GenerativeBackend: Send + Sync {
    /// Produce a JSON value that conforms to `request.schema`.
    ///
    /// # Errors
    ///
    /// [`GenAiError::SchemaViolation`] when the answer is not valid JSON or
    /// fails the schema; any transport or API error otherwise.
    fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> impl Future<Output = Result<serde_json::Value, GenAiError>> + Send;

    /// Produce text and/or images.
    ///
    /// An empty response is not an error at this level.
    ///
    /// # Errors
    ///
    /// Any transport or API error.
    fn generate(
        &self,
        request: &GenerativeRequest,
    ) -> impl Future<Output = Result<GenerativeResponse, GenAiError>> + Send;
}

/// Validate a structured answer against the schema it was requested with.
///
/// # Errors
///
/// Returns [`GenAiError::SchemaViolation`] listing each violation, or when
/// the schema itself cannot be compiled.
pub fn check_against_schema(
    schema: &serde_json::Value,
    value: &serde_json::Value,
) -> Result<(), GenAiError> {
    dwell_schema::validate_instance(schema, value).map_err(|e| match e {
        dwell_schema::SchemaError::ValidationFailed { errors } => {
            GenAiError::SchemaViolation { errors }
        }
        other => GenAiError::schema(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_helpers() {
        let response = GenerativeResponse {
            images: vec![DesignImage::new("image/png", "A")],
            texts: vec!["one".into(), "two".into()],
        };
        assert_eq!(response.text(), "one\ntwo");
        assert!(!response.is_empty());
        assert!(GenerativeResponse::default().is_empty());
        assert_eq!(
            response.into_first_image().map(|i| i.data),
            Some("A".to_string())
        );
    }

    #[test]
    fn schema_check_reports_violations() {
        let schema = json!({"type": "array", "items": {"type": "string"}});
        assert!(check_against_schema(&schema, &json!(["a"])).is_ok());
        let err = check_against_schema(&schema, &json!([1])).unwrap_err();
        assert!(matches!(err, GenAiError::SchemaViolation { errors } if errors.len() == 1));
    }
}

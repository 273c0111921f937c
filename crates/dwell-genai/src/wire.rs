//! Wire types for the `generateContent` REST endpoint.
//!
//! Requests are built from [`crate::StructuredRequest`] and
//! [`crate::GenerativeRequest`]; responses are flattened into text and image
//! parts. Both directions are pure so they can be tested without a network.

use dwell_core::DesignImage;
use serde::{Deserialize, Serialize};

use crate::error::GenAiError;
use crate::{GenerativeRequest, GenerativeResponse, StructuredRequest};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        alias = "inline_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub inline_data: Option<InlineData>,
    /// Set on reasoning parts, which are not part of the answer.
    #[serde(default, skip_serializing)]
    pub thought: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_json_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

fn image_part(image: &DesignImage) -> Part {
    Part {
        inline_data: Some(InlineData {
            mime_type: image.mime_type.clone(),
            data: image.data.clone(),
        }),
        ..Part::default()
    }
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
        ..Part::default()
    }
}

/// Images first, then the instruction text.
fn user_content(images: &[DesignImage], prompt: &str) -> Content {
    let mut parts: Vec<Part> = images.iter().map(image_part).collect();
    parts.push(text_part(prompt));
    Content {
        role: Some("user".to_string()),
        parts,
    }
}

impl GenerateContentRequest {
    pub(crate) fn structured(request: &StructuredRequest) -> Self {
        Self {
            contents: vec![user_content(
                request.image.as_slice(),
                &request.prompt,
            )],
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                response_mime_type: Some("application/json".to_string()),
                response_json_schema: Some(request.schema.clone()),
                ..GenerationConfig::default()
            }),
        }
    }

    pub(crate) fn generative(request: &GenerativeRequest) -> Self {
        let image_config = request.aspect_ratio.as_ref().map(|ratio| ImageConfig {
            aspect_ratio: ratio.clone(),
        });
        Self {
            contents: vec![user_content(&request.images, &request.prompt)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
                image_config,
                ..GenerationConfig::default()
            }),
        }
    }
}

impl GenerateContentResponse {
    /// The block reason, when the prompt was refused outright.
    pub(crate) fn blocked(&self) -> Option<&str> {
        if !self.candidates.is_empty() {
            return None;
        }
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }

    /// Flatten the first candidate's answer parts into text and images.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Blocked`] when the prompt was refused, or when
    /// the answer is empty because a content filter stopped it.
    pub(crate) fn into_generative(self) -> Result<GenerativeResponse, GenAiError> {
        if let Some(reason) = self.blocked() {
            return Err(GenAiError::Blocked {
                reason: reason.to_string(),
            });
        }
        let mut response = GenerativeResponse::default();
        let (parts, finish_reason) = self
            .candidates
            .into_iter()
            .next()
            .map(|c| (c.content.map(|c| c.parts).unwrap_or_default(), c.finish_reason))
            .unwrap_or_default();
        for part in parts {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(inline) = part.inline_data {
                response
                    .images
                    .push(DesignImage::new(inline.mime_type, inline.data));
            }
            if let Some(text) = part.text
                && !text.trim().is_empty()
            {
                response.texts.push(text);
            }
        }
        if response.is_empty()
            && let Some(reason) = finish_reason.filter(|r| is_safety_stop(r))
        {
            return Err(GenAiError::Blocked { reason });
        }
        Ok(response)
    }
}

/// Finish reasons meaning the answer was withheld by a content filter.
fn is_safety_stop(reason: &str) -> bool {
    matches!(
        reason,
        "SAFETY" | "IMAGE_SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII" | "RECITATION"
    )
}

/// Parse the text of a structured answer into JSON.
///
/// Tolerates a surrounding Markdown code fence, which some models emit even
/// in JSON mode.
///
/// # Errors
///
/// Returns [`GenAiError::SchemaViolation`] if there is no text or it is not
/// valid JSON.
pub(crate) fn parse_structured_text(text: &str) -> Result<serde_json::Value, GenAiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenAiError::schema("structured response was empty"));
    }
    let body = strip_code_fence(trimmed);
    serde_json::from_str(body)
        .map_err(|e| GenAiError::schema(format!("structured response is not valid JSON: {e}")))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

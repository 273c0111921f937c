//! Generative backend configuration.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    String::from("https://generativelanguage.googleapis.com/v1beta")
}

fn default_analysis_model() -> String {
    String::from("gemini-3-flash-preview")
}

fn default_image_model() -> String {
    String::from("gemini-2.5-flash-image")
}

fn default_extraction_model() -> String {
    String::from("gemini-3-flash-preview")
}

const fn default_analysis_temperature() -> f32 {
    0.1
}

fn default_aspect_ratio() -> String {
    String::from("16:9")
}

const fn default_request_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenAiConfig {
    /// API key for the generative backend. Falls back to `GEMINI_API_KEY`,
    /// then `API_KEY`, when left empty.
    #[serde(default)]
    pub api_key: String,

    /// REST base URL, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used to turn a floorplan image into a spatial model.
    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,

    /// Image-capable model used for renders and refinements.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Model used to derive a bill of materials from a render.
    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,

    /// Sampling temperature for floorplan analysis.
    #[serde(default = "default_analysis_temperature")]
    pub analysis_temperature: f32,

    /// Aspect ratio requested for generated renders.
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,

    /// Per-request HTTP timeout. Image generation is slow; keep this generous.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            analysis_model: default_analysis_model(),
            image_model: default_image_model(),
            extraction_model: default_extraction_model(),
            analysis_temperature: default_analysis_temperature(),
            aspect_ratio: default_aspect_ratio(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GenAiConfig {
    /// Whether a credential is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

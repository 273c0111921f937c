//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use dwell_config::GenAiConfig;

use crate::error::GenAiError;
use crate::http::check_response;
use crate::wire::{GenerateContentRequest, GenerateContentResponse, parse_structured_text};
use crate::{GenerativeBackend, GenerativeRequest, GenerativeResponse, StructuredRequest};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Generative backend speaking the Gemini REST API.
///
/// Construction never fails on a missing credential; calls do, with
/// [`GenAiError::Configuration`], so a process can start and report the
/// problem instead of crashing.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client from the `[genai]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn new(config: &GenAiConfig) -> Result<Self, GenAiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("dwell/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
        })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        if !self.is_configured() {
            return Err(GenAiError::Configuration(
                "no API key set (DWELL_GENAI__API_KEY or GEMINI_API_KEY)".to_string(),
            ));
        }
        tracing::debug!(model, "dispatching generateContent");
        let resp = self
            .http
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| GenAiError::Decode(e.to_string()))
    }
}

impl GenerativeBackend for GeminiClient {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<serde_json::Value, GenAiError> {
        let body = GenerateContentRequest::structured(request);
        let response = self
            .generate_content(&request.model, &body)
            .await?
            .into_generative()?;
        let value = parse_structured_text(&response.text())?;
        crate::check_against_schema(&request.schema, &value)?;
        Ok(value)
    }

    async fn generate(&self, request: &GenerativeRequest) -> Result<GenerativeResponse, GenAiError> {
        let body = GenerateContentRequest::generative(request);
        let response = self
            .generate_content(&request.model, &body)
            .await?
            .into_generative()?;
        tracing::debug!(
            model = %request.model,
            images = response.images.len(),
            texts = response.texts.len(),
            "generateContent returned"
        );
        Ok(response)
    }
}

//! Constrained conversational edits of a render.

use dwell_core::{DesignImage, SpatialModel};
use dwell_genai::{GenerativeBackend, GenerativeRequest};
use serde::Serialize;

use crate::error::PipelineError;
use crate::prompts;
use crate::resilience::OperationContext;
use crate::Pipeline;

/// Outcome of a refinement round trip. At least one field is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Refinement {
    /// The edited image; becomes the session's next version.
    pub image: Option<DesignImage>,
    /// Why a change was refused, or commentary on an edit.
    pub explanation: Option<String>,
}

impl Refinement {
    #[must_use]
    pub const fn is_update(&self) -> bool {
        self.image.is_some()
    }
}

impl<B: GenerativeBackend> Pipeline<B> {
    /// Apply `instruction` to `base`, keeping `model`'s structure intact.
    ///
    /// An answer image identical to `base` is not an edit: with an
    /// explanation it is reported as a refusal, without one it fails.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::SchemaViolation`] if `model` breaks its invariants
    /// - [`PipelineError::EmptyInstruction`] if `instruction` is blank
    /// - [`PipelineError::EmptyResponse`] if the answer has neither image nor
    ///   text
    /// - [`PipelineError::UnchangedImage`] if the answer is `base` itself
    /// - [`PipelineError::Refinement`] on exhausted retries or a terminal
    ///   backend failure
    pub async fn refine(
        &self,
        instruction: &str,
        model: &SpatialModel,
        base: &DesignImage,
    ) -> Result<Refinement, PipelineError> {
        const CONTEXT: OperationContext = OperationContext::DesignRefinement;

        model.validate()?;
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(PipelineError::EmptyInstruction);
        }

        let request = GenerativeRequest {
            model: self.genai.image_model.clone(),
            prompt: prompts::refine(&model.elements, instruction)?,
            images: vec![base.clone()],
            aspect_ratio: Some(self.genai.aspect_ratio.clone()),
        };
        tracing::debug!(model = %request.model, instruction, "refining design");

        let response = self
            .policy
            .run(CONTEXT, || self.backend.generate(&request))
            .await?;

        let explanation = Some(response.text().trim().to_string()).filter(|t| !t.is_empty());
        let image = response.into_first_image();
        tracing::debug!(
            encoded_len = image.as_ref().map_or(0, DesignImage::encoded_len),
            has_explanation = explanation.is_some(),
            "refinement answered"
        );

        match (image, explanation) {
            (None, None) => Err(PipelineError::EmptyResponse { context: CONTEXT }),
            (Some(image), explanation) if image.same_bytes(base) => {
                tracing::warn!("refinement returned the base image unchanged");
                explanation.map_or(Err(PipelineError::UnchangedImage), |text| {
                    Ok(Refinement {
                        image: None,
                        explanation: Some(text),
                    })
                })
            }
            (image, explanation) => Ok(Refinement { image, explanation }),
        }
    }
}

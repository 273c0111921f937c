//! Bill of materials for a render.

use dwell_core::{DesignImage, Material, validate_materials};
use dwell_genai::{GenerativeBackend, StructuredRequest};

use crate::error::PipelineError;
use crate::prompts;
use crate::resilience::{OperationContext, ServiceError};
use crate::Pipeline;

impl<B: GenerativeBackend> Pipeline<B> {
    /// List the materials and furnishings visible in `image`.
    ///
    /// The whole list is returned; callers replace any previous list.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Configuration`] without a credential
    /// - [`PipelineError::Extraction`] on exhausted retries, a terminal
    ///   backend failure, or an entry with a non-positive quantity
    pub async fn extract_materials(
        &self,
        image: &DesignImage,
    ) -> Result<Vec<Material>, PipelineError> {
        const CONTEXT: OperationContext = OperationContext::MaterialListGeneration;

        let request = StructuredRequest {
            model: self.genai.extraction_model.clone(),
            prompt: prompts::materials().to_string(),
            image: Some(image.clone()),
            schema: self.schemas.request_schema(dwell_schema::MATERIAL_LIST)?,
            temperature: None,
        };
        tracing::debug!(model = %request.model, "extracting materials");

        let value = self
            .policy
            .run(CONTEXT, || self.backend.generate_structured(&request))
            .await?;

        let invalid = |detail: String| {
            CONTEXT.wrap(ServiceError::invalid_result(
                CONTEXT,
                format!("The material list could not be used ({detail}). Please try again."),
            ))
        };
        let materials: Vec<Material> =
            serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
        validate_materials(&materials).map_err(|e| invalid(e.to_string()))?;

        tracing::debug!(count = materials.len(), "materials extracted");
        Ok(materials)
    }
}

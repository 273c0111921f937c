//! Initial render of one room.

use dwell_core::{DesignImage, SpatialModel};
use dwell_genai::{GenerativeBackend, GenerativeRequest};

use crate::error::PipelineError;
use crate::prompts;
use crate::resilience::OperationContext;
use crate::Pipeline;

impl<B: GenerativeBackend> Pipeline<B> {
    /// Render `room_name` from `model` in `style`.
    ///
    /// The model and room are checked before anything is sent.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::SchemaViolation`] if `model` breaks its invariants
    /// - [`PipelineError::RoomNotFound`] if no room has that name
    /// - [`PipelineError::NoImageProduced`] if the answer has no image
    /// - [`PipelineError::Generation`] on exhausted retries or a terminal
    ///   backend failure
    pub async fn render(
        &self,
        model: &SpatialModel,
        room_name: &str,
        style: &str,
    ) -> Result<DesignImage, PipelineError> {
        const CONTEXT: OperationContext = OperationContext::DesignGeneration;

        model.validate()?;
        if model.room_by_name(room_name).is_none() {
            return Err(PipelineError::RoomNotFound {
                room: room_name.to_string(),
                available: model.room_names().into_iter().map(String::from).collect(),
            });
        }

        let request = GenerativeRequest {
            model: self.genai.image_model.clone(),
            prompt: prompts::render(model, room_name, style)?,
            images: Vec::new(),
            aspect_ratio: Some(self.genai.aspect_ratio.clone()),
        };
        tracing::debug!(model = %request.model, room = room_name, style, "rendering design");

        let response = self
            .policy
            .run(CONTEXT, || self.backend.generate(&request))
            .await?;

        let Some(image) = response.into_first_image() else {
            tracing::error!(room = room_name, "render returned no image");
            return Err(PipelineError::NoImageProduced { context: CONTEXT });
        };
        tracing::debug!(
            room = room_name,
            mime_type = %image.mime_type,
            encoded_len = image.encoded_len(),
            "render ready"
        );
        Ok(image)
    }
}

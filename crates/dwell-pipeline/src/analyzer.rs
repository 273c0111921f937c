//! Floorplan analysis: image → spatial model.

use dwell_core::{DesignImage, SpatialModel};
use dwell_genai::{GenerativeBackend, StructuredRequest};

use crate::error::PipelineError;
use crate::prompts;
use crate::resilience::{OperationContext, ServiceError};
use crate::Pipeline;

impl<B: GenerativeBackend> Pipeline<B> {
    /// Derive the spatial model of a floorplan image.
    ///
    /// The backend answer is schema-checked by the adapter, decoded into
    /// typed structs, then checked against the model invariants. Nothing
    /// partially structured is ever returned.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::UnsupportedImage`] if the image is not a raster
    ///   format the backend accepts (no call is made)
    /// - [`PipelineError::Configuration`] without a credential
    /// - [`PipelineError::Analysis`] on exhausted retries, a terminal backend
    ///   failure, or a model that breaks its invariants
    pub async fn analyze(&self, image: &DesignImage) -> Result<SpatialModel, PipelineError> {
        const CONTEXT: OperationContext = OperationContext::FloorplanAnalysis;

        if image.format().is_none() {
            return Err(PipelineError::UnsupportedImage(format!(
                "'{}' is not a supported floorplan format",
                image.mime_type
            )));
        }

        let request = StructuredRequest {
            model: self.genai.analysis_model.clone(),
            prompt: prompts::analysis(),
            image: Some(image.clone()),
            schema: self.schemas.request_schema(dwell_schema::SPATIAL_MODEL)?,
            temperature: Some(self.genai.analysis_temperature),
        };
        tracing::debug!(
            model = %request.model,
            image = ?image,
            "analyzing floorplan"
        );

        let value = self
            .policy
            .run(CONTEXT, || self.backend.generate_structured(&request))
            .await?;

        let model: SpatialModel = serde_json::from_value(value).map_err(|e| {
            CONTEXT.wrap(ServiceError::invalid_result(
                CONTEXT,
                format!(
                    "The floorplan analysis result could not be read ({e}). Please try again."
                ),
            ))
        })?;

        if let Err(e) = model.validate() {
            tracing::error!(error = %e, "analysis produced an inconsistent spatial model");
            return Err(CONTEXT.wrap(ServiceError::invalid_result(
                CONTEXT,
                format!(
                    "The floorplan analysis produced an inconsistent model ({e}). \
                     Please try again or use a clearer floorplan image."
                ),
            )));
        }

        tracing::debug!(
            elements = model.elements.len(),
            rooms = model.rooms.len(),
            "floorplan analyzed"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use dwell_core::DesignImage;
    use dwell_genai::GenAiError;
    use pretty_assertions::assert_eq;

    use crate::resilience::FailureKind;
    use crate::test_support::{floorplan, floorplan_json, image, pipeline, server_error};
    use crate::PipelineError;

    #[tokio::test]
    async fn returns_typed_model() {
        let pipeline = pipeline();
        pipeline.backend().push_structured(Ok(floorplan_json()));

        let model = pipeline.analyze(&image(1)).await.unwrap();
        assert_eq!(model, floorplan());

        let requests = pipeline.backend().structured_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gemini-3-flash-preview");
        assert_eq!(requests[0].temperature, Some(0.1));
        assert_eq!(requests[0].image, Some(image(1)));
        assert!(requests[0].schema.get("$schema").is_none());
        assert!(requests[0].prompt.contains("1000x1000"));
    }

    #[tokio::test]
    async fn rejects_non_raster_without_calling() {
        let pipeline = pipeline();
        let pdf = DesignImage::new("application/pdf", "JVBERi0=");
        let err = pipeline.analyze(&pdf).await.unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedImage(_)));
        assert_eq!(pipeline.backend().calls(), 0);
    }

    #[tokio::test]
    async fn invariant_violation_is_an_analysis_error() {
        let pipeline = pipeline();
        let mut json = floorplan_json();
        json["rooms"][0]["connectivity"] = serde_json::json!(["room_09"]);
        pipeline.backend().push_structured(Ok(json));

        let err = pipeline.analyze(&image(1)).await.unwrap_err();
        let PipelineError::Analysis(service) = err else {
            panic!("expected an analysis error");
        };
        assert!(service.message.contains("room_09"));
        assert_eq!(pipeline.backend().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn server_failures_carry_image_size_hint() {
        let pipeline = pipeline();
        for _ in 0..3 {
            pipeline.backend().push_structured(Err(server_error()));
        }
        let err = pipeline.analyze(&image(1)).await.unwrap_err();
        let service = err.service_error().unwrap();
        assert_eq!(service.kind, FailureKind::ServiceFailure);
        assert_eq!(service.attempts, 3);
        assert!(service.message.contains("simpler floorplan"));
        assert_eq!(pipeline.backend().calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn schema_mismatch_is_retried_then_wrapped() {
        let pipeline = pipeline();
        for _ in 0..3 {
            pipeline
                .backend()
                .push_structured(Ok(serde_json::json!({"elements": []})));
        }
        let err = pipeline.analyze(&image(1)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Analysis(_)));
        assert_eq!(pipeline.backend().calls(), 3);
    }

    #[tokio::test]
    async fn missing_credential_is_a_configuration_error() {
        let pipeline = pipeline();
        pipeline
            .backend()
            .push_structured(Err(GenAiError::Configuration("no API key".into())));
        let err = pipeline.analyze(&image(1)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }
}

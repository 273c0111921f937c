//! # dwell-pipeline
//!
//! The floorplan-to-render orchestration pipeline.
//!
//! A [`Pipeline`] wraps one [`GenerativeBackend`] and exposes the four
//! operations of a design project:
//!
//! 1. [`Pipeline::analyze`]: floorplan image → [`SpatialModel`] (once per project)
//! 2. [`Pipeline::render`]: model + room + style → design image (once per room)
//! 3. [`Pipeline::refine`]: instruction + model + current image → new image or
//!    an explanation (repeatedly)
//! 4. [`Pipeline::extract_materials`]: final image → bill of materials
//!
//! Every backend call goes through the [`RetryPolicy`]. [`DesignSession`]
//! holds the per-room state (version history, chat transcript, materials,
//! final selection) on top of these operations.
//!
//! [`SpatialModel`]: dwell_core::SpatialModel

mod analyzer;
mod error;
mod extractor;
pub mod prompts;
mod refiner;
mod renderer;
pub mod resilience;
pub mod session;

pub use error::PipelineError;
pub use refiner::Refinement;
pub use resilience::{FailureKind, OperationContext, RetryPolicy, ServiceError};
pub use session::{
    ChatMessage, DesignSession, DesignVersion, RefineOutcome, SelectedDesign, Speaker,
    SupplierRequest, VersionOrigin,
};

use dwell_config::{DwellConfig, GenAiConfig, StudioConfig};
use dwell_genai::GenerativeBackend;
use dwell_schema::SchemaRegistry;

/// The orchestration pipeline over one generative backend.
pub struct Pipeline<B> {
    backend: B,
    schemas: SchemaRegistry,
    genai: GenAiConfig,
    studio: StudioConfig,
    policy: RetryPolicy,
}

impl<B: GenerativeBackend> Pipeline<B> {
    /// Build a pipeline from loaded configuration.
    #[must_use]
    pub fn new(backend: B, config: &DwellConfig) -> Self {
        Self {
            backend,
            schemas: SchemaRegistry::new(),
            genai: config.genai.clone(),
            studio: config.studio.clone(),
            policy: RetryPolicy::from(&config.retry),
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub const fn studio(&self) -> &StudioConfig {
        &self.studio
    }
}

#[cfg(test)]
mod test_support;

//! # dwell-schema
//!
//! JSON Schema generation, validation, and registry for Dwell.
//!
//! Schemas are kept as data (`serde_json::Value`) because they travel inside
//! outbound requests: the generative backend is told which shape to emit for
//! structured output, and the returned payload is checked against the same
//! schema before anything decodes it into the typed structs of `dwell-core`.
//!
//! ## Architecture
//!
//! Data contracts are defined in `dwell-core` with `#[derive(JsonSchema)]`.
//! This crate turns them into a name-addressed registry and provides the
//! validation layer used at the generative client boundary.

mod error;
mod registry;

pub use error::SchemaError;
pub use registry::{SchemaRegistry, validate_instance};

/// Registry name of the full spatial model schema.
pub const SPATIAL_MODEL: &str = "spatial_model";

/// Registry name of the bill-of-materials array schema.
pub const MATERIAL_LIST: &str = "material_list";

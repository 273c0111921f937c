//! Central schema registry for the Dwell data contracts.
//!
//! The `SchemaRegistry` builds JSON Schemas from dwell-core types at
//! construction time using [`schemars::schema_for!`] and provides validation
//! via `jsonschema`.

use std::collections::HashMap;

use schemars::schema_for;

use crate::error::SchemaError;

/// Central store of all JSON Schemas in the Dwell system.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

/// Insert a schema into the map, converting the `schemars` output to a
/// `serde_json::Value`. Panics if `serde_json::to_value` fails (should be
/// infallible for valid `schemars` output).
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, serde_json::to_value(schema_for!($ty)).unwrap());
    };
}

impl SchemaRegistry {
    /// Build a new registry containing every data-contract schema.
    ///
    /// # Panics
    ///
    /// Panics if `serde_json::to_value` fails on any `schemars`-generated
    /// schema. This is not expected in practice because `schemars` always
    /// produces valid JSON-serialisable output.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Spatial model (3) ---
        register!(schemas, crate::SPATIAL_MODEL, dwell_core::SpatialModel);
        register!(schemas, "spatial_element", dwell_core::SpatialElement);
        register!(schemas, "room", dwell_core::Room);

        // --- Materials (2) ---
        register!(schemas, "material", dwell_core::Material);
        register!(schemas, crate::MATERIAL_LIST, Vec<dwell_core::Material>);

        // --- Images (1) ---
        register!(schemas, "design_image", dwell_core::DesignImage);

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Get a schema by name, prepared for embedding in an outbound request.
    ///
    /// Drops the `$schema` meta keyword, which structured-output backends do
    /// not accept; everything else (including `$defs`) is kept.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown.
    pub fn request_schema(&self, name: &str) -> Result<serde_json::Value, SchemaError> {
        let mut schema = self
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;
        if let Some(object) = schema.as_object_mut() {
            object.remove("$schema");
        }
        Ok(schema)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;
        validate_instance(schema, instance)
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a JSON value against a schema held as data.
///
/// # Errors
///
/// Returns `SchemaError::Generation` if the schema itself does not compile,
/// or `SchemaError::ValidationFailed` with one message per violation.
pub fn validate_instance(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Result<(), SchemaError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| SchemaError::Generation(format!("{e}")))?;

    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::ValidationFailed { errors })
    }
}

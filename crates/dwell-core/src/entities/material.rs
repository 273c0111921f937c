use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::MaterialUnit;
use crate::errors::CoreError;

/// One bill-of-materials line derived from a rendered design.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Material {
    pub name: String,
    pub description: String,
    /// Strictly positive; square meters or a count depending on `unit`.
    pub quantity: f64,
    pub unit: MaterialUnit,
}

/// Check every line of a materials list.
///
/// # Errors
///
/// Returns [`CoreError::SchemaViolation`] listing each line whose quantity is
/// not a finite number greater than zero or whose name is blank.
pub fn validate_materials(materials: &[Material]) -> Result<(), CoreError> {
    let mut violations = Vec::new();
    for (idx, material) in materials.iter().enumerate() {
        if !(material.quantity.is_finite() && material.quantity > 0.0) {
            violations.push(format!(
                "material[{idx}] '{}' has non-positive quantity {}",
                material.name, material.quantity
            ));
        }
        if material.name.trim().is_empty() {
            violations.push(format!("material[{idx}] has an empty name"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::SchemaViolation { violations })
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::DEFAULT_CEILING_HEIGHT_M;

const fn default_ceiling_height() -> f64 {
    DEFAULT_CEILING_HEIGHT_M
}

/// An enclosed space bounded by walls and doors.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Sequential id, e.g. `room_01`.
    pub id: String,
    pub name: String,
    /// Semantic room type, e.g. "Kitchen".
    pub classification: String,
    /// Square meters, derived from the floorplan's dimension lines.
    pub area: f64,
    #[serde(default = "default_ceiling_height")]
    pub inferred_ceiling_height: f64,
    /// Room ids reachable through a door.
    #[serde(default)]
    pub connectivity: Vec<String>,
    /// Room ids sharing a wall.
    #[serde(default)]
    pub adjacency: Vec<String>,
    /// Ids of the bounding elements.
    #[serde(default)]
    pub elements: Vec<String>,
}

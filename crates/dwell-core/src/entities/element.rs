use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{DoorType, ElementType};

/// A point on the normalized 1000×1000 floorplan grid (origin top-left).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

/// Extent of an element on the normalized grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
}

/// Start and end angles (degrees) of a swing door's arc.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SwingArc {
    pub start: f64,
    pub end: f64,
}

/// One structural or fixed-equipment item on the floorplan.
///
/// `position` is the top-left corner of the element's bounding box; for doors
/// it is the hinge point.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpatialElement {
    /// Stable token, e.g. `wall_01`, `door_02`.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub position: GridPoint,
    pub dimensions: Dimensions,
    /// Degrees, `[0, 360)`.
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_type: Option<DoorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_swing_arc: Option<SwingArc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_sill_height: Option<f64>,
    /// Free-text label, e.g. "Kitchen Sink".
    pub description: String,
}

//! Element taxonomy, door types, and material units.
//!
//! All enums use `snake_case` serialization so the wire form matches the
//! spatial model JSON shape exactly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ElementType
// ---------------------------------------------------------------------------

/// Kind of structural or fixed-equipment item on a floorplan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Wall,
    Door,
    Window,
    FixedEquipment,
    Column,
    Stairs,
}

impl ElementType {
    pub const ALL: [Self; 6] = [
        Self::Wall,
        Self::Door,
        Self::Window,
        Self::FixedEquipment,
        Self::Column,
        Self::Stairs,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wall => "wall",
            Self::Door => "door",
            Self::Window => "window",
            Self::FixedEquipment => "fixed_equipment",
            Self::Column => "column",
            Self::Stairs => "stairs",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DoorType
// ---------------------------------------------------------------------------

/// How a door opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DoorType {
    Swing,
    Sliding,
}

impl DoorType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Swing => "swing",
            Self::Sliding => "sliding",
        }
    }
}

impl fmt::Display for DoorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MaterialUnit
// ---------------------------------------------------------------------------

/// Unit of a bill-of-materials line.
///
/// Continuous surfaces (flooring, paint, wall coverings) are measured in
/// square meters; discrete objects (furniture, fixtures) are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaterialUnit {
    Sqm,
    Items,
}

impl MaterialUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqm => "sqm",
            Self::Items => "items",
        }
    }
}

impl fmt::Display for MaterialUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

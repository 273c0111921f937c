use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{GridPoint, Room, SpatialElement};
use crate::errors::CoreError;

/// A walkable route between two grid points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CirculationPath {
    pub start: GridPoint,
    pub end: GridPoint,
}

/// The digital twin of one floorplan (the "canonical spatial map").
///
/// Produced once by floorplan analysis and treated as immutable for the rest
/// of a design session. Renders and refinements receive it by reference and
/// use it as a hard geometric constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpatialModel {
    pub elements: Vec<SpatialElement>,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub circulation_paths: Vec<CirculationPath>,
}

impl SpatialModel {
    /// Find a room by its display name (exact match).
    #[must_use]
    pub fn room_by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.name == name)
    }

    #[must_use]
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<&SpatialElement> {
        self.elements.iter().find(|element| element.id == id)
    }

    /// Room names in declaration order.
    #[must_use]
    pub fn room_names(&self) -> Vec<&str> {
        self.rooms.iter().map(|room| room.name.as_str()).collect()
    }

    /// Check the structural invariants of the model.
    ///
    /// - every id, element or room, is unique within the model
    /// - every `rotation` is a finite angle in `[0, 360)`
    /// - every room `area` is a finite number greater than zero
    /// - every id in a room's `connectivity`/`adjacency` names a room, and every
    ///   id in its `elements` names an element
    ///
    /// Enum fields are closed sets and are enforced when the model is decoded.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaViolation`] carrying every violation found.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut violations = Vec::new();

        let mut element_ids = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !element_ids.insert(element.id.as_str()) {
                violations.push(format!("duplicate element id '{}'", element.id));
            }
            if !(element.rotation.is_finite() && (0.0..360.0).contains(&element.rotation)) {
                violations.push(format!(
                    "element '{}' rotation {} is outside [0, 360)",
                    element.id, element.rotation
                ));
            }
        }

        let mut room_ids = HashSet::with_capacity(self.rooms.len());
        for room in &self.rooms {
            if !room_ids.insert(room.id.as_str()) {
                violations.push(format!("duplicate room id '{}'", room.id));
            } else if element_ids.contains(room.id.as_str()) {
                violations.push(format!("room id '{}' is already an element id", room.id));
            }
        }

        for room in &self.rooms {
            if !(room.area.is_finite() && room.area > 0.0) {
                violations.push(format!(
                    "room '{}' area {} must be greater than zero",
                    room.id, room.area
                ));
            }
            for target in &room.connectivity {
                if !room_ids.contains(target.as_str()) {
                    violations.push(format!(
                        "room '{}' connectivity references unknown room '{target}'",
                        room.id
                    ));
                }
            }
            for target in &room.adjacency {
                if !room_ids.contains(target.as_str()) {
                    violations.push(format!(
                        "room '{}' adjacency references unknown room '{target}'",
                        room.id
                    ));
                }
            }
            for target in &room.elements {
                if !element_ids.contains(target.as_str()) {
                    violations.push(format!(
                        "room '{}' references unknown element '{target}'",
                        room.id
                    ));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(CoreError::SchemaViolation { violations })
        }
    }
}

//! Entity structs for the Dwell data contracts.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` so the same
//! type drives the wire form, the schema sent to the generative backend, and
//! typed decoding of its responses. Field names are `camelCase` on the wire.

mod element;
mod material;
mod room;
mod spatial_model;

pub use element::{Dimensions, GridPoint, SpatialElement, SwingArc};
pub use material::{Material, validate_materials};
pub use room::Room;
pub use spatial_model::{CirculationPath, SpatialModel};

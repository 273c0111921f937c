//! # dwell-core
//!
//! Core types and error types for Dwell.
//!
//! This crate provides the foundational types shared across all Dwell crates:
//! - The spatial model (elements, rooms, circulation paths) derived from a floorplan
//! - Structural validation of a spatial model before it is used as a constraint set
//! - Bill-of-materials lines and their unit rules
//! - Design images in base64 transport form, with data-URL interop
//! - Enums for element taxonomy, door types, and material units
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod image;

pub use entities::{
    CirculationPath, Dimensions, GridPoint, Material, Room, SpatialElement, SpatialModel,
    SwingArc, validate_materials,
};
pub use errors::CoreError;
pub use image::{DesignImage, RasterFormat};

/// Side length of the normalized floorplan grid. Coordinates run `0..=GRID_SIZE`
/// on both axes with the origin at the top-left corner.
pub const GRID_SIZE: f64 = 1000.0;

/// Ceiling height assumed for every room when the floorplan carries no section data.
pub const DEFAULT_CEILING_HEIGHT_M: f64 = 2.8;

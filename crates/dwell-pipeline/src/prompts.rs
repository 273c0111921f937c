//! Prompt text for the four backend operations.
//!
//! Prompts are the only lever the pipeline has over the backend's behavior,
//! so each one restates its constraints in full on every call.

use dwell_core::{GRID_SIZE, SpatialElement, SpatialModel};

/// Floorplan analysis: image in, spatial model JSON out.
#[must_use]
pub fn analysis() -> String {
    format!(
        r#"Role: you are an expert architectural drafter. Convert the attached floorplan image into a spatial model JSON document that is a faithful 1:1 digital twin of the drawing.

Symbol legend:
- Walls: thick solid parallel lines. Exterior walls are usually thicker than interior walls.
- Doors: an opening in a wall drawn as a line perpendicular to the wall with a quarter-circle arc showing the swing. The position is the hinge point.
- Windows: a break in a wall drawn as thinner parallel lines inside the wall thickness.
- Stairs: a run of parallel lines for the treads, often with a direction arrow.
- Fixed equipment: sinks (rectangle with one or two inner squares), cooktops (square with four circles or an X), toilets (small circle joined to a rectangle or oval), showers and baths (large rectangle with an X or drain).
- Columns: solid filled squares or circles, free-standing or embedded in a wall.

Coordinate system:
- Overlay a {size}x{size} grid on the image. The origin (0,0) is the top-left corner.
- Use the dimension lines (labels such as "3.80") to establish the scale.
- Every element position (top-left corner of its bounding box) and every dimension is expressed in grid units.
- Rotation is in degrees, in the range [0, 360).

Rules:
1. Map only what is visible. Never invent an element that is not drawn and never omit one that is.
2. Element types are exactly: wall, door, window, fixed_equipment, column, stairs. Door types are swing or sliding.
3. Give every element a unique sequential id by type (wall_01, door_01, window_01, fixed_equipment_01, ...) and a short description such as "Kitchen Sink".
4. Identify every enclosed space bounded by walls and doors as a room with a unique sequential id (room_01, room_02, ...), a name, a classification, and its area in square meters (greater than zero).
5. For each room list the ids of rooms reachable through a door in connectivity, the ids of rooms sharing a wall in adjacency, and the ids of its bounding elements in elements. Every id you reference must exist in the document.
6. Set inferredCeilingHeight to {ceiling} meters.
7. Output only the JSON object. No prose, no markdown."#,
        size = GRID_SIZE,
        ceiling = dwell_core::DEFAULT_CEILING_HEIGHT_M,
    )
}

/// Initial render of one room in a style.
///
/// # Errors
///
/// Returns an error if the model cannot be serialized.
pub fn render(model: &SpatialModel, room_name: &str, style: &str) -> Result<String, serde_json::Error> {
    let blueprint = serde_json::to_string_pretty(model)?;
    Ok(format!(
        r#"Role: you are an interior designer and photorealistic renderer. Produce one hyper-realistic image of a room built strictly from the architectural blueprint below.

Blueprint (spatial model, {size}x{size} grid, origin top-left). It is the non-negotiable source of truth for geometry:
{blueprint}

Task:
1. Build the room named "{room_name}" using the exact positions, dimensions and properties of every wall, door, window, column, stair and fixed equipment element in the blueprint. The architecture is immutable.
2. Decorate it in the "{style}" style: floor and wall materials, color palette, and stylistically consistent movable furniture (sofas, chairs, tables, lamps, rugs).
3. Place the camera at a logical entry point of the room, such as a doorway, with a wide-angle lens that frames the entire room in one shot. This camera position is locked for every later change to this room.
4. Render a single high-resolution photorealistic image from that camera.

Hard constraints:
- Do not alter, move, add or remove any structural element from the blueprint. The rendered geometry must match it exactly.
- Keep decor, materials and colors authentic to the "{style}" style.
- Furniture must not block circulation paths or door swings."#,
        size = GRID_SIZE,
    ))
}

/// Conversational edit of an existing render.
///
/// # Errors
///
/// Returns an error if the element list cannot be serialized.
pub fn refine(elements: &[SpatialElement], instruction: &str) -> Result<String, serde_json::Error> {
    let blueprint = serde_json::to_string_pretty(elements)?;
    Ok(format!(
        r#"Role: you are a precision image editor acting as a virtual decorator. You guard the architectural integrity of the attached render, which was built from an immutable blueprint.

Immutable structural elements (positions and dimensions cannot change):
{blueprint}

Requested change:
"{instruction}"

Procedure:
1. Classify the request.
   - Decorator action (allowed): changing materials or colors ("make the floor dark oak", "paint wall_01 green"), swapping furniture ("replace the sofa with a leather sectional"), adding decor ("put a plant in the corner").
   - Architect action (forbidden): moving, resizing or removing any wall, door, window or other listed element; changing the camera angle, framing or overall room structure.
2. If the action is allowed, apply that single change and nothing else. Keep the exact camera angle, framing, lighting and every unmodified element of the attached image.
3. If the action is forbidden, do not produce an image. Reply with text only, explaining why the change cannot be made and what could be done instead, for example: "I cannot move wall_02 because it is a structural element of the floorplan, but I can change its color or material."

Returning the attached image unchanged counts as a failure. Produce either a modified image or a text explanation."#
    ))
}

/// Bill of materials for a render.
#[must_use]
pub fn materials() -> &'static str {
    "Analyze this interior design image and produce a bill of materials as JSON. \
     Cover every visible surface and every furnishing item. For each entry give a name, \
     a short description, a quantity greater than zero and a unit. Continuous surface \
     materials such as flooring, paint and wall coverings must use the unit \"sqm\" \
     (square meters). Discrete countable objects such as furniture and fixtures must use \
     the unit \"items\". Output only the JSON array."
}

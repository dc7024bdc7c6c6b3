//! Maps raw ring coordinates into the batch's local scene frame.

use bevy::math::{DVec2, Vec2};

use super::PlanarRing;

/// Input units → scene units. Inputs are usually lon/lat degrees, so one
/// scene unit covers 1e-4 degrees (roughly 11 m at mid latitudes).
pub const DEFAULT_SCENE_SCALE: f64 = 10_000.0;

/// Translates by the batch center, then scales. The subtraction happens in
/// f64 so large absolute coordinates keep their precision.
pub fn normalize_ring(ring: &PlanarRing, center: DVec2, scale: f64) -> Vec<Vec2> {
    ring.points()
        .iter()
        .map(|p| ((*p - center) * scale).as_vec2())
        .collect()
}

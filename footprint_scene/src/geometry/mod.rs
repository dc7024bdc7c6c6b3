//! Planar footprint geometry: payload parsing, batch extent, normalization.

pub mod extent;
pub mod normalize;
pub mod payload;

use bevy::math::DVec2;

pub use extent::GlobalExtent;
pub use normalize::{normalize_ring, DEFAULT_SCENE_SCALE};
pub use payload::{parse_payload, PayloadError};

/// Closed outer boundary of a footprint, without the closing duplicate.
/// Always holds at least 3 points.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarRing {
    points: Vec<DVec2>,
}

impl PlanarRing {
    pub const MIN_POINTS: usize = 3;

    /// Returns `None` for fewer than three points.
    pub fn new(points: Vec<DVec2>) -> Option<Self> {
        (points.len() >= Self::MIN_POINTS).then_some(Self { points })
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

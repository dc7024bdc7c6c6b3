//! Renderer traits and default implementations.

mod extruded;

use bevy::prelude::*;

use crate::data::SpatialRecord;

pub use extruded::{
    extrude_footprint, footprint_depth, footprint_material, BevelSettings, ExtrudedRenderer,
    ExtrusionSettings,
};

/// A solid ready to be attached to the scene. Plain data: nothing here is in
/// an asset store or the world until the registry adds it.
pub struct FootprintSolid {
    pub record_id: String,
    pub mesh: Mesh,
    pub material: StandardMaterial,
    pub transform: Transform,
}

/// Turns one normalized footprint into a solid.
pub trait FootprintRenderer: Send + Sync + 'static {
    fn build_solid(&self, footprint: &[Vec2], record: &SpatialRecord) -> FootprintSolid;
}

#[derive(Resource)]
pub struct RendererResource(pub Box<dyn FootprintRenderer>);

impl RendererResource {
    pub fn new(renderer: impl FootprintRenderer) -> Self {
        Self(Box::new(renderer))
    }
}

impl Default for RendererResource {
    fn default() -> Self {
        Self::new(ExtrudedRenderer::default())
    }
}

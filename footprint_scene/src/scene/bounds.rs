//! World-space bounds of the footprint solids currently in the scene.
//!
//! Local boxes are recomputed from the mesh asset on every query, so a mesh
//! edited in place is picked up on the next call without any cache to reset.

use bevy::prelude::*;
use bevy::render::mesh::MeshAabb;
use bevy::render::primitives::Aabb;

use crate::scene::registry::FootprintMesh;

/// Axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingVolume {
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// True when every axis has zero (or invalid) extent.
    pub fn is_degenerate(&self) -> bool {
        let size = self.size();
        !size.is_finite() || size.max_element() <= 0.0
    }
}

/// The eight corners of a local box, moved into world space.
pub fn world_corners(aabb: &Aabb, transform: &GlobalTransform) -> [Vec3; 8] {
    let min = Vec3::from(aabb.min());
    let max = Vec3::from(aabb.max());
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
    ]
    .map(|corner| transform.transform_point(corner))
}

/// Union of local boxes placed by their world transforms.
/// `None` if the iterator is empty.
pub fn union_world_bounds(
    boxes: impl IntoIterator<Item = (Aabb, GlobalTransform)>,
) -> Option<BoundingVolume> {
    boxes
        .into_iter()
        .flat_map(|(aabb, transform)| world_corners(&aabb, &transform))
        .fold(None, |acc: Option<BoundingVolume>, corner| {
            let mut volume = acc.unwrap_or(BoundingVolume::from_point(corner));
            volume.grow(corner);
            Some(volume)
        })
}

/// Bounds over every `FootprintMesh` in `world`. Helper objects such as the
/// ground plane are ignored, as are solids whose mesh has no vertices.
pub fn compute_bounds(world: &mut World) -> Option<BoundingVolume> {
    let mut solids = world.query_filtered::<(&Mesh3d, &GlobalTransform), With<FootprintMesh>>();
    let world = &*world;
    let meshes = world.get_resource::<Assets<Mesh>>()?;
    scene_bounds(solids.iter(world), meshes)
}

/// Same as [`compute_bounds`], for callers that already hold the query and
/// the mesh store (regular systems).
pub fn scene_bounds<'a>(
    solids: impl IntoIterator<Item = (&'a Mesh3d, &'a GlobalTransform)>,
    meshes: &Assets<Mesh>,
) -> Option<BoundingVolume> {
    union_world_bounds(solids.into_iter().filter_map(|(mesh, transform)| {
        let aabb = meshes.get(&mesh.0)?.compute_aabb()?;
        Some((aabb, *transform))
    }))
}

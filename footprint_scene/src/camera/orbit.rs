//! Orbit control: keeps the camera aimed at a target within distance limits.

use bevy::prelude::*;
use bevy::transform::TransformSystem;

#[derive(Component, Clone, Debug, PartialEq)]
pub struct OrbitControl {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitControl {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            min_distance: 0.01,
            max_distance: f32::INFINITY,
        }
    }
}

impl OrbitControl {
    /// Re-apply the constraints to `transform`: clamp its distance to the
    /// target and turn it to face the target.
    pub fn update(&self, transform: &mut Transform) {
        let offset = transform.translation - self.target;
        let distance = offset.length();
        if distance > 0.0 {
            let clamped = distance.clamp(self.min_distance, self.max_distance);
            transform.translation = self.target + offset / distance * clamped;
            transform.look_at(self.target, Vec3::Y);
        }
    }
}

pub fn orbit_camera_plugin(app: &mut App) {
    app.add_systems(
        PostUpdate,
        apply_orbit_constraints.before(TransformSystem::TransformPropagate),
    );
}

/// Host code may move the target directly; keep the camera in sync.
fn apply_orbit_constraints(
    mut cameras: Query<(&OrbitControl, &mut Transform), Changed<OrbitControl>>,
) {
    for (orbit, mut transform) in &mut cameras {
        orbit.update(&mut transform);
    }
}

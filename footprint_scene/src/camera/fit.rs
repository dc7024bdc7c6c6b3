//! Camera fitting: place the camera so a bounding volume fills the view.

use std::time::Duration;

use bevy::prelude::*;
use thiserror::Error;

use crate::camera::orbit::OrbitControl;
use crate::scene::BoundingVolume;

/// Three-quarter view: above and off to the side of the scene.
pub const VIEW_DIRECTION: Vec3 = Vec3::new(1.0, 1.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FitError {
    #[error("bounding volume has no extent to frame")]
    DegenerateBounds,
    #[error("fit padding must be positive and finite, got {0}")]
    InvalidPadding(f32),
    #[error("field of view must be in (0, pi), got {0}")]
    InvalidFov(f32),
}

/// Where a fit wants the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTarget {
    pub position: Vec3,
    pub target: Vec3,
    pub distance: f32,
}

/// Marks the camera that scene fits are applied to.
#[derive(Component, Default)]
pub struct FitCamera;

/// `fov_y` is the vertical field of view in radians.
pub fn compute_fit(
    bounds: &BoundingVolume,
    fov_y: f32,
    padding: f32,
) -> Result<FitTarget, FitError> {
    if bounds.is_degenerate() {
        return Err(FitError::DegenerateBounds);
    }
    if !(padding.is_finite() && padding > 0.0) {
        return Err(FitError::InvalidPadding(padding));
    }
    if !(fov_y > 0.0 && fov_y < std::f32::consts::PI) {
        return Err(FitError::InvalidFov(fov_y));
    }

    let center = bounds.center();
    let max_dim = bounds.size().max_element();
    let distance = (max_dim / 2.0) / (fov_y / 2.0).tan() * padding;

    Ok(FitTarget {
        position: center + VIEW_DIRECTION.normalize() * distance,
        target: center,
        distance,
    })
}

/// Vertical field of view of a perspective projection, if it is one.
pub fn vertical_fov(projection: Option<&Projection>) -> Option<f32> {
    match projection {
        Some(Projection::Perspective(perspective)) => Some(perspective.fov),
        Some(_) => None,
        None => Some(PerspectiveProjection::default().fov),
    }
}

/// Snap the camera onto the fit for `bounds`. Leaves the pose untouched and
/// returns the reason when there is nothing sensible to frame.
pub fn fit_camera(
    transform: &mut Transform,
    fov_y: f32,
    orbit: Option<&mut OrbitControl>,
    bounds: Option<&BoundingVolume>,
    padding: f32,
) -> Result<FitTarget, FitError> {
    let fit = bounds
        .ok_or(FitError::DegenerateBounds)
        .and_then(|bounds| compute_fit(bounds, fov_y, padding))
        .inspect_err(|err| warn!("footprints: {err}, camera unchanged"))?;
    apply_fit(transform, orbit, &fit);
    Ok(fit)
}

/// Move the camera straight onto `fit`.
pub fn apply_fit(transform: &mut Transform, orbit: Option<&mut OrbitControl>, fit: &FitTarget) {
    transform.translation = fit.position;
    aim(transform, orbit, fit.target);
}

fn aim(transform: &mut Transform, orbit: Option<&mut OrbitControl>, target: Vec3) {
    match orbit {
        Some(orbit) => {
            orbit.target = target;
            orbit.update(transform);
        }
        None => transform.look_at(target, Vec3::Y),
    }
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// In-flight animated fit, stored on the camera entity. Inserting a new one
/// replaces the old, so the latest request always wins and starts from
/// wherever the previous animation left the camera.
#[derive(Component, Clone, Debug)]
pub struct CameraFitAnimation {
    start_position: Vec3,
    start_target: Vec3,
    end_position: Vec3,
    end_target: Vec3,
    duration: Duration,
    elapsed: Duration,
}

impl CameraFitAnimation {
    /// Captures the camera's current position and aim point as the start.
    pub fn new(
        transform: &Transform,
        orbit: Option<&OrbitControl>,
        fit: &FitTarget,
        duration: Duration,
    ) -> Self {
        let start_target = match orbit {
            Some(orbit) => orbit.target,
            None => {
                let reach = (fit.target - transform.translation).length();
                transform.translation + transform.forward().as_vec3() * reach
            }
        };
        Self {
            start_position: transform.translation,
            start_target,
            end_position: fit.position,
            end_target: fit.target,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance by one frame and write the interpolated pose. Returns `true`
    /// once the animation has reached its end pose.
    pub fn advance(
        &mut self,
        delta: Duration,
        transform: &mut Transform,
        orbit: Option<&mut OrbitControl>,
    ) -> bool {
        self.elapsed = self.elapsed.saturating_add(delta);

        let (position, target) = if self.is_finished() {
            (self.end_position, self.end_target)
        } else {
            let eased = ease_out_cubic(self.progress());
            (
                self.start_position.lerp(self.end_position, eased),
                self.start_target.lerp(self.end_target, eased),
            )
        };

        transform.translation = position;
        aim(transform, orbit, target);
        self.is_finished()
    }
}

/// Start (or restart) an animated fit on `camera`.
pub fn animate_fit(
    commands: &mut Commands,
    camera: Entity,
    transform: &Transform,
    orbit: Option<&OrbitControl>,
    fit: &FitTarget,
    duration: Duration,
) {
    commands
        .entity(camera)
        .insert(CameraFitAnimation::new(transform, orbit, fit, duration));
}

/// Stop an in-flight fit, leaving the camera where it currently is.
pub fn cancel_fit(commands: &mut Commands, camera: Entity) {
    commands.entity(camera).remove::<CameraFitAnimation>();
}

/// Per-frame driver for [`CameraFitAnimation`].
pub fn advance_camera_fit(
    mut commands: Commands,
    time: Res<Time>,
    mut cameras: Query<(
        Entity,
        &mut CameraFitAnimation,
        &mut Transform,
        Option<&mut OrbitControl>,
    )>,
) {
    for (entity, mut animation, mut transform, mut orbit) in &mut cameras {
        if animation.advance(time.delta(), &mut transform, orbit.as_deref_mut()) {
            commands.entity(entity).remove::<CameraFitAnimation>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOV: f32 = std::f32::consts::FRAC_PI_4;

    fn cube(size: f32) -> BoundingVolume {
        BoundingVolume {
            min: Vec3::splat(-size / 2.0),
            max: Vec3::splat(size / 2.0),
        }
    }

    #[test]
    fn unit_padding_gives_exact_framing_distance() {
        let bounds = BoundingVolume {
            min: Vec3::new(0.0, 0.0, 0.0),
            max: Vec3::new(4.0, 1.0, 2.0),
        };
        let fit = compute_fit(&bounds, FOV, 1.0).unwrap();
        let expected = 2.0 / (FOV / 2.0).tan();

        assert!((fit.distance - expected).abs() < 1e-5);
        assert!((fit.position.distance(fit.target) - expected).abs() < 1e-4);
        assert_eq!(fit.target, Vec3::new(2.0, 0.5, 1.0));
    }

    #[test]
    fn doubling_padding_doubles_distance() {
        let bounds = cube(3.0);
        let single = compute_fit(&bounds, FOV, 1.0).unwrap();
        let double = compute_fit(&bounds, FOV, 2.0).unwrap();
        assert!((double.distance - 2.0 * single.distance).abs() < 1e-5);
    }

    #[test]
    fn view_is_oblique() {
        let fit = compute_fit(&cube(1.0), FOV, 1.0).unwrap();
        let dir = (fit.position - fit.target).normalize();
        assert!(dir.x > 0.0 && dir.y > 0.0 && dir.z > 0.0);
    }

    #[test]
    fn degenerate_or_bad_inputs_are_rejected() {
        let point = BoundingVolume::from_point(Vec3::ONE);
        assert_eq!(compute_fit(&point, FOV, 1.0), Err(FitError::DegenerateBounds));
        assert_eq!(
            compute_fit(&cube(1.0), FOV, 0.0),
            Err(FitError::InvalidPadding(0.0))
        );
        assert_eq!(
            compute_fit(&cube(1.0), 0.0, 1.0),
            Err(FitError::InvalidFov(0.0))
        );
    }

    #[test]
    fn empty_bounds_leave_camera_untouched() {
        let original = Transform::from_xyz(3.0, 4.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y);
        let mut transform = original;
        let mut orbit = OrbitControl::default();

        let result = fit_camera(&mut transform, FOV, Some(&mut orbit), None, 1.2);

        assert_eq!(result, Err(FitError::DegenerateBounds));
        assert_eq!(transform, original);
        assert_eq!(orbit, OrbitControl::default());
    }

    #[test]
    fn rejected_padding_leaves_camera_untouched() {
        let original = Transform::from_xyz(3.0, 4.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y);
        let mut transform = original;

        let result = fit_camera(&mut transform, FOV, None, Some(&cube(2.0)), f32::NAN);

        assert!(matches!(result, Err(FitError::InvalidPadding(_))));
        assert_eq!(transform, original);
    }

    #[test]
    fn static_fit_moves_camera_and_orbit_target() {
        let bounds = BoundingVolume {
            min: Vec3::new(8.0, 0.0, 8.0),
            max: Vec3::new(12.0, 2.0, 12.0),
        };
        let mut transform = Transform::default();
        let mut orbit = OrbitControl::default();

        let fit = fit_camera(&mut transform, FOV, Some(&mut orbit), Some(&bounds), 1.0).unwrap();

        assert_eq!(orbit.target, Vec3::new(10.0, 1.0, 10.0));
        assert!((transform.translation - fit.position).length() < 1e-4);
        let looking = transform.forward().as_vec3();
        let wanted = (fit.target - fit.position).normalize();
        assert!((looking - wanted).length() < 1e-5);
    }

    #[test]
    fn ease_out_cubic_endpoints_and_shape() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn animation_follows_ease_and_lands_on_target() {
        let mut transform = Transform::from_xyz(0.0, 0.0, 10.0);
        let mut orbit = OrbitControl::default();
        let fit = compute_fit(&cube(2.0), FOV, 1.0).unwrap();
        let mut animation =
            CameraFitAnimation::new(&transform, Some(&orbit), &fit, Duration::from_millis(1000));

        let done = animation.advance(Duration::from_millis(500), &mut transform, Some(&mut orbit));
        assert!(!done);
        let expected = Vec3::new(0.0, 0.0, 10.0).lerp(fit.position, 0.875);
        assert!((transform.translation - expected).length() < 1e-3);

        let done = animation.advance(Duration::from_millis(600), &mut transform, Some(&mut orbit));
        assert!(done);
        assert_eq!(animation.progress(), 1.0);
        assert!((transform.translation - fit.position).length() < 1e-4);
        assert_eq!(orbit.target, fit.target);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let mut transform = Transform::from_xyz(0.0, 0.0, 10.0);
        let fit = compute_fit(&cube(2.0), FOV, 1.0).unwrap();
        let mut animation = CameraFitAnimation::new(&transform, None, &fit, Duration::ZERO);
        assert!(animation.advance(Duration::ZERO, &mut transform, None));
        assert!((transform.translation - fit.position).length() < 1e-4);
    }

    #[test]
    fn system_removes_finished_animation() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_systems(Update, advance_camera_fit);

        let transform = Transform::from_xyz(0.0, 0.0, 10.0);
        let fit = compute_fit(&cube(2.0), FOV, 1.0).unwrap();
        let camera = app
            .world_mut()
            .spawn((
                transform,
                OrbitControl::default(),
                CameraFitAnimation::new(&transform, None, &fit, Duration::ZERO),
            ))
            .id();

        app.update();

        let world = app.world();
        assert!(world.get::<CameraFitAnimation>(camera).is_none());
        let placed = world.get::<Transform>(camera).unwrap();
        assert!((placed.translation - fit.position).length() < 1e-4);
    }

    #[test]
    fn newer_animation_supersedes_older() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_systems(Update, advance_camera_fit);

        let transform = Transform::from_xyz(0.0, 0.0, 10.0);
        let first = compute_fit(&cube(2.0), FOV, 1.0).unwrap();
        let second = compute_fit(&cube(8.0), FOV, 1.0).unwrap();

        let camera = app
            .world_mut()
            .spawn((
                transform,
                CameraFitAnimation::new(&transform, None, &first, Duration::from_secs(60)),
            ))
            .id();
        app.world_mut()
            .entity_mut(camera)
            .insert(CameraFitAnimation::new(&transform, None, &second, Duration::ZERO));

        app.update();

        let world = app.world();
        assert!(world.get::<CameraFitAnimation>(camera).is_none());
        let placed = world.get::<Transform>(camera).unwrap();
        assert!((placed.translation - second.position).length() < 1e-3);
    }
}

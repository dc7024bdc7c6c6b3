//! Footprint batches: the two-pass build, the ingest system, scene setup.

use std::time::Duration;

use bevy::prelude::*;
use thiserror::Error;

use crate::camera::{
    advance_camera_fit, animate_fit, apply_fit, cancel_fit, compute_fit, vertical_fov, FitCamera,
    FitError, OrbitControl,
};
use crate::data::{BatchChannel, SpatialRecord};
use crate::geometry::{
    normalize_ring, parse_payload, GlobalExtent, PayloadError, DEFAULT_SCENE_SCALE,
};
use crate::render::{ExtrudedRenderer, FootprintRenderer, FootprintSolid, RendererResource};
use crate::scene::bounds::scene_bounds;
use crate::scene::registry::{FootprintMesh, ReplaceStats, SceneMeshRegistry};

const GROUND_SIZE: f32 = 400.0;
const GROUND_Y: f32 = -0.01;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    #[error("no record in the batch has a usable footprint")]
    EmptyBatch,
}

/// Result of a successful batch build.
pub struct BatchOutcome {
    pub solids: Vec<FootprintSolid>,
    pub extent: GlobalExtent,
    /// `(record id, reason)` for every record left out.
    pub skipped: Vec<(String, PayloadError)>,
}

/// Scene-unit conversion for incoming batches.
#[derive(Resource, Clone, Debug)]
pub struct PipelineSettings {
    pub scene_scale: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            scene_scale: DEFAULT_SCENE_SCALE,
        }
    }
}

/// How the camera reacts to a fit request.
#[derive(Resource, Clone, Debug)]
pub struct FitSettings {
    pub padding: f32,
    /// Zero snaps the camera instead of animating.
    pub duration: Duration,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            padding: 1.2,
            duration: Duration::from_millis(800),
        }
    }
}

/// Ask for the camera to be refitted to the current solids.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct FitSceneRequest {
    /// Snap even when an animation duration is configured.
    pub immediate: bool,
}

/// Marker for the reference ground plane. Never part of fitted bounds.
#[derive(Component)]
pub struct GroundPlane;

/// Pass 1 parses every payload and accumulates the shared extent; pass 2
/// normalizes each ring against the shared center and builds its solid.
pub fn build_batch(
    records: &[SpatialRecord],
    scene_scale: f64,
    renderer: &dyn FootprintRenderer,
) -> Result<BatchOutcome, BatchError> {
    let mut parsed = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();
    for record in records {
        match parse_payload(&record.coordinates) {
            Ok(ring) => parsed.push((record, ring)),
            Err(err) => {
                warn!(
                    "footprints: skipping record {} ({}): {err}",
                    record.id,
                    err.reason()
                );
                skipped.push((record.id.clone(), err));
            }
        }
    }

    let extent = GlobalExtent::accumulate(parsed.iter().map(|(_, ring)| ring))
        .ok_or(BatchError::EmptyBatch)?;
    let center = extent.center();

    let mut solids = Vec::with_capacity(parsed.len());
    for (record, ring) in &parsed {
        let local = normalize_ring(ring, center, scene_scale);
        if !local.iter().all(|p| p.is_finite()) {
            let err = PayloadError::OutOfRange;
            warn!(
                "footprints: skipping record {} ({}): {err}",
                record.id,
                err.reason()
            );
            skipped.push((record.id.clone(), err));
            continue;
        }
        solids.push(renderer.build_solid(&local, record));
    }
    if solids.is_empty() {
        return Err(BatchError::EmptyBatch);
    }

    Ok(BatchOutcome {
        solids,
        extent,
        skipped,
    })
}

/// Rebuild the scene from `records`: retire the old solids, attach the new
/// ones, and request a camera fit. An empty batch clears the scene and
/// leaves the camera alone.
pub fn apply_batch(
    world: &mut World,
    records: &[SpatialRecord],
) -> Result<ReplaceStats, BatchError> {
    let scale = world
        .get_resource::<PipelineSettings>()
        .map_or(DEFAULT_SCENE_SCALE, |s| s.scene_scale);
    let outcome = match world.get_resource::<RendererResource>() {
        Some(renderer) => build_batch(records, scale, renderer.0.as_ref()),
        None => build_batch(records, scale, &ExtrudedRenderer::default()),
    };

    world.init_resource::<SceneMeshRegistry>();
    match outcome {
        Ok(outcome) => {
            let skipped = outcome.skipped.len();
            let stats = world.resource_scope(|world, mut registry: Mut<SceneMeshRegistry>| {
                registry.replace(world, outcome.solids)
            });
            info!(
                "footprints: batch of {} records, {} solids ({} skipped, {} retired)",
                records.len(),
                stats.attached,
                skipped,
                stats.retired
            );
            world.send_event(FitSceneRequest::default());
            Ok(stats)
        }
        Err(err) => {
            let retired = world.resource_scope(|world, mut registry: Mut<SceneMeshRegistry>| {
                registry.clear(world)
            });
            info!(
                "footprints: {err} ({} records); cleared {retired} solids",
                records.len()
            );
            Err(err)
        }
    }
}

/// Drains the batch channel and applies only the newest batch. Each batch
/// is a full replacement, so older queued ones are obsolete.
pub fn ingest_batches(world: &mut World) {
    let Some(batch) = world
        .get_resource::<BatchChannel>()
        .and_then(|channel| channel.0.try_iter().last())
    else {
        return;
    };
    if let Err(err) = apply_batch(world, &batch) {
        debug!("footprints: batch of {} records not applied: {err}", batch.len());
    }
}

#[allow(clippy::type_complexity)]
pub fn handle_fit_requests(
    mut commands: Commands,
    mut requests: EventReader<FitSceneRequest>,
    settings: Res<FitSettings>,
    meshes: Res<Assets<Mesh>>,
    solids: Query<(&Mesh3d, &GlobalTransform), With<FootprintMesh>>,
    mut cameras: Query<
        (
            Entity,
            &mut Transform,
            Option<&Projection>,
            Option<&mut OrbitControl>,
        ),
        With<FitCamera>,
    >,
) {
    let Some(immediate) = requests.read().last().map(|r| r.immediate) else {
        return;
    };

    let Some(bounds) = scene_bounds(&solids, &meshes) else {
        info!("footprints: nothing to frame");
        return;
    };

    for (entity, mut transform, projection, mut orbit) in &mut cameras {
        let Some(fov) = vertical_fov(projection) else {
            warn!("footprints: camera {entity} is not perspective, skipping fit");
            continue;
        };
        let fit = match compute_fit(&bounds, fov, settings.padding) {
            Ok(fit) => fit,
            Err(FitError::DegenerateBounds) => {
                warn!("footprints: scene bounds are degenerate, camera unchanged");
                continue;
            }
            Err(err) => {
                warn!("footprints: camera fit failed: {err}");
                continue;
            }
        };

        if immediate || settings.duration.is_zero() {
            cancel_fit(&mut commands, entity);
            apply_fit(&mut transform, orbit.as_deref_mut(), &fit);
        } else {
            animate_fit(
                &mut commands,
                entity,
                &transform,
                orbit.as_deref(),
                &fit,
                settings.duration,
            );
        }
    }
}

/// Registry, settings, ingest and fit systems. Scene setup (camera, lights,
/// ground) is separate so hosts can bring their own.
pub fn footprint_scene_plugin(app: &mut App) {
    app.init_resource::<SceneMeshRegistry>()
        .init_resource::<PipelineSettings>()
        .init_resource::<FitSettings>()
        .add_event::<FitSceneRequest>()
        .add_systems(
            Update,
            (ingest_batches, handle_fit_requests, advance_camera_fit).chain(),
        );
}

pub fn setup_scene(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(10., 10., 10.).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitControl::default(),
        FitCamera,
    ));
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(4., 8., 4.).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });
}

/// Reference plane just below the solids' base.
pub fn spawn_ground_plane(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.16, 0.17, 0.2),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_xyz(0.0, GROUND_Y, 0.0),
        GroundPlane,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "[[0,0],[10,0],[10,10],[0,10],[0,0]]";

    #[test]
    fn one_good_one_bad_record_builds_one_solid() {
        let records = vec![
            SpatialRecord::new("square", "#ff0000", SQUARE),
            SpatialRecord::new("broken", "#00ff00", "alert('x')"),
        ];
        let outcome = build_batch(&records, 1.0, &ExtrudedRenderer::default()).unwrap();

        assert_eq!(outcome.solids.len(), 1);
        assert_eq!(outcome.solids[0].record_id, "square");
        assert_eq!(
            outcome.extent,
            GlobalExtent {
                min_x: 0.0,
                max_x: 10.0,
                min_y: 0.0,
                max_y: 10.0
            }
        );
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].0, "broken");
        assert_eq!(outcome.skipped[0].1.reason(), "malformed");
    }

    #[test]
    fn batch_with_nothing_parseable_is_empty() {
        let records = vec![
            SpatialRecord::new("a", "#fff", "[[0,0],[1,1]]"),
            SpatialRecord::new("b", "#fff", "{}"),
        ];
        let result = build_batch(&records, 1.0, &ExtrudedRenderer::default());
        assert!(matches!(result, Err(BatchError::EmptyBatch)));
        assert!(matches!(
            build_batch(&[], 1.0, &ExtrudedRenderer::default()),
            Err(BatchError::EmptyBatch)
        ));
    }

    #[test]
    fn records_overflowing_scene_units_are_skipped() {
        let renderer = ExtrudedRenderer::default();
        let huge = vec![SpatialRecord::new(
            "huge",
            "#fff",
            "[[0,0],[1e300,0],[1e300,1e300],[0,1e300]]",
        )];
        assert!(matches!(
            build_batch(&huge, DEFAULT_SCENE_SCALE, &renderer),
            Err(BatchError::EmptyBatch)
        ));

        let square = vec![SpatialRecord::new("square", "#fff", SQUARE)];
        assert!(matches!(
            build_batch(&square, 1e40, &renderer),
            Err(BatchError::EmptyBatch)
        ));

        let outcome = build_batch(&square, 1.0, &renderer).unwrap();
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn solids_share_one_frame() {
        let records = vec![
            SpatialRecord::new("west", "#fff", "[[0,0],[2,0],[2,2],[0,2]]"),
            SpatialRecord::new("east", "#fff", "[[8,0],[10,0],[10,2],[8,2]]"),
        ];
        let outcome = build_batch(&records, 1.0, &ExtrudedRenderer::default()).unwrap();

        let west = outcome.solids[0].transform.translation;
        let east = outcome.solids[1].transform.translation;
        assert_eq!(west, Vec3::new(-4.0, 0.0, 0.0));
        assert_eq!(east, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn setup_scene_spawns_fit_camera_and_ground() {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .add_systems(Startup, (setup_scene, spawn_ground_plane));

        app.update();

        let world = app.world_mut();
        let cameras = world
            .query_filtered::<&OrbitControl, (With<Camera3d>, With<FitCamera>)>()
            .iter(world)
            .count();
        let grounds = world.query::<&GroundPlane>().iter(world).count();
        let lights = world.query::<&DirectionalLight>().iter(world).count();

        assert_eq!(cameras, 1);
        assert_eq!(grounds, 1);
        assert!(lights >= 1);
    }
}

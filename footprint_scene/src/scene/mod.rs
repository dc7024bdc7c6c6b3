pub(crate) mod bounds;
mod footprints;
pub(crate) mod registry;

pub use bounds::{compute_bounds, scene_bounds, union_world_bounds, BoundingVolume};
pub use footprints::{
    apply_batch, build_batch, footprint_scene_plugin, handle_fit_requests, ingest_batches,
    setup_scene, spawn_ground_plane, BatchError, BatchOutcome, FitSceneRequest, FitSettings,
    GroundPlane, PipelineSettings,
};
pub use registry::{FootprintMesh, ReplaceStats, SceneMesh, SceneMeshRegistry};

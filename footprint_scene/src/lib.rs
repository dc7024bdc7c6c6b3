//! Footprints: building footprints extruded into a 3D scene, framed by a
//! fitted camera.
//!
//! Library root: geometry, data, rendering, scene, camera, SDK builder, and
//! config modules.

pub mod camera;
pub mod config;
pub mod data;
pub mod geometry;
pub mod render;
pub mod scene;

pub mod prelude;
pub mod sdk;

pub use data::{batch_channel, BatchChannel, RecordBatchSender, SpatialRecord};
pub use scene::{build_batch, BatchError, BatchOutcome};

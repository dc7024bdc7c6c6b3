//! Minimal prelude for SDK consumers.

pub use crate::camera::{FitCamera, OrbitControl};
pub use crate::config::SceneConfig;
pub use crate::data::{batch_channel, RecordBatchSender, SpatialRecord};
pub use crate::render::{ExtrudedRenderer, ExtrusionSettings, FootprintRenderer, FootprintSolid};
pub use crate::scene::{FitSceneRequest, FitSettings, PipelineSettings};
pub use crate::sdk::FootprintSceneBuilder;

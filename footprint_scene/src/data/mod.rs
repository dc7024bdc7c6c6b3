mod channel;
pub mod geojson;
mod model;

pub use channel::{batch_channel, init_fixture_channel, BatchChannel, RecordBatchSender};
pub use geojson::{load_records, parse_records, LoadError};
pub use model::{SpatialRecord, DEFAULT_RECORD_COLOR};

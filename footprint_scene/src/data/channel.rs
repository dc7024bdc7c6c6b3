use std::path::Path;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::data::geojson::{load_records, LoadError};
use crate::data::model::SpatialRecord;

const BATCH_CHANNEL_CAPACITY: usize = 8;

/// Bevy resource holding the receiving end of the record batch channel.
/// `ingest_batches` drains it every frame and keeps only the newest batch.
#[derive(bevy::prelude::Resource)]
pub struct BatchChannel(pub Receiver<Vec<SpatialRecord>>);

/// Host-side handle for publishing complete replacement batches.
/// Cheap to clone; safe to move to other threads.
#[derive(Clone)]
pub struct RecordBatchSender(Sender<Vec<SpatialRecord>>);

impl RecordBatchSender {
    /// Queue a batch. Returns `false` if the app side has gone away or the
    /// queue is full.
    pub fn send(&self, batch: Vec<SpatialRecord>) -> bool {
        match self.0.try_send(batch) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                bevy::log::warn!("footprints: batch queue full, dropping batch");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Create a connected sender/receiver pair.
pub fn batch_channel() -> (RecordBatchSender, BatchChannel) {
    let (tx, rx) = crossbeam_channel::bounded(BATCH_CHANNEL_CAPACITY);
    (RecordBatchSender(tx), BatchChannel(rx))
}

/// Create a channel preloaded with the records from a GeoJSON or record-array
/// file. The file is delivered as a single batch.
pub fn init_fixture_channel(path: &Path) -> Result<BatchChannel, LoadError> {
    let records = load_records(path)?;
    bevy::log::info!(
        "footprints: loaded {} records from {}",
        records.len(),
        path.display()
    );
    let (tx, channel) = batch_channel();
    tx.send(records);
    Ok(channel)
}

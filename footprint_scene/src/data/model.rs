// Record snapshot delivered by the host. Payloads stay raw strings here;
// parsing happens per batch in the geometry pipeline.

use serde::{Deserialize, Serialize};

/// One footprint as supplied by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpatialRecord {
    pub id: String,
    /// Hex color, `#rrggbb` or `rrggbb`.
    #[serde(default = "default_color")]
    pub color: String,
    /// Raw coordinate payload, e.g. `[[x,y],[x,y],...]`.
    pub coordinates: String,
    /// Floor count used as a height modifier.
    #[serde(default)]
    pub floors: Option<f64>,
}

pub const DEFAULT_RECORD_COLOR: &str = "#b0b8c4";

fn default_color() -> String {
    DEFAULT_RECORD_COLOR.to_string()
}

impl SpatialRecord {
    pub fn new(
        id: impl Into<String>,
        color: impl Into<String>,
        coordinates: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
            coordinates: coordinates.into(),
            floors: None,
        }
    }

    pub fn with_floors(mut self, floors: f64) -> Self {
        self.floors = Some(floors);
        self
    }
}

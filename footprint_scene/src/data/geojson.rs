//! Record loading from disk: GeoJSON feature collections or plain record arrays.
//!
//! Each feature's `geometry.coordinates` is re-serialized to a JSON string and
//! stored as the record's raw payload, so imported data goes through the same
//! payload parser as anything a host sends.

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::data::model::{SpatialRecord, DEFAULT_RECORD_COLOR};

const MISSING_ID: &str = "N/A";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a GeoJSON FeatureCollection or an array of records")]
    UnsupportedDocument,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    coordinates: Option<Value>,
}

/// Reads records from a file. See [`parse_records`] for accepted documents.
pub fn load_records(path: &Path) -> Result<Vec<SpatialRecord>, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_records(&json)
}

/// Accepts either a GeoJSON `FeatureCollection` or a JSON array of
/// [`SpatialRecord`]s.
pub fn parse_records(json: &str) -> Result<Vec<SpatialRecord>, LoadError> {
    let document: Value = serde_json::from_str(json)?;
    let is_collection =
        matches!(&document, Value::Object(obj) if obj.contains_key("features"));

    if document.is_array() {
        Ok(serde_json::from_value(document)?)
    } else if is_collection {
        let collection: FeatureCollection = serde_json::from_value(document)?;
        Ok(records_from_features(collection.features))
    } else {
        Err(LoadError::UnsupportedDocument)
    }
}

fn records_from_features(features: Vec<Feature>) -> Vec<SpatialRecord> {
    let total = features.len();
    let records: Vec<SpatialRecord> = features
        .into_iter()
        .filter_map(feature_to_record)
        .collect();
    if records.len() < total {
        warn!(
            "geojson: skipped {} of {total} features without coordinates",
            total - records.len()
        );
    }
    records
}

fn feature_to_record(feature: Feature) -> Option<SpatialRecord> {
    let id = match feature.id {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => MISSING_ID.to_string(),
    };

    let geometry = feature.geometry?;
    let coordinates = geometry.coordinates.filter(|c| !c.is_null())?;
    if let Some(kind) = geometry.kind.as_deref() {
        if kind != "Polygon" && kind != "LineString" {
            debug!("geojson: feature {id} has geometry type {kind}, payload may not parse");
        }
    }

    let props = feature.properties.unwrap_or_default();
    let color = props
        .get("color")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_RECORD_COLOR)
        .to_string();
    let floors = props
        .get("floors")
        .or_else(|| props.get("building:levels"))
        .and_then(number_like);

    Some(SpatialRecord {
        id,
        color,
        coordinates: coordinates.to_string(),
        floors,
    })
}

/// OSM-style tags often carry numbers as strings.
fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

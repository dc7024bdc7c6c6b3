//! Coordinate payload parsing: raw string → validated `PlanarRing`.
//!
//! Accepted shapes are a flat ring `[[x,y], ...]` or a polygon
//! `[[[x,y], ...], ...]`, of which only the outer ring is read. The text is
//! parsed as JSON and walked structurally; anything else is rejected.

use bevy::math::DVec2;
use serde_json::Value;
use thiserror::Error;

use super::PlanarRing;

/// Why a payload could not be turned into a ring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("malformed coordinate payload: {0}")]
    Malformed(String),
    #[error("coordinate payload is not an array")]
    NotAnArray,
    #[error("ring has {count} distinct points, need at least 3")]
    TooFewPoints { count: usize },
    #[error("ring does not fit in scene units after normalization")]
    OutOfRange,
}

impl PayloadError {
    /// Short machine-friendly reason used in diagnostics.
    pub fn reason(&self) -> &'static str {
        match self {
            PayloadError::Malformed(_) => "malformed",
            PayloadError::NotAnArray => "not-an-array",
            PayloadError::TooFewPoints { .. } => "too-few-points",
            PayloadError::OutOfRange => "out-of-range",
        }
    }
}

pub fn parse_payload(raw: &str) -> Result<PlanarRing, PayloadError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| PayloadError::Malformed(err.to_string()))?;
    let Value::Array(items) = value else {
        return Err(PayloadError::NotAnArray);
    };

    let ring = outer_ring(&items)?;
    let mut points = ring
        .iter()
        .enumerate()
        .map(|(i, v)| parse_point(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let count = points.len();
    PlanarRing::new(points).ok_or(PayloadError::TooFewPoints { count })
}

/// Picks the ring to read: the payload itself, or its first element when the
/// payload is a polygon (array of rings).
fn outer_ring(items: &[Value]) -> Result<&[Value], PayloadError> {
    let is_polygon = matches!(
        items.first(),
        Some(Value::Array(first)) if matches!(first.first(), Some(Value::Array(_)))
    );
    if !is_polygon {
        return Ok(items);
    }
    match &items[0] {
        Value::Array(ring) => Ok(ring),
        _ => Err(PayloadError::Malformed("outer ring is not an array".into())),
    }
}

fn parse_point(index: usize, value: &Value) -> Result<DVec2, PayloadError> {
    let Value::Array(components) = value else {
        return Err(PayloadError::Malformed(format!(
            "point {index} is not an array"
        )));
    };
    if components.len() < 2 {
        return Err(PayloadError::Malformed(format!(
            "point {index} has {} component(s), need 2",
            components.len()
        )));
    }
    let component = |c: &Value| {
        c.as_f64().ok_or_else(|| {
            PayloadError::Malformed(format!("point {index} has a non-numeric component"))
        })
    };
    Ok(DVec2::new(component(&components[0])?, component(&components[1])?))
}

//! Batch-wide planar extent: the shared origin for every footprint in a batch.

use bevy::math::DVec2;

use super::PlanarRing;

/// Min/max of every parsed point in the current batch, in input units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalExtent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl GlobalExtent {
    /// Folds every point of every ring into one extent.
    /// Returns `None` when no ring was supplied.
    pub fn accumulate<'a>(rings: impl IntoIterator<Item = &'a PlanarRing>) -> Option<Self> {
        rings
            .into_iter()
            .flat_map(|ring| ring.points().iter().copied())
            .fold(None, |acc: Option<Self>, p| {
                Some(match acc {
                    None => Self {
                        min_x: p.x,
                        max_x: p.x,
                        min_y: p.y,
                        max_y: p.y,
                    },
                    Some(e) => Self {
                        min_x: e.min_x.min(p.x),
                        max_x: e.max_x.max(p.x),
                        min_y: e.min_y.min(p.y),
                        max_y: e.max_y.max(p.y),
                    },
                })
            })
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: DVec2) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }
}

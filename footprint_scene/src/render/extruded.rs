use std::f32::consts::FRAC_PI_2;

use bevy::color::Srgba;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;

use crate::data::SpatialRecord;
use crate::render::{FootprintRenderer, FootprintSolid};

const FALLBACK_COLOR: Color = Color::srgb(0.69, 0.72, 0.77);
/// Rings with less area than this (scene units²) produce no triangles.
const MIN_RING_AREA: f32 = 1e-9;
/// Squared cross-product length below which a triangle is dropped.
const MIN_TRIANGLE_CROSS_SQ: f32 = 1e-12;
/// Caps miter length at this multiple of the inset on sharp corners.
const MAX_MITER: f32 = 4.0;

#[derive(Clone, Debug)]
pub struct BevelSettings {
    /// Horizontal inset of the top cap.
    pub size: f32,
    /// Vertical extent of the rounded edge.
    pub thickness: f32,
    pub segments: u32,
}

#[derive(Clone, Debug)]
pub struct ExtrusionSettings {
    /// Depth used when a record has no usable floor count.
    pub base_depth: f32,
    pub floor_height: f32,
    pub bevel: Option<BevelSettings>,
}

impl Default for ExtrusionSettings {
    fn default() -> Self {
        Self {
            base_depth: 0.3,
            floor_height: 0.3,
            bevel: Some(BevelSettings {
                size: 0.02,
                thickness: 0.02,
                segments: 2,
            }),
        }
    }
}

/// Extrudes each footprint straight up, with an optional rounded top edge,
/// and paints it with the record's flat color.
#[derive(Default)]
pub struct ExtrudedRenderer {
    pub settings: ExtrusionSettings,
}

impl FootprintRenderer for ExtrudedRenderer {
    fn build_solid(&self, footprint: &[Vec2], record: &SpatialRecord) -> FootprintSolid {
        let anchor = centroid(footprint);
        let local: Vec<Vec2> = footprint.iter().map(|p| *p - anchor).collect();
        let depth = footprint_depth(&self.settings, record.floors);

        FootprintSolid {
            record_id: record.id.clone(),
            mesh: extrude_footprint(&local, depth, self.settings.bevel.as_ref()),
            material: footprint_material(&record.color),
            transform: Transform::from_xyz(anchor.x, 0.0, -anchor.y),
        }
    }
}

/// Floor count times floor height; falls back to the base depth when the
/// count is missing, non-positive, or too large to represent.
pub fn footprint_depth(settings: &ExtrusionSettings, floors: Option<f64>) -> f32 {
    floors
        .filter(|f| f.is_finite() && *f > 0.0)
        .map(|f| f as f32 * settings.floor_height)
        .filter(|depth| depth.is_finite() && *depth > 0.0)
        .unwrap_or(settings.base_depth)
}

/// Unlit material in the record's hex color.
pub fn footprint_material(hex: &str) -> StandardMaterial {
    let base_color = match Srgba::hex(hex.trim()) {
        Ok(srgba) => Color::Srgba(srgba),
        Err(err) => {
            warn!("footprints: invalid color {hex:?} ({err}), using fallback");
            FALLBACK_COLOR
        }
    };
    StandardMaterial {
        base_color,
        unlit: true,
        ..default()
    }
}

/// Builds a closed solid from a planar ring. The ring lies in the XZ plane
/// (planar `y` maps to world `-Z`) and is extruded along `+Y` to `depth`.
///
/// Degenerate rings (colinear or repeated points, or non-finite coordinates)
/// yield a mesh with no triangles rather than an error.
pub fn extrude_footprint(ring: &[Vec2], depth: f32, bevel: Option<&BevelSettings>) -> Mesh {
    let mut soup = TriangleSoup::default();

    let area = signed_area(ring);
    if ring.len() < 3
        || !area.is_finite()
        || area.abs() <= MIN_RING_AREA
        || !depth.is_finite()
        || depth <= 0.0
    {
        return soup.into_mesh();
    }

    let base: Vec<Vec2> = if area < 0.0 {
        ring.iter().rev().copied().collect()
    } else {
        ring.to_vec()
    };
    let caps = triangulate(&base);
    let levels = bevel_profile(depth, bevel);
    let rings: Vec<Vec<Vec2>> = levels
        .iter()
        .map(|&(inset, _)| inset_ring(&base, inset))
        .collect();

    for &[a, b, c] in &caps {
        soup.push(lift(base[a], 0.0), lift(base[c], 0.0), lift(base[b], 0.0));
    }

    let n = base.len();
    for k in 1..levels.len() {
        let (lower, low_y) = (&rings[k - 1], levels[k - 1].1);
        let (upper, up_y) = (&rings[k], levels[k].1);
        for i in 0..n {
            let j = (i + 1) % n;
            soup.push(lift(lower[i], low_y), lift(lower[j], low_y), lift(upper[j], up_y));
            soup.push(lift(lower[i], low_y), lift(upper[j], up_y), lift(upper[i], up_y));
        }
    }

    if let (Some(top), Some(&(_, top_y))) = (rings.last(), levels.last()) {
        for &[a, b, c] in &caps {
            soup.push(lift(top[a], top_y), lift(top[b], top_y), lift(top[c], top_y));
        }
    }

    soup.into_mesh()
}

fn lift(p: Vec2, y: f32) -> Vec3 {
    Vec3::new(p.x, y, -p.y)
}

fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// Shoelace area, positive for counter-clockwise rings.
fn signed_area(ring: &[Vec2]) -> f32 {
    let n = ring.len();
    (0..n)
        .map(|i| ring[i].perp_dot(ring[(i + 1) % n]))
        .sum::<f32>()
        / 2.0
}

/// Cap triangles for a counter-clockwise ring, each wound counter-clockwise.
fn triangulate(ring: &[Vec2]) -> Vec<[usize; 3]> {
    let flat: Vec<f64> = ring
        .iter()
        .flat_map(|p| [p.x as f64, p.y as f64])
        .collect();
    let indices = match earcutr::earcut(&flat, &[], 2) {
        Ok(indices) => indices,
        Err(err) => {
            warn!("footprints: cap triangulation failed: {err:?}");
            return Vec::new();
        }
    };

    indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (t[0], t[1], t[2]);
            if (ring[b] - ring[a]).perp_dot(ring[c] - ring[a]) < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect()
}

/// `(inset, height)` per ring level, bottom to top. Without a bevel this is
/// just the floor and the roof; with one, the wall stops short of the roof
/// and a quarter-circle of insets closes the gap.
fn bevel_profile(depth: f32, bevel: Option<&BevelSettings>) -> Vec<(f32, f32)> {
    let Some(bevel) = bevel.filter(|b| b.size > 0.0 && b.thickness > 0.0) else {
        return vec![(0.0, 0.0), (0.0, depth)];
    };

    let thickness = bevel.thickness.min(depth / 2.0);
    let size = bevel.size.min(depth / 2.0);
    let segments = bevel.segments.max(1);
    let shoulder = depth - thickness;

    let mut levels = vec![(0.0, 0.0), (0.0, shoulder)];
    for k in 1..=segments {
        let theta = k as f32 / segments as f32 * FRAC_PI_2;
        levels.push((size * (1.0 - theta.cos()), shoulder + thickness * theta.sin()));
    }
    levels
}

/// Moves every vertex of a counter-clockwise ring inward by `inset` along its
/// corner miter.
fn inset_ring(ring: &[Vec2], inset: f32) -> Vec<Vec2> {
    if inset == 0.0 {
        return ring.to_vec();
    }
    let n = ring.len();
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let cur = ring[i];
            let next = ring[(i + 1) % n];
            let n1 = (cur - prev).normalize_or_zero().perp();
            let n2 = (next - cur).normalize_or_zero().perp();
            let miter = (n1 + n2).normalize_or_zero();
            if miter == Vec2::ZERO {
                return cur;
            }
            let edge_normal = if n1 != Vec2::ZERO { n1 } else { n2 };
            let cos = miter.dot(edge_normal).max(1.0 / MAX_MITER);
            cur + miter * (inset / cos)
        })
        .collect()
}

/// Non-indexed triangle list with one flat normal per face.
#[derive(Default)]
struct TriangleSoup {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
}

impl TriangleSoup {
    fn push(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let cross = (b - a).cross(c - a);
        if cross.length_squared() <= MIN_TRIANGLE_CROSS_SQ {
            return;
        }
        let normal = cross.normalize().to_array();
        self.positions
            .extend([a.to_array(), b.to_array(), c.to_array()]);
        self.normals.extend([normal; 3]);
    }

    fn into_mesh(self) -> Mesh {
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals)
    }
}

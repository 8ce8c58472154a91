// Steerable target geometry.
//
// External loaders (SVG, fonts, meshes) hand the engine plain point outlines;
// everything here normalizes them into closed, evenly resampled polylines that
// the follow behaviors can index and project against. All transforms are bulk
// setup-time operations — nothing in this module runs on the per-frame path.

use std::sync::Arc;

use glam::{Quat, Vec3};

/// Default steering tolerance around a path, in world units.
pub const DEFAULT_RADIUS: f32 = 5.0;
/// Default arc-length distance between resampled vertices.
pub const DEFAULT_SPACING: f32 = 5.0;

// ============================================================================
// BOUNDS
// ============================================================================

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Degenerate zero box, used for empty geometry.
    pub const ZERO: Bounds = Bounds {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    pub fn of_points(points: &[Vec3]) -> Bounds {
        let Some((&first, rest)) = points.split_first() else {
            return Bounds::ZERO;
        };
        rest.iter().fold(
            Bounds { min: first, max: first },
            |mut bounds, &p| {
                bounds.min = bounds.min.min(p);
                bounds.max = bounds.max.max(p);
                bounds
            },
        )
    }

    pub fn grow_to_include(&mut self, other: Bounds) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

// ============================================================================
// FOLLOW PATH
// ============================================================================

/// A closed polyline target. The first and last vertices are adjacent; every
/// consumer indexes modulo `vertices().len()`.
///
/// Invariant: at least 2 vertices. Construction rejects anything smaller so
/// the steering math never normalizes a zero-length edge.
#[derive(Clone, Debug)]
pub struct FollowPath {
    vertices: Vec<Vec3>,
    /// "Close enough" tolerance used by waypoint advancement and arrival
    /// queries.
    pub radius: f32,
}

impl FollowPath {
    /// Resample `outline` (treated as a closed loop) at ~`spacing` arc-length
    /// intervals. Returns `None` for degenerate input: fewer than 2 points,
    /// non-positive spacing, or a near-zero perimeter.
    pub fn from_outline(outline: &[Vec3], spacing: f32) -> Option<Self> {
        let vertices = resample_closed(outline, spacing);
        Self::from_vertices(vertices)
    }

    /// Adopt vertices that are already spaced (e.g. a procedural spiral).
    /// Returns `None` with fewer than 2 vertices.
    pub fn from_vertices(vertices: Vec<Vec3>) -> Option<Self> {
        if vertices.len() < 2 {
            return None;
        }
        Some(Self {
            vertices,
            radius: DEFAULT_RADIUS,
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Total arc length, closing edge included.
    pub fn perimeter(&self) -> f32 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| self.vertices[i].distance(self.vertices[(i + 1) % n]))
            .sum()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::of_points(&self.vertices)
    }

    /// Re-resample in place. Keeps the current vertices if the requested
    /// spacing would degenerate the path.
    pub fn resample_by_spacing(&mut self, spacing: f32) {
        let resampled = resample_closed(&self.vertices, spacing);
        if resampled.len() >= 2 {
            self.vertices = resampled;
        } else {
            log::warn!(
                "resample spacing {spacing} would degenerate a path of perimeter {}; keeping {} vertices",
                self.perimeter(),
                self.vertices.len()
            );
        }
    }
}

/// Walk the closed loop and emit evenly spaced samples along its arc length.
/// The step is `perimeter / round(perimeter / spacing)` so the closing gap
/// matches the rest instead of leaving a short remainder edge.
fn resample_closed(points: &[Vec3], spacing: f32) -> Vec<Vec3> {
    if points.len() < 2 || spacing <= 0.0 {
        return Vec::new();
    }

    let n = points.len();
    let perimeter: f32 = (0..n)
        .map(|i| points[i].distance(points[(i + 1) % n]))
        .sum();
    if perimeter <= f32::EPSILON {
        return Vec::new();
    }

    let count = ((perimeter / spacing).round() as usize).max(2);
    let step = perimeter / count as f32;

    let mut out = Vec::with_capacity(count);
    let mut next = 0.0f32;
    let mut traveled = 0.0f32;

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let len = a.distance(b);
        if len <= f32::EPSILON {
            continue;
        }
        while next < traveled + len && out.len() < count {
            let t = (next - traveled) / len;
            out.push(a.lerp(b, t));
            next += step;
        }
        traveled += len;
    }

    out
}

// ============================================================================
// PATH COLLECTION
// ============================================================================

/// One theme of steering targets: an ordered set of paths built from the same
/// source (a logo, a word, a mesh wireframe).
///
/// Paths are shared (`Arc`) with every agent currently assigned to them, so
/// the bulk transforms below go through `Arc::make_mut` — a transform after
/// agents were assigned rewrites a private copy and leaves the agents on the
/// geometry they were given, which matches the live-reload rule: only an
/// explicit reassignment moves agents onto new geometry.
#[derive(Clone, Debug, Default)]
pub struct PathCollection {
    paths: Vec<Arc<FollowPath>>,
}

impl PathCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_path(&mut self, path: FollowPath) {
        self.paths.push(Arc::new(path));
    }

    /// Ingest raw outlines from an external loader. Each outline becomes one
    /// path; degenerate outlines are skipped, not errors — a glyph can
    /// legitimately contain a dot smaller than the resample spacing.
    pub fn add_outlines(&mut self, outlines: &[Vec<Vec3>], spacing: f32) {
        for outline in outlines {
            match FollowPath::from_outline(outline, spacing) {
                Some(path) => self.add_path(path),
                None => log::warn!(
                    "skipping degenerate outline ({} points) at spacing {spacing}",
                    outline.len()
                ),
            }
        }
    }

    /// `add_outlines` at [`DEFAULT_SPACING`], for callers with no opinion on
    /// vertex density.
    pub fn add_outlines_default(&mut self, outlines: &[Vec<Vec3>]) {
        self.add_outlines(outlines, DEFAULT_SPACING);
    }

    pub fn paths(&self) -> &[Arc<FollowPath>] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Union of all contained paths' bounds; zero box when empty.
    pub fn bounding_box(&self) -> Bounds {
        let mut iter = self.paths.iter();
        let Some(first) = iter.next() else {
            return Bounds::ZERO;
        };
        let mut bounds = first.bounds();
        for path in iter {
            bounds.grow_to_include(path.bounds());
        }
        bounds
    }

    pub fn total_length(&self) -> f32 {
        self.paths.iter().map(|p| p.perimeter()).sum()
    }

    pub fn total_vertices(&self) -> usize {
        self.paths.iter().map(|p| p.vertices.len()).sum()
    }

    pub fn resample_by_spacing(&mut self, spacing: f32) {
        for path in &mut self.paths {
            Arc::make_mut(path).resample_by_spacing(spacing);
        }
    }

    /// Translate every vertex so the collection's bounding-box center lands
    /// on `offset`.
    pub fn center_points(&mut self, offset: Vec3) {
        let shift = offset - self.bounding_box().center();
        for path in &mut self.paths {
            for vert in &mut Arc::make_mut(path).vertices {
                *vert += shift;
            }
        }
    }

    /// Rotate every vertex about the Y axis through the collection's local
    /// origin. Repeated calls accumulate.
    pub fn rotate_y(&mut self, degrees: f32) {
        let rotation = Quat::from_rotation_y(degrees.to_radians());
        for path in &mut self.paths {
            for vert in &mut Arc::make_mut(path).vertices {
                *vert = rotation * *vert;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn unit_square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    fn spacings(path: &FollowPath) -> Vec<f32> {
        let verts = path.vertices();
        let n = verts.len();
        (0..n)
            .map(|i| verts[i].distance(verts[(i + 1) % n]))
            .collect()
    }

    #[test]
    fn resample_produces_even_spacing() {
        let path = FollowPath::from_outline(&unit_square(), 0.1).unwrap();
        assert!(path.vertices().len() > 1);
        for gap in spacings(&path) {
            assert!((gap - 0.1).abs() < 0.02, "gap {gap} too far from 0.1");
        }
    }

    #[test]
    fn resample_is_idempotent_up_to_jitter() {
        let once = FollowPath::from_outline(&unit_square(), 0.1).unwrap();
        let mut twice = once.clone();
        twice.resample_by_spacing(0.1);
        assert!((once.perimeter() - twice.perimeter()).abs() < 0.05);
        assert!(
            (once.vertices().len() as i64 - twice.vertices().len() as i64).abs() <= 1
        );
    }

    #[test]
    fn degenerate_outlines_are_rejected() {
        assert!(FollowPath::from_outline(&[], 1.0).is_none());
        assert!(FollowPath::from_outline(&[Vec3::ZERO], 1.0).is_none());
        // Two coincident points: zero perimeter.
        assert!(FollowPath::from_outline(&[Vec3::ONE, Vec3::ONE], 1.0).is_none());
        // Spacing larger than the whole perimeter still yields >= 2 vertices.
        let coarse = FollowPath::from_outline(&unit_square(), 100.0).unwrap();
        assert_eq!(coarse.vertices().len(), 2);
    }

    #[test]
    fn default_ingestion_resamples_at_default_spacing() {
        let big_square: Vec<Vec3> = unit_square().iter().map(|v| *v * 50.0).collect();
        let mut collection = PathCollection::new();
        collection.add_outlines_default(&[big_square]);
        assert_eq!(collection.len(), 1);
        for gap in spacings(&collection.paths()[0]) {
            assert!(
                (gap - DEFAULT_SPACING).abs() < 0.5,
                "gap {gap} too far from {DEFAULT_SPACING}"
            );
        }
    }

    #[test]
    fn empty_collection_has_zero_box() {
        let collection = PathCollection::new();
        assert_eq!(collection.bounding_box(), Bounds::ZERO);
        assert_eq!(collection.total_vertices(), 0);
    }

    #[test]
    fn center_points_moves_bounding_center() {
        let mut collection = PathCollection::new();
        collection.add_outlines(&[unit_square()], 0.25);
        let target = Vec3::new(5.0, -3.0, 2.0);
        collection.center_points(target);
        let center = collection.bounding_box().center();
        assert!(center.distance(target) < EPS, "center ended at {center}");
    }

    #[test]
    fn rotate_y_quarter_turn_maps_x_to_negative_z() {
        let mut collection = PathCollection::new();
        collection.add_path(
            FollowPath::from_vertices(vec![Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO])
                .unwrap(),
        );
        collection.rotate_y(90.0);
        let v = collection.paths()[0].vertices()[0];
        assert!(v.distance(Vec3::new(0.0, 0.0, -1.0)) < EPS, "rotated to {v}");
    }

    #[test]
    fn aggregates_reflect_contents() {
        let mut collection = PathCollection::new();
        collection.add_outlines(&[unit_square(), unit_square()], 0.5);
        assert_eq!(collection.len(), 2);
        assert!((collection.total_length() - 8.0).abs() < 0.2);
        assert_eq!(
            collection.total_vertices(),
            collection.paths().iter().map(|p| p.vertices().len()).sum::<usize>()
        );
    }
}

//! Shape geometry
//!
//! Shapes are a tagged union over the three supported kinds. Each variant
//! fixes its own point cardinality: a rect is two opposite corners, a circle
//! is a center plus a point on its edge, and a polygon has three or more
//! vertices. Rotation and scale are stored alongside the points and applied
//! around the centroid at render/hit-test time; they are never baked into the
//! stored points.

use crate::visual::{default_options, Visual};
use crate::{CoreError, Result};
use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canvas-space point
pub type Point = Vec2;

/// Unique identifier for a Shape
pub type ShapeId = u64;

/// Sparse parameter map for a shape's visual
pub type VisualOptions = BTreeMap<String, f32>;

/// Discriminant of [`ShapeGeometry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// N-gon with N >= 3
    Polygon,
    /// Axis-aligned rectangle from two opposite corners
    Rect,
    /// Circle from center and edge point
    Circle,
}

impl ShapeKind {
    /// Title-cased label used for default layer names
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Polygon => "Polygon",
            ShapeKind::Rect => "Rect",
            ShapeKind::Circle => "Circle",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Geometry of a shape, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "points", rename_all = "lowercase")]
pub enum ShapeGeometry {
    /// Ordered vertices; order defines the edges
    Polygon(Vec<Point>),
    /// Two opposite corners
    Rect([Point; 2]),
    /// Center, then a point on the edge
    Circle([Point; 2]),
}

impl ShapeGeometry {
    /// Build a polygon, rejecting fewer than three vertices
    pub fn polygon(points: Vec<Point>) -> Result<Self> {
        if points.len() < 3 {
            return Err(CoreError::InvalidGeometry(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        Ok(Self::Polygon(points))
    }

    /// Build a rect from two opposite corners
    pub fn rect(a: Point, b: Point) -> Self {
        Self::Rect([a, b])
    }

    /// Build a circle from its center and a point on its edge
    pub fn circle(center: Point, edge: Point) -> Self {
        Self::Circle([center, edge])
    }

    /// Default geometry for newly created shapes of `kind`
    pub fn default_for(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rect => Self::rect(Vec2::new(200.0, 200.0), Vec2::new(400.0, 350.0)),
            ShapeKind::Circle => Self::circle(Vec2::new(300.0, 300.0), Vec2::new(400.0, 300.0)),
            ShapeKind::Polygon => Self::Polygon(vec![
                Vec2::new(200.0, 200.0),
                Vec2::new(400.0, 200.0),
                Vec2::new(300.0, 350.0),
            ]),
        }
    }

    /// Kind of this geometry
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Polygon(_) => ShapeKind::Polygon,
            Self::Rect(_) => ShapeKind::Rect,
            Self::Circle(_) => ShapeKind::Circle,
        }
    }

    /// Stored points in order
    pub fn points(&self) -> &[Point] {
        match self {
            Self::Polygon(points) => points.as_slice(),
            Self::Rect(points) | Self::Circle(points) => &points[..],
        }
    }

    /// Mutable access to the stored points (cardinality cannot change)
    pub fn points_mut(&mut self) -> &mut [Point] {
        match self {
            Self::Polygon(points) => points.as_mut_slice(),
            Self::Rect(points) | Self::Circle(points) => &mut points[..],
        }
    }

    /// Centroid: rect midpoint, circle center, polygon vertex mean
    pub fn centroid(&self) -> Point {
        match self {
            Self::Rect([a, b]) => (*a + *b) * 0.5,
            Self::Circle([center, _]) => *center,
            Self::Polygon(points) => {
                if points.is_empty() {
                    return Vec2::ZERO;
                }
                points.iter().copied().sum::<Vec2>() / points.len() as f32
            }
        }
    }

    /// Editing handles in local (untransformed) space
    pub fn handles(&self) -> Vec<Handle> {
        match self {
            Self::Rect([a, b]) => RECT_CORNERS
                .iter()
                .enumerate()
                .map(|(index, &(x_from, y_from))| {
                    let xs = [a.x, b.x];
                    let ys = [a.y, b.y];
                    Handle {
                        index,
                        position: Vec2::new(xs[x_from], ys[y_from]),
                    }
                })
                .collect(),
            _ => self
                .points()
                .iter()
                .enumerate()
                .map(|(index, &position)| Handle { index, position })
                .collect(),
        }
    }

    /// Move one handle to `to`, touching only the point(s) behind it.
    ///
    /// Rect corners alias the two stored corners per axis, so dragging a
    /// mixed corner writes one axis of each stored point. No normalization
    /// happens: dragging past the opposite corner inverts the rect.
    pub fn move_handle(&mut self, index: usize, to: Point) {
        match self {
            Self::Rect(points) => {
                if let Some(&(x_from, y_from)) = RECT_CORNERS.get(index) {
                    points[x_from].x = to.x;
                    points[y_from].y = to.y;
                }
            }
            Self::Circle(points) => {
                if let Some(p) = points.get_mut(index) {
                    *p = to;
                }
            }
            Self::Polygon(points) => {
                if let Some(p) = points.get_mut(index) {
                    *p = to;
                }
            }
        }
    }

    /// Translate every point by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        for p in self.points_mut() {
            *p += delta;
        }
    }

    /// Circle radius (distance from center to edge point)
    pub fn radius(&self) -> Option<f32> {
        match self {
            Self::Circle([center, edge]) => Some(center.distance(*edge)),
            _ => None,
        }
    }

    /// Clip outline in local space
    pub fn outline(&self) -> Outline {
        match self {
            Self::Polygon(points) => Outline::Polygon(points.clone()),
            Self::Rect([a, b]) => Outline::Polygon(vec![
                Vec2::new(a.x, a.y),
                Vec2::new(b.x, a.y),
                Vec2::new(b.x, b.y),
                Vec2::new(a.x, b.y),
            ]),
            Self::Circle([center, edge]) => Outline::Circle {
                center: *center,
                radius: center.distance(*edge),
            },
        }
    }

    /// Local-space bounding box
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Circle([center, edge]) => {
                let r = center.distance(*edge);
                Bounds::new(*center - Vec2::splat(r), *center + Vec2::splat(r))
            }
            _ => Bounds::from_points(self.points()),
        }
    }

    /// Local-space containment test
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Rect([a, b]) => Bounds::from_points(&[*a, *b]).contains(p),
            Self::Circle([center, edge]) => center.distance(p) <= center.distance(*edge),
            Self::Polygon(points) => polygon_contains(points, p),
        }
    }
}

/// Corner handle order for rects: (x source point, y source point)
const RECT_CORNERS: [(usize, usize); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

/// An editing handle: logical index plus its local-space position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Logical handle index (rect: corner 0..4, otherwise point index)
    pub index: usize,
    /// Local-space position
    pub position: Point,
}

/// Clip region derived from a shape's geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outline {
    /// Closed polygon (also used for rects)
    Polygon(Vec<Point>),
    /// Circle
    Circle {
        /// Center point
        center: Point,
        /// Radius in canvas units
        radius: f32,
    },
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Bounds {
    /// Create from corners, normalizing their order
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing all `points`
    pub fn from_points(points: &[Point]) -> Self {
        let mut iter = points.iter().copied();
        let first = iter.next().unwrap_or(Vec2::ZERO);
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Self { min, max }
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive containment
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Rect a source of `source_size` occupies when scaled to cover these
    /// bounds, centered and cropped. Falls back to the bounds themselves
    /// when either size is degenerate.
    pub fn cover(&self, source_size: Vec2) -> Bounds {
        let target = self.size();
        if source_size.x.abs() < f32::EPSILON
            || source_size.y.abs() < f32::EPSILON
            || target.x.abs() < f32::EPSILON
            || target.y.abs() < f32::EPSILON
        {
            return *self;
        }
        let scale = (target.x / source_size.x).max(target.y / source_size.y);
        let half = source_size * scale * 0.5;
        let c = self.center();
        Bounds {
            min: c - half,
            max: c + half,
        }
    }
}

/// Even-odd ray cast
fn polygon_contains(points: &[Point], p: Point) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A shape: geometry plus the visual that fills it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Unique identifier
    pub id: ShapeId,
    /// Tagged geometry
    pub geometry: ShapeGeometry,
    /// Fill source
    pub visual: Visual,
    /// Sparse per-visual parameters
    #[serde(default)]
    pub visual_options: VisualOptions,
    /// Rotation in degrees around the centroid
    #[serde(default)]
    pub rotation: f32,
    /// Uniform scale around the centroid
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl Shape {
    /// Create a shape with the visual's full default options
    pub fn new(id: ShapeId, geometry: ShapeGeometry, visual: Visual) -> Self {
        Self {
            id,
            geometry,
            visual_options: default_options(&visual),
            visual,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// Shape kind
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    /// Stored points
    pub fn points(&self) -> &[Point] {
        self.geometry.points()
    }

    /// Centroid (computed, never stored)
    pub fn centroid(&self) -> Point {
        self.geometry.centroid()
    }

    /// Local-to-canvas transform: rotate then scale, anchored at the centroid
    pub fn transform(&self) -> Affine2 {
        let c = self.centroid();
        Affine2::from_translation(c)
            * Affine2::from_scale(Vec2::splat(self.scale))
            * Affine2::from_angle(self.rotation.to_radians())
            * Affine2::from_translation(-c)
    }

    /// Map a canvas point into this shape's local space.
    ///
    /// A zero scale makes the transform singular; the point is returned
    /// unchanged in that case.
    pub fn to_local(&self, p: Point) -> Point {
        let t = self.transform();
        if t.matrix2.determinant().abs() < f32::EPSILON {
            return p;
        }
        t.inverse().transform_point2(p)
    }

    /// Hit test in canvas space against the transformed outline
    pub fn hit_test(&self, p: Point) -> bool {
        self.geometry.contains(self.to_local(p))
    }

    /// Handles in canvas space
    pub fn world_handles(&self) -> Vec<Handle> {
        let t = self.transform();
        self.geometry
            .handles()
            .into_iter()
            .map(|h| Handle {
                index: h.index,
                position: t.transform_point2(h.position),
            })
            .collect()
    }

    /// Switch visual, replacing the options with the new visual's defaults
    pub fn set_visual(&mut self, visual: Visual) {
        self.visual_options = default_options(&visual);
        self.visual = visual;
    }

    /// Apply a partial update
    pub fn apply(&mut self, patch: &ShapePatch) {
        if let Some(geometry) = &patch.geometry {
            self.geometry = geometry.clone();
        }
        if let Some(visual) = &patch.visual {
            if *visual != self.visual {
                self.set_visual(visual.clone());
            }
        }
        if let Some(options) = &patch.visual_options {
            for (key, value) in options {
                self.visual_options.insert(key.clone(), *value);
            }
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
    }
}

/// Partial update for a [`Shape`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    /// Replacement geometry
    pub geometry: Option<ShapeGeometry>,
    /// New visual; resets options when it differs from the current one
    pub visual: Option<Visual>,
    /// Option values merged over the (possibly reset) options
    pub visual_options: Option<VisualOptions>,
    /// Rotation in degrees
    pub rotation: Option<f32>,
    /// Uniform scale
    pub scale: Option<f32>,
}

impl ShapePatch {
    /// Patch that replaces geometry
    pub fn geometry(geometry: ShapeGeometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Default::default()
        }
    }

    /// Patch that sets one visual option
    pub fn option(key: impl Into<String>, value: f32) -> Self {
        let mut options = VisualOptions::new();
        options.insert(key.into(), value);
        Self {
            visual_options: Some(options),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::VisualId;

    fn square() -> ShapeGeometry {
        ShapeGeometry::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, 100.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_polygon_requires_three_points() {
        assert!(ShapeGeometry::polygon(vec![Vec2::ZERO, Vec2::ONE]).is_err());
        assert!(ShapeGeometry::polygon(vec![Vec2::ZERO, Vec2::ONE, Vec2::X]).is_ok());
    }

    #[test]
    fn test_centroids() {
        assert_eq!(square().centroid(), Vec2::new(50.0, 50.0));
        let rect = ShapeGeometry::rect(Vec2::new(200.0, 200.0), Vec2::new(400.0, 350.0));
        assert_eq!(rect.centroid(), Vec2::new(300.0, 275.0));
        let circle = ShapeGeometry::circle(Vec2::new(10.0, 20.0), Vec2::new(30.0, 20.0));
        assert_eq!(circle.centroid(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_handle_counts() {
        assert_eq!(square().handles().len(), 4);
        assert_eq!(ShapeGeometry::default_for(ShapeKind::Rect).handles().len(), 4);
        assert_eq!(ShapeGeometry::default_for(ShapeKind::Circle).handles().len(), 2);
        assert_eq!(ShapeGeometry::default_for(ShapeKind::Polygon).handles().len(), 3);
    }

    #[test]
    fn test_rect_mixed_corner_moves_one_axis_of_each_point() {
        let mut rect = ShapeGeometry::rect(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        // Top-right corner: x from point 1, y from point 0
        rect.move_handle(1, Vec2::new(20.0, -5.0));
        assert_eq!(rect.points(), &[Vec2::new(0.0, -5.0), Vec2::new(20.0, 10.0)]);
    }

    #[test]
    fn test_rect_can_invert() {
        let mut rect = ShapeGeometry::rect(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        rect.move_handle(2, Vec2::new(-10.0, -10.0));
        assert_eq!(rect.points()[1], Vec2::new(-10.0, -10.0));
        // Bounds still normalize for containment
        assert!(rect.contains(Vec2::new(-5.0, -5.0)));
    }

    #[test]
    fn test_polygon_contains() {
        let g = square();
        assert!(g.contains(Vec2::new(50.0, 50.0)));
        assert!(!g.contains(Vec2::new(150.0, 50.0)));
    }

    #[test]
    fn test_transform_keeps_centroid_fixed() {
        let mut shape = Shape::new(1, square(), Visual::generative(VisualId::Grid));
        shape.rotation = 45.0;
        shape.scale = 2.0;
        let c = shape.centroid();
        let moved = shape.transform().transform_point2(c);
        assert!((moved - c).length() < 1e-4);
    }

    #[test]
    fn test_hit_test_respects_scale() {
        let mut shape = Shape::new(1, square(), Visual::generative(VisualId::Grid));
        assert!(!shape.hit_test(Vec2::new(140.0, 50.0)));
        shape.scale = 2.0;
        assert!(shape.hit_test(Vec2::new(140.0, 50.0)));
    }

    #[test]
    fn test_cover_fills_bounds() {
        let bounds = Bounds::new(Vec2::ZERO, Vec2::new(200.0, 100.0));
        let cover = bounds.cover(Vec2::new(100.0, 100.0));
        assert_eq!(cover.size(), Vec2::new(200.0, 200.0));
        assert_eq!(cover.center(), bounds.center());
    }

    #[test]
    fn test_set_visual_resets_options() {
        let mut shape = Shape::new(1, square(), Visual::generative(VisualId::Dunes));
        shape.apply(&ShapePatch::option("frequencyX", 0.05));
        shape.set_visual(Visual::generative(VisualId::Clouds));
        assert!(!shape.visual_options.contains_key("frequencyX"));
        assert!(shape.visual_options.contains_key("octaves"));
    }
}

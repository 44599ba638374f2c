//! Triangle shape: a regular 3-gon sized by its circumradius.

use super::{
    ElementId, ElementResult, ElementStyle, ElementTrait, ensure_non_negative, ensure_point,
    point_to_polyline_dist,
};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use uuid::Uuid;

/// An equilateral triangle, apex pointing down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ElementId,
    /// Center point (where the drag started).
    pub center: Point,
    /// Distance from the center to each vertex.
    pub radius: f64,
    /// Style properties.
    pub style: ElementStyle,
}

impl Triangle {
    /// Create a new triangle.
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius,
            style: ElementStyle::default(),
        }
    }

    /// Set the circumradius to the distance between the center and `point`.
    pub fn reach_to(&mut self, point: Point) {
        self.radius = (point - self.center).hypot();
    }

    /// The three vertices, starting with the bottom apex.
    pub fn vertices(&self) -> [Point; 3] {
        let vertex = |i: usize| {
            let angle = i as f64 * TAU / 3.0;
            Point::new(
                self.center.x - self.radius * angle.sin(),
                self.center.y + self.radius * angle.cos(),
            )
        };
        [vertex(0), vertex(1), vertex(2)]
    }
}

impl ElementTrait for Triangle {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let [a, b, c] = self.vertices();
        Rect::from_points(a, b).union_pt(c)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let [a, b, c] = self.vertices();
        point_to_polyline_dist(point, &[a, b, c, a]) <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let [a, b, c] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path.line_to(c);
        path.close_path();
        path
    }

    fn style(&self) -> &ElementStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ElementStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn validate(&self) -> ElementResult<()> {
        ensure_point("triangle center", self.center)?;
        ensure_non_negative("triangle radius", self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apex_points_down() {
        let tri = Triangle::new(Point::new(0.0, 0.0), 10.0);
        let [apex, left, right] = tri.vertices();
        assert!((apex.x).abs() < 1e-9);
        assert!((apex.y - 10.0).abs() < 1e-9);
        assert!(left.y < 0.0 && right.y < 0.0);
        assert!((left.y - right.y).abs() < 1e-9);
    }

    #[test]
    fn test_vertices_on_circumcircle() {
        let tri = Triangle::new(Point::new(5.0, 5.0), 7.0);
        for v in tri.vertices() {
            assert!(((v - tri.center).hypot() - 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reach_to() {
        let mut tri = Triangle::new(Point::new(0.0, 0.0), 0.0);
        tri.reach_to(Point::new(6.0, 8.0));
        assert!((tri.radius - 10.0).abs() < 1e-9);
    }
}

//! Ellipse shape (drawn as a circle around its anchor).

use super::{ElementId, ElementResult, ElementStyle, ElementTrait, ensure_non_negative, ensure_point};
use kurbo::{BezPath, Circle, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle whose radius follows the pointer's distance from the center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ElementId,
    /// Center point (where the drag started).
    pub center: Point,
    /// Radius.
    pub radius: f64,
    /// Style properties.
    pub style: ElementStyle,
}

impl Ellipse {
    /// Create a new ellipse.
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius,
            style: ElementStyle::default(),
        }
    }

    /// Set the radius to the distance between the center and `point`.
    pub fn reach_to(&mut self, point: Point) {
        self.radius = (point - self.center).hypot();
    }

    /// Get as a kurbo Circle.
    pub fn as_kurbo(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }
}

impl ElementTrait for Ellipse {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_kurbo().bounding_box()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dist = (point - self.center).hypot();
        (dist - self.radius).abs() <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
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
        ensure_point("ellipse center", self.center)?;
        ensure_non_negative("ellipse radius", self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reach_to_uses_euclidean_distance() {
        let mut ellipse = Ellipse::new(Point::new(10.0, 10.0), 0.0);
        ellipse.reach_to(Point::new(13.0, 14.0));
        assert!((ellipse.radius - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds() {
        let ellipse = Ellipse::new(Point::new(50.0, 50.0), 10.0);
        assert_eq!(ellipse.bounds(), Rect::new(40.0, 40.0, 60.0, 60.0));
    }

    #[test]
    fn test_hit_test_ring() {
        let ellipse = Ellipse::new(Point::new(0.0, 0.0), 10.0);
        assert!(ellipse.hit_test(Point::new(10.0, 0.0), 1.0));
        assert!(!ellipse.hit_test(Point::new(0.0, 0.0), 1.0));
    }
}

//! Rectangle shape.

use super::{ElementId, ElementResult, ElementStyle, ElementTrait, ensure_finite, ensure_point};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An outlined rectangle anchored where the drag started.
///
/// `width` and `height` are signed: dragging up or left from the anchor
/// yields negative extents. [`Rectangle::as_rect`] normalizes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ElementId,
    /// Anchor corner.
    pub position: Point,
    /// Signed horizontal extent from the anchor.
    pub width: f64,
    /// Signed vertical extent from the anchor.
    pub height: f64,
    /// Style properties.
    pub style: ElementStyle,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            style: ElementStyle::default(),
        }
    }

    /// Stretch the rectangle so its opposite corner sits at `corner`.
    pub fn drag_to(&mut self, corner: Point) {
        self.width = corner.x - self.position.x;
        self.height = corner.y - self.position.y;
    }

    /// Get the rectangle as a normalized kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::from_points(
            self.position,
            Point::new(self.position.x + self.width, self.position.y + self.height),
        )
    }
}

impl ElementTrait for Rectangle {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        // Outline only: rectangles are drawn without fill.
        let reach = tolerance + self.style.stroke_width / 2.0;
        let rect = self.as_rect();
        let outer = rect.inflate(reach, reach);
        let inner = rect.inflate(-reach, -reach);
        outer.contains(point) && !(inner.width() > 0.0 && inner.height() > 0.0 && inner.contains(point))
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ElementStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ElementStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn validate(&self) -> ElementResult<()> {
        ensure_point("rectangle position", self.position)?;
        ensure_finite("rectangle width", self.width)?;
        ensure_finite("rectangle height", self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_to_sets_signed_extent() {
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), 0.0, 0.0);
        rect.drag_to(Point::new(50.0, 40.0));
        assert_eq!(rect.width, 40.0);
        assert_eq!(rect.height, 30.0);

        rect.drag_to(Point::new(0.0, 5.0));
        assert_eq!(rect.width, -10.0);
        assert_eq!(rect.height, -5.0);
        assert_eq!(rect.bounds(), Rect::new(0.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_hit_test_outline() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(rect.hit_test(Point::new(0.0, 50.0), 2.0));
        assert!(rect.hit_test(Point::new(103.0, 50.0), 3.0));
        assert!(!rect.hit_test(Point::new(50.0, 50.0), 2.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 2.0));
    }

    #[test]
    fn test_hit_test_tiny_rect_is_solid() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 2.0, 2.0);
        assert!(rect.hit_test(Point::new(1.0, 1.0), 2.0));
    }

    #[test]
    fn test_translate() {
        let mut rect = Rectangle::new(Point::new(10.0, 20.0), 5.0, 5.0);
        rect.translate(Vec2::new(-10.0, 5.0));
        assert_eq!(rect.position, Point::new(0.0, 25.0));
    }
}

//! Straight line shape.

use super::{ElementId, ElementResult, ElementStyle, ElementTrait, ensure_point, point_to_segment_dist};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight segment between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ElementId,
    /// Start point (where the pointer went down).
    pub start: Point,
    /// End point (follows the pointer while drawing).
    pub end: Point,
    /// Style properties.
    pub style: ElementStyle,
}

impl Line {
    /// Create a new line.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ElementStyle::default(),
        }
    }

    /// Replace the second point.
    pub fn set_end(&mut self, end: Point) {
        self.end = end;
    }

    /// Euclidean length of the segment.
    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }
}

impl ElementTrait for Line {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start, self.end)
            <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
    }

    fn style(&self) -> &ElementStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ElementStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    fn validate(&self) -> ElementResult<()> {
        ensure_point("line start", self.start)?;
        ensure_point("line end", self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_end_replaces_second_point() {
        let mut line = Line::new(Point::new(1.0, 1.0), Point::new(1.0, 1.0));
        line.set_end(Point::new(4.0, 5.0));
        assert_eq!(line.start, Point::new(1.0, 1.0));
        assert_eq!(line.end, Point::new(4.0, 5.0));
        assert!((line.length() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_normalized() {
        let line = Line::new(Point::new(10.0, 10.0), Point::new(0.0, 20.0));
        assert_eq!(line.bounds(), Rect::new(0.0, 10.0, 10.0, 20.0));
    }

    #[test]
    fn test_hit_test() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 2.0), 2.0));
        assert!(!line.hit_test(Point::new(50.0, 20.0), 2.0));
    }
}

//! Math shape for LaTeX equations.

use super::{ElementError, ElementId, ElementResult, ElementStyle, ElementTrait, ensure_point};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A LaTeX expression shown as a plain label inside a fixed-size box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Math {
    pub(crate) id: ElementId,
    /// Top-left corner of the container.
    pub position: Point,
    /// LaTeX source.
    pub latex: String,
    /// Style properties (stroke color is used for the border and label).
    pub style: ElementStyle,
}

impl Math {
    pub const CONTAINER_WIDTH: f64 = 150.0;
    pub const CONTAINER_HEIGHT: f64 = 50.0;
    /// Offset of the label from the container's corner.
    pub const LABEL_INSET: Vec2 = Vec2::new(10.0, 15.0);
    pub const LABEL_FONT_SIZE: f64 = 16.0;

    pub fn new(position: Point, latex: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            latex: latex.into(),
            style: ElementStyle::default(),
        }
    }

    pub fn set_latex(&mut self, latex: impl Into<String>) {
        self.latex = latex.into();
    }

    /// The container rectangle.
    pub fn container(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + Self::CONTAINER_WIDTH,
            self.position.y + Self::CONTAINER_HEIGHT,
        )
    }

    /// Where the label starts.
    pub fn label_origin(&self) -> Point {
        self.position + Self::LABEL_INSET
    }
}

impl ElementTrait for Math {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.container()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.container().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.container().to_path(0.1)
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
        ensure_point("math position", self.position)?;
        if self.latex.trim().is_empty() {
            return Err(ElementError::Empty("latex"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_is_fixed_size() {
        let math = Math::new(Point::new(20.0, 30.0), r"\frac{a}{b}");
        assert_eq!(math.bounds(), Rect::new(20.0, 30.0, 170.0, 80.0));
        assert_eq!(math.label_origin(), Point::new(30.0, 45.0));
    }

    #[test]
    fn test_long_latex_does_not_grow_container() {
        let math = Math::new(Point::ZERO, "x".repeat(500));
        assert_eq!(math.bounds().width(), Math::CONTAINER_WIDTH);
    }

    #[test]
    fn test_empty_latex_is_malformed() {
        let math = Math::new(Point::ZERO, "   ");
        assert_eq!(math.validate(), Err(ElementError::Empty("latex")));
    }
}

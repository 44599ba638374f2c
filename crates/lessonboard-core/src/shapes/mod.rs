//! Element definitions for the whiteboard.
//!
//! Every drawable unit on a page is an [`Element`]: a closed set of variants,
//! each with the fields it needs and nothing else.

mod ellipse;
mod image;
mod line;
mod math;
mod rectangle;
mod solid;
mod stroke;
mod text;
mod triangle;

pub use ellipse::Ellipse;
pub use image::{Image, ImageSource};
pub use line::Line;
pub use math::Math;
pub use rectangle::Rectangle;
pub use solid::{Rotation3, Solid, SolidKind};
pub use stroke::Stroke;
pub use text::Text;
pub use triangle::Triangle;

use crate::tools::ToolKind;
use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    ///
    /// Returns `None` for anything else, including named colors.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
                255,
            )),
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style shared by every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Stroke color (also the display color of 3D placeholders).
    pub stroke_color: SerializableColor,
    /// Stroke width in canvas pixels.
    pub stroke_width: f64,
}

impl ElementStyle {
    pub fn new(stroke_color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            stroke_color,
            stroke_width,
        }
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self::new(SerializableColor::black(), 2.0)
    }
}

/// Reasons an element is considered malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementError {
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Result type for element validation.
pub type ElementResult<T> = Result<T, ElementError>;

pub(crate) fn ensure_finite(name: &'static str, value: f64) -> ElementResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ElementError::NonFinite(name))
    }
}

pub(crate) fn ensure_point(name: &'static str, point: Point) -> ElementResult<()> {
    ensure_finite(name, point.x)?;
    ensure_finite(name, point.y)
}

pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> ElementResult<()> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(ElementError::Negative(name));
    }
    Ok(())
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Common behaviour of every element variant.
pub trait ElementTrait {
    /// Get the unique identifier.
    fn id(&self) -> ElementId;

    /// Get the bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in canvas coordinates) hits this element.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the outline path handed to renderers.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ElementStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ElementStyle;

    /// Move the element by `delta`.
    fn translate(&mut self, delta: Vec2);

    /// Check the variant's required fields.
    fn validate(&self) -> ElementResult<()>;
}

/// Rotation carried by an element.
///
/// Planar rotation is a scalar in degrees; 3D placeholders rotate about all
/// three axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    None,
    Planar(f64),
    Spatial(Rotation3),
}

/// A drawable unit on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum Element {
    Freehand(Stroke),
    Eraser(Stroke),
    Line(Line),
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Triangle(Triangle),
    Text(Text),
    Image(Image),
    Math(Math),
    Solid(Solid),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Element::Freehand($s) | Element::Eraser($s) => $body,
            Element::Line($s) => $body,
            Element::Rectangle($s) => $body,
            Element::Ellipse($s) => $body,
            Element::Triangle($s) => $body,
            Element::Text($s) => $body,
            Element::Image($s) => $body,
            Element::Math($s) => $body,
            Element::Solid($s) => $body,
        }
    };
}

impl Element {
    pub fn id(&self) -> ElementId {
        dispatch!(self, s => s.id())
    }

    /// The tool that produces this kind of element.
    pub fn kind(&self) -> ToolKind {
        match self {
            Element::Freehand(_) => ToolKind::Pen,
            Element::Eraser(_) => ToolKind::Eraser,
            Element::Line(_) => ToolKind::Line,
            Element::Rectangle(_) => ToolKind::Rectangle,
            Element::Ellipse(_) => ToolKind::Ellipse,
            Element::Triangle(_) => ToolKind::Triangle,
            Element::Text(_) => ToolKind::Text,
            Element::Image(_) => ToolKind::Image,
            Element::Math(_) => ToolKind::Math,
            Element::Solid(_) => ToolKind::Solid,
        }
    }

    pub fn bounds(&self) -> Rect {
        dispatch!(self, s => s.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            // Eraser strokes remove ink; they are never picked.
            Element::Eraser(_) => false,
            _ => dispatch!(self, s => s.hit_test(point, tolerance)),
        }
    }

    pub fn to_path(&self) -> BezPath {
        dispatch!(self, s => s.to_path())
    }

    pub fn style(&self) -> &ElementStyle {
        dispatch!(self, s => s.style())
    }

    pub fn style_mut(&mut self) -> &mut ElementStyle {
        dispatch!(self, s => s.style_mut())
    }

    pub fn translate(&mut self, delta: Vec2) {
        dispatch!(self, s => s.translate(delta))
    }

    /// Check that the element carries usable values for its variant.
    pub fn validate(&self) -> ElementResult<()> {
        ensure_non_negative("stroke width", self.style().stroke_width)?;
        dispatch!(self, s => s.validate())
    }

    /// The rotation of this element, discriminated by kind.
    pub fn rotation(&self) -> Rotation {
        match self {
            Element::Image(img) => img.rotation.map_or(Rotation::None, Rotation::Planar),
            Element::Solid(solid) => Rotation::Spatial(solid.rotation),
            _ => Rotation::None,
        }
    }

    /// Replace the element's ID with a fresh one.
    ///
    /// Used when copying elements so the copy never shares an ID with its source.
    pub(crate) fn regenerate_id(&mut self) {
        self.set_id(Uuid::new_v4());
    }

    pub(crate) fn set_id(&mut self, id: ElementId) {
        dispatch!(self, s => s.id = id)
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Element::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Element::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Element::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut Image> {
        match self {
            Element::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_solid_mut(&mut self) -> Option<&mut Solid> {
        match self {
            Element::Solid(solid) => Some(solid),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color = SerializableColor::from_hex("#1976d2").unwrap();
        assert_eq!(color, SerializableColor::new(0x19, 0x76, 0xd2, 255));
        assert_eq!(color.to_hex(), "#1976d2");
    }

    #[test]
    fn test_hex_short_and_alpha() {
        assert_eq!(
            SerializableColor::from_hex("#f00"),
            Some(SerializableColor::new(255, 0, 0, 255))
        );
        let translucent = SerializableColor::from_hex("#00000080").unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_hex(), "#00000080");
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::from_hex("#12"), None);
        assert_eq!(SerializableColor::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_kind_matches_variant() {
        let rect = Element::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0));
        assert_eq!(rect.kind(), ToolKind::Rectangle);
        let eraser = Element::Eraser(Stroke::new(Point::ZERO));
        assert_eq!(eraser.kind(), ToolKind::Eraser);
    }

    #[test]
    fn test_rotation_is_discriminated_by_kind() {
        let rect = Element::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0));
        assert_eq!(rect.rotation(), Rotation::None);

        let solid = Solid::new(SolidKind::Cube, Point::ZERO, 100.0, 100.0);
        let expected = solid.rotation;
        assert_eq!(Element::Solid(solid).rotation(), Rotation::Spatial(expected));
    }

    #[test]
    fn test_regenerate_id() {
        let mut el = Element::Line(Line::new(Point::ZERO, Point::new(5.0, 5.0)));
        let before = el.id();
        el.regenerate_id();
        assert_ne!(before, el.id());
    }

    #[test]
    fn test_validate_rejects_negative_stroke_width() {
        let mut el = Element::Line(Line::new(Point::ZERO, Point::new(5.0, 5.0)));
        el.style_mut().stroke_width = -1.0;
        assert_eq!(el.validate(), Err(ElementError::Negative("stroke width")));
    }

    #[test]
    fn test_serde_uses_tool_tag() {
        let el = Element::Ellipse(Ellipse::new(Point::new(1.0, 2.0), 3.0));
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["tool"], "ellipse");
        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn test_eraser_is_not_pickable() {
        let eraser = Element::Eraser(Stroke::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        ]));
        assert!(!eraser.hit_test(Point::new(5.0, 0.0), 5.0));
    }

    #[test]
    fn test_polyline_distance() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!((point_to_polyline_dist(Point::new(5.0, 3.0), &pts) - 3.0).abs() < 1e-9);
        assert!(point_to_polyline_dist(Point::ZERO, &[]).is_infinite());
    }
}

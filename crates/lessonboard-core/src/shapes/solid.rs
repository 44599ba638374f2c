//! Placeholder for a 3D solid. The mesh itself is drawn by the host's 3D
//! engine; the board only tracks the viewport and orientation.

use super::{ElementId, ElementResult, ElementStyle, ElementTrait, ensure_non_negative, ensure_point, ensure_finite};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed catalog of solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolidKind {
    Cube,
    Sphere,
    Cone,
    Cylinder,
    Pyramid,
    Prism,
}

impl SolidKind {
    /// Get all catalog entries, in picker order.
    pub fn all() -> &'static [SolidKind] {
        &[
            SolidKind::Cube,
            SolidKind::Sphere,
            SolidKind::Cone,
            SolidKind::Cylinder,
            SolidKind::Pyramid,
            SolidKind::Prism,
        ]
    }

    /// Stable identifier used in lesson files.
    pub fn id(&self) -> &'static str {
        match self {
            SolidKind::Cube => "cube",
            SolidKind::Sphere => "sphere",
            SolidKind::Cone => "cone",
            SolidKind::Cylinder => "cylinder",
            SolidKind::Pyramid => "pyramid",
            SolidKind::Prism => "prism",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.id() == id)
    }

    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            SolidKind::Cube => "Cube",
            SolidKind::Sphere => "Sphere",
            SolidKind::Cone => "Cone",
            SolidKind::Cylinder => "Cylinder",
            SolidKind::Pyramid => "Pyramid",
            SolidKind::Prism => "Prism",
        }
    }
}

/// Rotation about the three axes, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Rotation3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A 3D solid shown in an on-canvas viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub(crate) id: ElementId,
    /// Top-left corner of the viewport.
    pub position: Point,
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
    /// Which solid to draw.
    pub shape: SolidKind,
    /// Label shown under the viewport.
    pub display_name: String,
    /// Orientation of the mesh.
    #[serde(default)]
    pub rotation: Rotation3,
    /// Style properties (stroke color is the mesh color).
    pub style: ElementStyle,
}

impl Solid {
    pub fn new(shape: SolidKind, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            shape,
            display_name: shape.display_name().to_string(),
            rotation: Rotation3::default(),
            style: ElementStyle::default(),
        }
    }

    pub fn viewport(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

impl ElementTrait for Solid {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.viewport()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.viewport().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.viewport().to_path(0.1)
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
        ensure_point("solid position", self.position)?;
        ensure_non_negative("solid width", self.width)?;
        ensure_non_negative("solid height", self.height)?;
        ensure_finite("solid rotation", self.rotation.x)?;
        ensure_finite("solid rotation", self.rotation.y)?;
        ensure_finite("solid rotation", self.rotation.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_round_trip() {
        for kind in SolidKind::all() {
            assert_eq!(SolidKind::from_id(kind.id()), Some(*kind));
        }
        assert_eq!(SolidKind::from_id("torus"), None);
    }

    #[test]
    fn test_new_solid_defaults() {
        let solid = Solid::new(SolidKind::Cone, Point::new(10.0, 10.0), 200.0, 150.0);
        assert_eq!(solid.display_name, "Cone");
        assert_eq!(solid.rotation, Rotation3::default());
        assert_eq!(solid.bounds(), Rect::new(10.0, 10.0, 210.0, 160.0));
    }

    #[test]
    fn test_negative_viewport_is_malformed() {
        let solid = Solid::new(SolidKind::Cube, Point::ZERO, -5.0, 10.0);
        assert!(solid.validate().is_err());
    }
}

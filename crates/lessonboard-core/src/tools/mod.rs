//! Tool system for the whiteboard.

mod session;

pub use session::{Begin, DrawingSession, SessionState, TextOrigin};

use crate::shapes::{ElementStyle, SerializableColor};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Eraser,
    Line,
    Rectangle,
    Ellipse,
    Triangle,
    Text,
    Math,
    Image,
    Solid,
}

impl ToolKind {
    /// Tools whose elements are built by dragging on the canvas.
    pub fn is_drag_tool(&self) -> bool {
        matches!(
            self,
            ToolKind::Pen
                | ToolKind::Eraser
                | ToolKind::Line
                | ToolKind::Rectangle
                | ToolKind::Ellipse
                | ToolKind::Triangle
        )
    }

    /// Tools whose elements come from a picker or a file, not the pointer.
    pub fn is_inserted(&self) -> bool {
        matches!(self, ToolKind::Math | ToolKind::Image | ToolKind::Solid)
    }

    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pen => "Pen",
            ToolKind::Eraser => "Eraser",
            ToolKind::Line => "Line",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Ellipse => "Circle",
            ToolKind::Triangle => "Triangle",
            ToolKind::Text => "Text",
            ToolKind::Math => "Math",
            ToolKind::Image => "Image",
            ToolKind::Solid => "3D Shape",
        }
    }
}

/// The tool in effect and the style applied to what it draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl ToolSettings {
    /// The style given to elements created with these settings.
    pub fn style(&self) -> ElementStyle {
        ElementStyle::new(self.color, self.stroke_width)
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pen,
            color: SerializableColor::black(),
            stroke_width: 2.0,
        }
    }
}

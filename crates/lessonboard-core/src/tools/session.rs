//! Lifecycle of a single interactive edit.
//!
//! A drag runs `Idle -> Active -> Idle`; text runs `Idle -> TextEditing -> Idle`.
//! The session never touches history itself: it hands finished elements back
//! to the caller, which decides when to commit.

use super::{ToolKind, ToolSettings};
use crate::shapes::{Element, ElementId, Ellipse, Line, Rectangle, Stroke, Text, Triangle};
use kurbo::Point;

/// Radius given to an ellipse or triangle placed by a click without a drag.
pub const CLICK_RADIUS: f64 = 50.0;

/// Where the element being edited as text came from.
#[derive(Debug, Clone, PartialEq)]
pub enum TextOrigin {
    /// Created by this gesture; not yet on the page.
    New,
    /// Already on the page; `original` is its content before the edit.
    Existing { original: String },
}

/// State of the drawing session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// A drag is in progress.
    Active { tool: ToolKind, element: Element },
    /// A text element is being typed into.
    TextEditing { element: Element, origin: TextOrigin },
}

/// Outcome of [`DrawingSession::begin`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Begin {
    /// The select tool was used; the caller should pick at this point.
    Select(Point),
    /// A drag session started.
    Drawing(ElementId),
    /// A new text element was created and is now being edited.
    Text(ElementId),
    /// The tool inserts elements through other channels.
    NotDraggable(ToolKind),
    /// A session is already running.
    Busy,
}

/// The in-progress edit, if any.
#[derive(Debug, Clone)]
pub struct DrawingSession {
    state: SessionState,
    placeholder: String,
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new("Click to edit text")
    }
}

impl DrawingSession {
    /// Create an idle session; new text elements start with `placeholder`.
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: SessionState::Idle,
            placeholder: placeholder.into(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(self.state, SessionState::TextEditing { .. })
    }

    /// The element under construction, for previews.
    pub fn element(&self) -> Option<&Element> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Active { element, .. } | SessionState::TextEditing { element, .. } => {
                Some(element)
            }
        }
    }

    /// Start a gesture at `point` with the given tool settings.
    pub fn begin(&mut self, point: Point, settings: &ToolSettings) -> Begin {
        if !self.is_idle() {
            return Begin::Busy;
        }

        let tool = settings.tool;
        let mut element = match tool {
            ToolKind::Select => return Begin::Select(point),
            ToolKind::Math | ToolKind::Image | ToolKind::Solid => {
                return Begin::NotDraggable(tool);
            }
            ToolKind::Pen => Element::Freehand(Stroke::new(point)),
            ToolKind::Eraser => Element::Eraser(Stroke::new(point)),
            ToolKind::Line => Element::Line(Line::new(point, point)),
            ToolKind::Rectangle => Element::Rectangle(Rectangle::new(point, 0.0, 0.0)),
            ToolKind::Ellipse => Element::Ellipse(Ellipse::new(point, 0.0)),
            ToolKind::Triangle => Element::Triangle(Triangle::new(point, 0.0)),
            ToolKind::Text => Element::Text(Text::new(point, self.placeholder.clone())),
        };
        *element.style_mut() = settings.style();
        let id = element.id();

        if tool == ToolKind::Text {
            self.state = SessionState::TextEditing {
                element,
                origin: TextOrigin::New,
            };
            Begin::Text(id)
        } else {
            self.state = SessionState::Active { tool, element };
            Begin::Drawing(id)
        }
    }

    /// Apply a pointer move to the active drag. Returns `false` when idle
    /// or editing text.
    pub fn update(&mut self, point: Point) -> bool {
        let SessionState::Active { element, .. } = &mut self.state else {
            return false;
        };
        match element {
            Element::Freehand(stroke) | Element::Eraser(stroke) => stroke.add_point(point),
            Element::Line(line) => line.set_end(point),
            Element::Rectangle(rect) => rect.drag_to(point),
            Element::Ellipse(ellipse) => ellipse.reach_to(point),
            Element::Triangle(triangle) => triangle.reach_to(point),
            Element::Text(_) | Element::Image(_) | Element::Math(_) | Element::Solid(_) => {
                return false;
            }
        }
        true
    }

    /// End the active drag and hand back the finished element. An ellipse or
    /// triangle placed by a bare click gets [`CLICK_RADIUS`].
    pub fn finish(&mut self) -> Option<Element> {
        if !self.is_active() {
            return None;
        }
        match std::mem::take(&mut self.state) {
            SessionState::Active { mut element, .. } => {
                match &mut element {
                    Element::Ellipse(ellipse) if ellipse.radius == 0.0 => {
                        ellipse.radius = CLICK_RADIUS
                    }
                    Element::Triangle(triangle) if triangle.radius == 0.0 => {
                        triangle.radius = CLICK_RADIUS
                    }
                    _ => {}
                }
                Some(element)
            }
            _ => None,
        }
    }

    /// Start editing an element that is already on the page.
    pub fn begin_text_edit(&mut self, existing: Text) -> bool {
        if !self.is_idle() {
            return false;
        }
        let original = existing.content.clone();
        self.state = SessionState::TextEditing {
            element: Element::Text(existing),
            origin: TextOrigin::Existing { original },
        };
        true
    }

    /// Replace the content of the text being edited. Never commits.
    pub fn edit_text(&mut self, content: &str) -> bool {
        let SessionState::TextEditing { element, .. } = &mut self.state else {
            return false;
        };
        match element.as_text_mut() {
            Some(text) => {
                text.set_content(content);
                true
            }
            None => false,
        }
    }

    /// End text editing and hand back the element with where it came from.
    pub fn finish_text(&mut self) -> Option<(Element, TextOrigin)> {
        if !self.is_editing_text() {
            return None;
        }
        match std::mem::take(&mut self.state) {
            SessionState::TextEditing { element, origin } => Some((element, origin)),
            _ => None,
        }
    }

    /// Abandon whatever is in progress and return it.
    pub fn cancel(&mut self) -> SessionState {
        std::mem::take(&mut self.state)
    }
}

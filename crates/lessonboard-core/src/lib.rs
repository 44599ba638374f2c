//! Lessonboard Core Library
//!
//! Platform-agnostic document model and editing logic for the Lessonboard
//! classroom whiteboard.

pub mod config;
pub mod events;
pub mod export;
pub mod history;
pub mod page;
pub mod shapes;
pub mod storage;
pub mod tools;
pub mod upload;
pub mod whiteboard;

pub use config::{ConfigError, WhiteboardConfig};
pub use events::BoardEvent;
pub use export::{ExportError, GridStyle, RasterImage, Renderer, Scene};
pub use history::{History, Snapshot};
pub use page::{Page, PageId};
pub use shapes::{Element, ElementId, ElementStyle, SerializableColor};
pub use tools::{DrawingSession, SessionState, ToolKind, ToolSettings};
pub use upload::{DecodedImage, UploadError};
pub use whiteboard::Whiteboard;

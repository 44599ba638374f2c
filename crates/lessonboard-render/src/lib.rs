//! Lessonboard Render Library
//!
//! CPU rasterization of whiteboard scenes for page export and thumbnails.

mod software;

pub use software::SoftwareRenderer;

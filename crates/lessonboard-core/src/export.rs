//! Rendering contract and raster encoding.
//!
//! The board never rasterizes anything itself. It describes what to draw as a
//! [`Scene`] and hands it to a [`Renderer`]; the pixels that come back are
//! encoded as PNG and wrapped in a `data:` URL.

use crate::shapes::{Element, SerializableColor};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No renderer available")]
    RendererUnavailable,
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Background grid drawn behind the elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridStyle {
    /// Spacing between lines in canvas pixels.
    pub spacing: f64,
    pub color: SerializableColor,
    pub line_width: f64,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            spacing: 20.0,
            color: SerializableColor::new(0xdd, 0xdd, 0xdd, 255),
            line_width: 0.5,
        }
    }
}

/// Everything a renderer needs to draw one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Canvas size in logical pixels.
    pub size: Size,
    pub background: SerializableColor,
    /// Output pixels per logical pixel.
    pub pixel_ratio: f64,
    pub grid: Option<GridStyle>,
    /// Elements back to front.
    pub elements: Vec<Element>,
}

impl Scene {
    pub fn new(size: Size, elements: Vec<Element>) -> Self {
        Self {
            size,
            background: SerializableColor::white(),
            pixel_ratio: 1.0,
            grid: None,
            elements,
        }
    }

    pub fn with_background(mut self, background: SerializableColor) -> Self {
        self.background = background;
        self
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn with_grid(mut self, grid: Option<GridStyle>) -> Self {
        self.grid = grid;
        self
    }

    /// Output size in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = |v: f64| (v * self.pixel_ratio).round().max(0.0) as u32;
        (scale(self.size.width), scale(self.size.height))
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Rasterize the scene.
    fn render(&mut self, scene: &Scene) -> ExportResult<RasterImage>;
}

/// Raw RGBA pixels, 4 bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RasterImage {
    /// Wrap an existing buffer, checking its length.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> ExportResult<Self> {
        if width == 0 || height == 0 {
            return Err(ExportError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ExportError::BufferSize {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Create an image filled with a single color.
    pub fn filled(width: u32, height: u32, color: SerializableColor) -> ExportResult<Self> {
        let pixel = [color.r, color.g, color.b, color.a];
        let rgba = pixel.repeat(width as usize * height as usize);
        Self::new(width, height, rgba)
    }

    /// Get the pixel at (x, y), if inside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> ExportResult<Vec<u8>> {
        encode_png(self)
    }

    /// Encode as PNG and wrap in a `data:image/png;base64,` URL.
    pub fn to_png_data_url(&self) -> ExportResult<String> {
        Ok(data_url("image/png", &self.to_png()?))
    }
}

/// Encode RGBA pixels as an 8-bit PNG.
pub fn encode_png(image: &RasterImage) -> ExportResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width, image.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.rgba)?;
    }
    Ok(png_data)
}

/// Build a base64 `data:` URL.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its MIME type and decoded bytes.
pub fn parse_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime_type.to_string(), bytes))
}

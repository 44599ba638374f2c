//! Image shape for embedding raster images.

use super::{
    ElementError, ElementId, ElementResult, ElementStyle, ElementTrait, ensure_finite, ensure_point,
};
use crate::export::parse_data_url;
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the pixels of an image come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// The encoded payload, inline as a `data:` URI.
    DataUri(String),
    /// A handle into the host's decoded-image cache.
    Cached(ElementId),
}

/// A raster image placed on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ElementId,
    /// Top-left corner position.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Pixel source.
    pub source: ImageSource,
    /// Original image width in pixels.
    pub source_width: u32,
    /// Original image height in pixels.
    pub source_height: u32,
    /// Name of the uploaded file, if known.
    #[serde(default)]
    pub file_name: Option<String>,
    /// MIME type of the uploaded file, if known.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Rotation in degrees around the top-left corner.
    #[serde(default)]
    pub rotation: Option<f64>,
    /// Style properties (unused by the image itself, kept for selection outlines).
    pub style: ElementStyle,
}

impl Image {
    /// Create an image displayed at its natural size.
    pub fn new(position: Point, source: ImageSource, source_width: u32, source_height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: source_width as f64,
            height: source_height as f64,
            source,
            source_width,
            source_height,
            file_name: None,
            mime_type: None,
            rotation: None,
            style: ElementStyle::default(),
        }
    }

    /// Width over height of the source pixels.
    pub fn aspect_ratio(&self) -> f64 {
        if self.source_height == 0 {
            return 1.0;
        }
        self.source_width as f64 / self.source_height as f64
    }

    /// Shrink the display size so it fits in `max_width` x `max_height`.
    ///
    /// Width is clamped first, then height; the image is never enlarged.
    pub fn fit_within(&mut self, max_width: f64, max_height: f64) {
        if self.width > max_width {
            self.height *= max_width / self.width;
            self.width = max_width;
        }
        if self.height > max_height {
            self.width *= max_height / self.height;
            self.height = max_height;
        }
    }

    /// Set the display width, deriving the height from the source aspect ratio.
    pub fn resize_keep_aspect(&mut self, width: f64) {
        self.width = width;
        self.height = width / self.aspect_ratio();
    }

    /// Raw encoded bytes, when the payload is an inline data URI.
    pub fn data(&self) -> Option<Vec<u8>> {
        match &self.source {
            ImageSource::DataUri(uri) => parse_data_url(uri).map(|(_, bytes)| bytes),
            ImageSource::Cached(_) => None,
        }
    }

    /// The display rectangle before rotation.
    pub fn as_rect(&self) -> Rect {
        Rect::from_points(
            self.position,
            Point::new(self.position.x + self.width, self.position.y + self.height),
        )
    }

    /// Rotation about the top-left corner, identity when unrotated.
    pub fn rotation_affine(&self) -> Affine {
        match self.rotation {
            Some(degrees) if degrees.abs() > f64::EPSILON => {
                Affine::rotate_about(degrees.to_radians(), self.position)
            }
            _ => Affine::IDENTITY,
        }
    }
}

impl ElementTrait for Image {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        (self.rotation_affine() * self.as_rect().to_path(0.1)).bounding_box()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = self.rotation_affine().inverse() * point;
        self.as_rect().inflate(tolerance, tolerance).contains(local)
    }

    fn to_path(&self) -> BezPath {
        self.rotation_affine() * self.as_rect().to_path(0.1)
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
        ensure_point("image position", self.position)?;
        ensure_finite("image width", self.width)?;
        ensure_finite("image height", self.height)?;
        if let Some(rotation) = self.rotation {
            ensure_finite("image rotation", rotation)?;
        }
        if self.source_width == 0 || self.source_height == 0 {
            return Err(ElementError::Empty("image source dimensions"));
        }
        match &self.source {
            ImageSource::DataUri(uri) if uri.is_empty() => Err(ElementError::Empty("image data")),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> Image {
        Image::new(Point::ZERO, ImageSource::Cached(Uuid::new_v4()), width, height)
    }

    #[test]
    fn test_fit_within_shrinks_wide_image() {
        let mut img = image(1000, 500);
        img.fit_within(400.0, 400.0);
        assert!((img.width - 400.0).abs() < 0.01);
        assert!((img.height - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_within_shrinks_tall_image() {
        let mut img = image(300, 900);
        img.fit_within(640.0, 480.0);
        assert!((img.height - 480.0).abs() < 0.01);
        assert!((img.width - 160.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_within_never_enlarges() {
        let mut img = image(100, 50);
        img.fit_within(400.0, 400.0);
        assert_eq!((img.width, img.height), (100.0, 50.0));
    }

    #[test]
    fn test_resize_keep_aspect() {
        let mut img = image(200, 100);
        img.resize_keep_aspect(50.0);
        assert!((img.height - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_bounds_and_hit_test() {
        let mut img = image(100, 50);
        img.rotation = Some(90.0);
        let bounds = img.bounds();
        assert!((bounds.width() - 50.0).abs() < 1e-6);
        assert!((bounds.height() - 100.0).abs() < 1e-6);
        // Rotating 90° about the top-left swings the image to the left.
        assert!(img.hit_test(Point::new(-25.0, 50.0), 0.0));
        assert!(!img.hit_test(Point::new(25.0, 25.0), 0.0));
    }

    #[test]
    fn test_zero_source_is_malformed() {
        let img = image(0, 10);
        assert_eq!(
            img.validate(),
            Err(ElementError::Empty("image source dimensions"))
        );
    }

    #[test]
    fn test_data_from_uri() {
        let img = Image::new(
            Point::ZERO,
            ImageSource::DataUri("data:image/png;base64,AQID".to_string()),
            1,
            1,
        );
        assert_eq!(img.data(), Some(vec![1, 2, 3]));
    }
}

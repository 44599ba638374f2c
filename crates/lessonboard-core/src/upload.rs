//! Decoding of uploaded image files.

use crate::export::data_url;
use thiserror::Error;

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{file_name} is not an image ({mime_type})")]
    NotAnImage { file_name: String, mime_type: String },
    /// Vector formats have no raster decoder.
    #[error("{file_name} has unsupported image type {mime_type}")]
    Unsupported { file_name: String, mime_type: String },
    #[error("{0} is empty")]
    Empty(String),
    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// An uploaded image whose pixel dimensions are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub file_name: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    /// The original file bytes as a `data:` URL.
    pub data_url: String,
}

/// Validate and decode an uploaded file.
///
/// Files whose MIME type is not `image/*` are refused before the payload is
/// looked at. SVG is refused as unsupported.
pub fn decode_upload(file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<DecodedImage, UploadError> {
    let normalized = mime_type.trim().to_ascii_lowercase();
    if !normalized.starts_with("image/") {
        log::debug!("Rejected upload {} with type {}", file_name, mime_type);
        return Err(UploadError::NotAnImage {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
        });
    }
    if normalized.starts_with("image/svg") {
        log::debug!("Rejected vector upload {}", file_name);
        return Err(UploadError::Unsupported {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
        });
    }
    if bytes.is_empty() {
        return Err(UploadError::Empty(file_name.to_string()));
    }

    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = (decoded.width(), decoded.height());
    log::info!("Decoded upload {}: {}x{}", file_name, width, height);

    Ok(DecodedImage {
        file_name: file_name.to_string(),
        mime_type: mime_type.to_string(),
        width,
        height,
        data_url: data_url(mime_type, bytes),
    })
}

/// Guess a MIME type from a file extension.
pub fn mime_from_extension(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{RasterImage, encode_png};
    use crate::shapes::SerializableColor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RasterImage::filled(width, height, SerializableColor::black()).unwrap();
        encode_png(&image).unwrap()
    }

    #[test]
    fn test_decode_png() {
        let decoded = decode_upload("dot.png", "image/png", &png_bytes(7, 3)).unwrap();
        assert_eq!((decoded.width, decoded.height), (7, 3));
        assert!(decoded.data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_decode_gif() {
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::new_rgba8(3, 2)
            .write_to(&mut bytes, image::ImageFormat::Gif)
            .unwrap();

        let mime = mime_from_extension("dot.gif");
        let decoded = decode_upload("dot.gif", mime, bytes.get_ref()).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert!(decoded.data_url.starts_with("data:image/gif;base64,"));
    }

    #[test]
    fn test_rejects_svg_as_unsupported() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#;
        let err = decode_upload("shape.svg", mime_from_extension("shape.svg"), svg).unwrap_err();
        assert!(matches!(err, UploadError::Unsupported { .. }));
    }

    #[test]
    fn test_rejects_non_image_mime() {
        let err = decode_upload("notes.pdf", "application/pdf", b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage { .. }));
    }

    #[test]
    fn test_rejects_garbage_payload() {
        let err = decode_upload("fake.png", "image/png", b"definitely not a png").unwrap_err();
        assert!(matches!(err, UploadError::Decode(_)));
    }

    #[test]
    fn test_rejects_empty_payload() {
        let err = decode_upload("empty.png", "image/png", &[]).unwrap_err();
        assert!(matches!(err, UploadError::Empty(_)));
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("photo.JPG"), "image/jpeg");
        assert_eq!(mime_from_extension("slides.pdf"), "application/pdf");
        assert_eq!(mime_from_extension("README"), "application/octet-stream");
    }
}

//! Receipt image normalization
//!
//! The recognition service accepts exactly one image encoding. JPEG input
//! passes through untouched; PNG input is decoded and re-encoded as JPEG
//! at a fixed quality. Alpha channels are dropped before encoding since
//! JPEG has no alpha representation.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use thiserror::Error;

/// Quality factor for re-encoded receipts
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Media types accepted at the file picker
const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// File extensions accepted at the file picker
const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Image normalization errors
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Upload is not a JPEG or PNG (by extension or content)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Bytes did not decode as an image
    #[error("Not a valid image: {0}")]
    InvalidImage(String),

    /// JPEG re-encoding failed
    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

/// Check an upload against the accepted extensions and sniffed content
///
/// Both checks must pass; a renamed `.png` claiming to be `.jpg` is still
/// accepted (it is a real image), but a text file named `receipt.jpg`
/// is not.
pub fn validate_upload(file_name: &str, bytes: &[u8]) -> Result<(), NormalizeError> {
    let extension = file_name
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(NormalizeError::UnsupportedMediaType(format!(
            "file extension {:?} (accepted: jpg, jpeg, png)",
            extension
        )));
    }

    match infer::get(bytes) {
        Some(kind) if ACCEPTED_MIME_TYPES.contains(&kind.mime_type()) => Ok(()),
        Some(kind) => Err(NormalizeError::UnsupportedMediaType(
            kind.mime_type().to_string(),
        )),
        None => Err(NormalizeError::UnsupportedMediaType(
            "unrecognized content".to_string(),
        )),
    }
}

/// Convert an uploaded raster image to canonical JPEG bytes
///
/// JPEG input is returned unchanged. Anything else is decoded, flattened
/// to RGB and re-encoded at [`DEFAULT_JPEG_QUALITY`].
pub fn normalize_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, NormalizeError> {
    if infer::get(bytes).map(|k| k.mime_type()) == Some("image/jpeg") {
        return Ok(bytes.to_vec());
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| NormalizeError::InvalidImage(e.to_string()))?;

    // JPEG cannot carry alpha; flatten to RGB first
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, DEFAULT_JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| NormalizeError::Encode(e.to_string()))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn rgba_png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 128]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 4, image::Rgb([10, 200, 10]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Jpeg)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn jpeg_passes_through_unchanged() {
        let input = jpeg_bytes();
        let output = normalize_to_jpeg(&input).unwrap();
        assert_eq!(input, output);
    }

    #[test]
    fn png_is_reencoded_as_jpeg() {
        let output = normalize_to_jpeg(&png_bytes()).unwrap();
        assert_eq!(infer::get(&output).unwrap().mime_type(), "image/jpeg");
    }

    #[test]
    fn png_with_alpha_is_reencoded_as_jpeg() {
        let output = normalize_to_jpeg(&rgba_png_bytes()).unwrap();
        assert_eq!(infer::get(&output).unwrap().mime_type(), "image/jpeg");
    }

    #[test]
    fn garbage_bytes_surface_as_invalid_image() {
        let err = normalize_to_jpeg(b"definitely not an image").unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidImage(_)));
    }

    #[test]
    fn validate_accepts_real_png_and_jpeg() {
        assert!(validate_upload("struk.png", &png_bytes()).is_ok());
        assert!(validate_upload("struk.JPG", &jpeg_bytes()).is_ok());
        // Renamed but genuine image still accepted
        assert!(validate_upload("struk.jpg", &png_bytes()).is_ok());
    }

    #[test]
    fn validate_rejects_wrong_extension_or_content() {
        assert!(matches!(
            validate_upload("struk.pdf", &png_bytes()),
            Err(NormalizeError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            validate_upload("struk.jpg", b"plain text pretending"),
            Err(NormalizeError::UnsupportedMediaType(_))
        ));
    }
}

//! Source image intake.
//!
//! The backend only accepts PNG, so uploads are checked here before anything
//! is shown in the crop widget: declared MIME type, size cap, format sniffed
//! from the bytes, and the natural dimensions read from the PNG header.
//! The image is never fully decoded on the client.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use thiserror::Error;

use crate::mapping::Dimensions;

/// Largest upload accepted by default (20 MiB).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// MIME type of the only accepted format.
pub const PNG_MIME: &str = "image/png";

const DEFAULT_FILE_NAME: &str = "image.png";

/// Error types for image intake.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Declared or sniffed format is not PNG.
    #[error("Only PNG")]
    NotPng,

    /// Upload exceeds the size cap.
    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    /// The PNG header reports a zero width or height.
    #[error("Image has no pixels")]
    EmptyImage,

    /// The PNG could not be read.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// A picked PNG with its natural dimensions.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Name sent as the multipart file name.
    pub file_name: String,
    /// Original file bytes, submitted unchanged to the backend.
    pub bytes: Vec<u8>,
    /// Intrinsic pixel dimensions.
    pub natural: Dimensions,
}

impl SourceImage {
    /// Accept a PNG upload with the default size cap.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw file bytes
    /// * `declared_mime` - MIME type reported by the file picker, if any
    ///
    /// # Errors
    ///
    /// See [`SourceImage::from_png_limited`].
    pub fn from_png(bytes: Vec<u8>, declared_mime: Option<&str>) -> Result<Self, UploadError> {
        Self::from_png_limited(bytes, declared_mime, MAX_UPLOAD_BYTES)
    }

    /// Accept a PNG upload.
    ///
    /// # Errors
    ///
    /// - `UploadError::NotPng` if the declared type or the sniffed format is
    ///   not PNG
    /// - `UploadError::TooLarge` if `bytes` exceeds `max_bytes`
    /// - `UploadError::EmptyImage` if the header reports a zero dimension
    /// - `UploadError::CorruptedFile` if the header cannot be read
    pub fn from_png_limited(
        bytes: Vec<u8>,
        declared_mime: Option<&str>,
        max_bytes: usize,
    ) -> Result<Self, UploadError> {
        if let Some(mime) = declared_mime {
            if !mime.eq_ignore_ascii_case(PNG_MIME) {
                return Err(UploadError::NotPng);
            }
        }

        if bytes.len() > max_bytes {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max: max_bytes,
            });
        }

        let (width, height) = read_png_dimensions(&bytes)?;

        log::debug!("accepted PNG upload: {}x{}, {} bytes", width, height, bytes.len());

        Ok(Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            bytes,
            natural: Dimensions::from((width, height)),
        })
    }

    /// Replace the multipart file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.file_name = name;
        }
        self
    }

    /// Size of the original file in bytes.
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

/// Read the natural dimensions from PNG bytes without decoding pixel data.
///
/// # Errors
///
/// - `UploadError::NotPng` if the bytes are not a PNG
/// - `UploadError::EmptyImage` if the IHDR chunk declares a zero dimension
/// - `UploadError::CorruptedFile` if the header cannot be read
pub fn read_png_dimensions(bytes: &[u8]) -> Result<(u32, u32), UploadError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| UploadError::CorruptedFile(e.to_string()))?;

    if reader.format() != Some(ImageFormat::Png) {
        return Err(UploadError::NotPng);
    }

    // The decoder reports a zero dimension as a generic format error.
    if let Some((width, height)) = ihdr_dimensions(bytes) {
        if width == 0 || height == 0 {
            return Err(UploadError::EmptyImage);
        }
    }

    reader
        .into_dimensions()
        .map_err(|e| UploadError::CorruptedFile(e.to_string()))
}

/// Width and height fields of the leading IHDR chunk, if present.
///
/// Layout: 8-byte signature, 4-byte chunk length, `IHDR`, then big-endian
/// width and height.
fn ihdr_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.get(12..16)? != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(bytes.get(16..20)?.try_into().ok()?);
    let height = u32::from_be_bytes(bytes.get(20..24)?.try_into().ok()?);
    Some((width, height))
}

/// Check whether bytes carry a PNG signature.
#[inline]
pub fn is_png(bytes: &[u8]) -> bool {
    matches!(image::guess_format(bytes), Ok(ImageFormat::Png))
}


#[cfg(test)]
mod tests {
    use super::test_support::{png_bytes, png_with_header_size};
    use super::*;

    // Minimal JPEG SOI + APP0 header, enough for format sniffing
    const JPEG_HEADER: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01,
    ];

    #[test]
    fn test_accepts_png() {
        let img = SourceImage::from_png(png_bytes(64, 32), Some("image/png")).unwrap();

        assert_eq!(img.natural, Dimensions::new(64.0, 32.0));
        assert_eq!(img.file_name, "image.png");
        assert!(!img.natural.is_portrait());
    }

    #[test]
    fn test_accepts_png_without_declared_type() {
        let img = SourceImage::from_png(png_bytes(10, 20), None).unwrap();
        assert!(img.natural.is_portrait());
    }

    #[test]
    fn test_declared_type_is_case_insensitive() {
        assert!(SourceImage::from_png(png_bytes(4, 4), Some("IMAGE/PNG")).is_ok());
    }

    #[test]
    fn test_rejects_declared_non_png() {
        let err = SourceImage::from_png(png_bytes(4, 4), Some("image/jpeg")).unwrap_err();
        assert!(matches!(err, UploadError::NotPng));
        assert_eq!(err.to_string(), "Only PNG");
    }

    #[test]
    fn test_rejects_sniffed_non_png() {
        let err = SourceImage::from_png(JPEG_HEADER.to_vec(), Some("image/png")).unwrap_err();
        assert!(matches!(err, UploadError::NotPng));
    }

    #[test]
    fn test_rejects_oversized_upload() {
        let bytes = png_bytes(8, 8);
        let size = bytes.len();
        let err = SourceImage::from_png_limited(bytes, Some(PNG_MIME), size - 1).unwrap_err();

        match err {
            UploadError::TooLarge { size: s, max } => {
                assert_eq!(s, size);
                assert_eq!(max, size - 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_truncated_png() {
        let mut bytes = png_bytes(8, 8);
        bytes.truncate(12);
        let err = SourceImage::from_png(bytes, None).unwrap_err();
        assert!(matches!(err, UploadError::CorruptedFile(_)));
    }

    #[test]
    fn test_rejects_zero_width_png() {
        let err = SourceImage::from_png(png_with_header_size(0, 10), Some("image/png")).unwrap_err();
        assert!(matches!(err, UploadError::EmptyImage));
        assert_eq!(err.to_string(), "Image has no pixels");
    }

    #[test]
    fn test_rejects_zero_height_png() {
        let err = SourceImage::from_png(png_with_header_size(10, 0), None).unwrap_err();
        assert!(matches!(err, UploadError::EmptyImage));
    }

    #[test]
    fn test_header_size_matches_decoder() {
        let bytes = png_with_header_size(7, 3);
        assert_eq!(ihdr_dimensions(&bytes), Some((7, 3)));
        assert_eq!(read_png_dimensions(&bytes).unwrap(), (7, 3));
    }

    #[test]
    fn test_rejects_empty_payload() {
        assert!(SourceImage::from_png(Vec::new(), None).is_err());
    }

    #[test]
    fn test_with_file_name() {
        let img = SourceImage::from_png(png_bytes(4, 4), None)
            .unwrap()
            .with_file_name("holiday.png");
        assert_eq!(img.file_name, "holiday.png");

        let img = img.with_file_name("");
        assert_eq!(img.file_name, "holiday.png");
    }

    #[test]
    fn test_is_png() {
        assert!(is_png(&png_bytes(2, 2)));
        assert!(!is_png(JPEG_HEADER));
        assert!(!is_png(&[]));
    }

    #[test]
    fn test_error_display() {
        let err = UploadError::TooLarge { size: 30, max: 20 };
        assert_eq!(err.to_string(), "File too large: 30 bytes (max 20)");
    }
}

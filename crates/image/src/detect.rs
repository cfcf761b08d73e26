//! Upload format sniffing from magic bytes.
//!
//! The intake accepts the formats the upload widgets accept — JPEG, PNG and
//! WebP — and rejects everything else before any decode work happens.

use crate::{ImageError, Result};

/// Raster formats accepted at upload intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    /// Baseline lossy format.
    Jpeg,
    /// Lossless format.
    Png,
    /// WebP container.
    WebP,
}

impl UploadFormat {
    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            UploadFormat::Jpeg => "image/jpeg",
            UploadFormat::Png => "image/png",
            UploadFormat::WebP => "image/webp",
        }
    }

    /// Common file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            UploadFormat::Jpeg => &["jpg", "jpeg"],
            UploadFormat::Png => &["png"],
            UploadFormat::WebP => &["webp"],
        }
    }
}

/// Sniff the upload format from leading magic bytes.
///
/// Anything that is not JPEG, PNG or WebP — including inputs too short to
/// carry a signature — is rejected with [`ImageError::UnsupportedFormat`].
///
/// # Example
/// ```
/// use tryon_image::{sniff_format, UploadFormat};
///
/// let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01];
/// assert!(matches!(sniff_format(&jpeg), Ok(UploadFormat::Jpeg)));
///
/// assert!(sniff_format(b"GIF89a\x00\x00\x00\x00\x00\x00").is_err());
/// ```
pub fn sniff_format(data: &[u8]) -> Result<UploadFormat> {
    if data.len() < 12 {
        return Err(ImageError::UnsupportedFormat);
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(UploadFormat::Jpeg);
    }

    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(UploadFormat::Png);
    }

    if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(UploadFormat::WebP);
    }

    Err(ImageError::UnsupportedFormat)
}

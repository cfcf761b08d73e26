//! Size-targeted JPEG re-encoding.
//!
//! The generation service behaves best when garment photos land inside a
//! narrow byte window. This module normalizes an upload (orientation, color
//! model, dimensions) and then searches JPEG quality levels until the encoded
//! size falls inside the configured window, with a best-effort fallback when
//! no quality level can hit it.

use crate::{ImageError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat};
use std::io::Cursor;
use tracing::debug;

/// Baseline quality for the ascending fallback pass.
const HIGH_QUALITY: u8 = 95;

/// Quality ceiling the ascending fallback pass stops at.
const QUALITY_CEILING: u8 = 100;

/// Byte window and search parameters for [`compress_to_target`].
///
/// Invariants: `min_bytes <= max_bytes`, `min_quality <= start_quality`,
/// `quality_step >= 1`. Checked by [`CompressionTarget::validate`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompressionTarget {
    /// Smallest acceptable encoded size in bytes.
    pub min_bytes: usize,
    /// Largest acceptable encoded size in bytes.
    pub max_bytes: usize,
    /// Quality the descending search starts at (1-100).
    pub start_quality: u8,
    /// Quality floor the descending search stops at.
    pub min_quality: u8,
    /// Step between tested quality levels.
    pub quality_step: u8,
    /// Longest-side cap in pixels, applied before encoding.
    pub max_dimension: u32,
}

impl Default for CompressionTarget {
    fn default() -> Self {
        Self {
            min_bytes: 1024 * 1024,
            max_bytes: 2 * 1024 * 1024,
            start_quality: 85,
            min_quality: 55,
            quality_step: 2,
            max_dimension: 2048,
        }
    }
}

impl CompressionTarget {
    /// Validate the parameter invariants.
    pub fn validate(&self) -> Result<()> {
        if self.min_bytes > self.max_bytes {
            return Err(ImageError::InvalidTarget(format!(
                "min_bytes ({}) exceeds max_bytes ({})",
                self.min_bytes, self.max_bytes
            )));
        }
        if self.min_quality > self.start_quality {
            return Err(ImageError::InvalidTarget(format!(
                "min_quality ({}) exceeds start_quality ({})",
                self.min_quality, self.start_quality
            )));
        }
        if self.start_quality == 0 || self.start_quality > 100 {
            return Err(ImageError::InvalidTarget(format!(
                "start_quality ({}) outside 1-100",
                self.start_quality
            )));
        }
        if self.quality_step == 0 {
            return Err(ImageError::InvalidTarget("quality_step must be >= 1".into()));
        }
        if self.max_dimension == 0 {
            return Err(ImageError::InvalidTarget("max_dimension must be >= 1".into()));
        }
        Ok(())
    }
}

/// Outcome of a size-targeting compression pass.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    /// Re-encoded JPEG bytes.
    pub data: Vec<u8>,
    /// Quality level the search settled on.
    pub quality: u8,
    /// Whether the encoded size landed inside the byte window.
    pub within_target: bool,
    /// Output width after orientation and downscale.
    pub width: u32,
    /// Output height after orientation and downscale.
    pub height: u32,
}

impl CompressionResult {
    /// Encoded size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Decode the re-encoded bytes back into a raster image.
    pub fn decode(&self) -> Result<DynamicImage> {
        image::load_from_memory(&self.data).map_err(|e| ImageError::InvalidImage(e.to_string()))
    }
}

/// Re-encode an upload so its size lands inside the target byte window.
///
/// The upload is first orientation-normalized, converted to RGB, and
/// downscaled so its longer side does not exceed `max_dimension`. The search
/// then encodes at descending quality levels from `start_quality` to
/// `min_quality`; the first size inside `[min_bytes, max_bytes]` wins. When no
/// level lands in the window, the highest-quality attempt at or above
/// `min_bytes` is returned; when even that fails, an ascending pass from a
/// high baseline takes over, and the last resort is the highest-quality
/// encoding attempted.
///
/// Pure given `(data, target)`: identical inputs settle on identical bytes.
pub fn compress_to_target(data: &[u8], target: &CompressionTarget) -> Result<CompressionResult> {
    target.validate()?;

    let img = normalize_upload(data, target.max_dimension)?;
    let (width, height) = (img.width(), img.height());

    // Descending pass. Track the best over-minimum candidate in case the
    // window is never hit; the highest quality (largest size) wins.
    let mut best: Option<(Vec<u8>, u8)> = None;
    let mut quality = target.start_quality;
    loop {
        let encoded = encode_jpeg(&img, quality)?;
        let size = encoded.len();
        debug!(quality, size, "descending attempt");

        if (target.min_bytes..=target.max_bytes).contains(&size) {
            return Ok(CompressionResult {
                data: encoded,
                quality,
                within_target: true,
                width,
                height,
            });
        }

        if size >= target.min_bytes
            && best.as_ref().is_none_or(|(kept, _)| size > kept.len())
        {
            best = Some((encoded, quality));
        }

        match quality.checked_sub(target.quality_step) {
            Some(next) if next >= target.min_quality => quality = next,
            _ => break,
        }
    }

    if let Some((data, quality)) = best {
        return Ok(CompressionResult {
            data,
            quality,
            within_target: false,
            width,
            height,
        });
    }

    // Every descending attempt fell short of the minimum. Climb from a high
    // baseline until the minimum is met or the ceiling is reached.
    let mut quality = HIGH_QUALITY.max(target.start_quality);
    loop {
        let encoded = encode_jpeg(&img, quality)?;
        let size = encoded.len();
        debug!(quality, size, "ascending attempt");

        if size >= target.min_bytes || quality >= QUALITY_CEILING {
            let within_target = (target.min_bytes..=target.max_bytes).contains(&size);
            return Ok(CompressionResult {
                data: encoded,
                quality,
                within_target,
                width,
                height,
            });
        }

        quality = quality.saturating_add(target.quality_step).min(QUALITY_CEILING);
    }
}

/// Normalize an upload for re-encoding: apply the EXIF orientation tag,
/// force a 3-channel RGB representation, and cap the longest side.
///
/// Fails with [`ImageError::InvalidImage`] when the bytes do not decode or
/// decode to a zero-dimension image.
pub fn normalize_upload(data: &[u8], max_dimension: u32) -> Result<DynamicImage> {
    let decoded =
        image::load_from_memory(data).map_err(|e| ImageError::InvalidImage(e.to_string()))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(ImageError::InvalidImage("zero-dimension image".into()));
    }

    let oriented = apply_orientation(decoded, read_orientation(data));
    let rgb = DynamicImage::ImageRgb8(oriented.to_rgb8());
    Ok(cap_longest_side(rgb, max_dimension))
}

/// Encode an image as JPEG at the given quality level.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageOutputFormat::Jpeg(quality))?;
    Ok(buffer.into_inner())
}

/// Downscale proportionally so the longer side equals `max_dimension`.
/// Lanczos3 keeps the re-encode free of aliasing artifacts.
fn cap_longest_side(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let longest = img.width().max(img.height());
    if longest <= max_dimension {
        return img;
    }

    let scale = f64::from(max_dimension) / f64::from(longest);
    let width = ((f64::from(img.width()) * scale).round() as u32).max(1);
    let height = ((f64::from(img.height()) * scale).round() as u32).max(1);
    img.resize(width, height, FilterType::Lanczos3)
}

/// Read EXIF tag 0x0112 (Orientation) from the raw upload bytes.
/// Returns 1 (normal) when there is no EXIF data or no orientation tag.
fn read_orientation(data: &[u8]) -> u32 {
    let mut cursor = Cursor::new(data);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(reader) => reader,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply an EXIF orientation value (1-8) with image-crate transforms.
///
/// 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([180, 40, 90])))
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageOutputFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn default_target_is_valid() {
        assert!(CompressionTarget::default().validate().is_ok());
    }

    #[test]
    fn inverted_byte_window_is_rejected() {
        let target = CompressionTarget {
            min_bytes: 10,
            max_bytes: 5,
            ..CompressionTarget::default()
        };
        assert!(matches!(target.validate(), Err(ImageError::InvalidTarget(_))));
    }

    #[test]
    fn inverted_quality_range_is_rejected() {
        let target = CompressionTarget {
            start_quality: 50,
            min_quality: 80,
            ..CompressionTarget::default()
        };
        assert!(target.validate().is_err());
    }

    #[test]
    fn zero_step_is_rejected() {
        let target = CompressionTarget {
            quality_step: 0,
            ..CompressionTarget::default()
        };
        assert!(target.validate().is_err());
    }

    #[test]
    fn garbage_input_is_invalid_image() {
        let result = compress_to_target(&[0u8; 64], &CompressionTarget::default());
        assert!(matches!(result, Err(ImageError::InvalidImage(_))));
    }

    #[test]
    fn first_attempt_inside_window_returns_immediately() {
        // A wide-open window means the start quality always lands in range.
        let target = CompressionTarget {
            min_bytes: 0,
            max_bytes: usize::MAX,
            ..CompressionTarget::default()
        };
        let result = compress_to_target(&png_bytes(&gradient(160, 120)), &target).unwrap();
        assert!(result.within_target);
        assert_eq!(result.quality, target.start_quality);
        assert_eq!((result.width, result.height), (160, 120));
    }

    #[test]
    fn unreachable_window_keeps_highest_quality_over_minimum() {
        // Window below anything the encoder can produce: every attempt
        // clears min_bytes, none fits under max_bytes, so the start-quality
        // encoding is kept.
        let target = CompressionTarget {
            min_bytes: 0,
            max_bytes: 16,
            start_quality: 85,
            min_quality: 55,
            quality_step: 10,
            max_dimension: 2048,
        };
        let result = compress_to_target(&png_bytes(&gradient(160, 120)), &target).unwrap();
        assert!(!result.within_target);
        assert_eq!(result.quality, 85);
        assert!(result.size_bytes() > 16);
    }

    #[test]
    fn solid_color_never_reaches_minimum() {
        // A solid 4000x4000 frame compresses far below a 1 MiB floor at any
        // quality, so the descent drains, the ascending pass runs out at the
        // ceiling, and the output stays valid.
        let target = CompressionTarget {
            min_bytes: 1_048_576,
            max_bytes: 2_097_152,
            start_quality: 85,
            min_quality: 55,
            quality_step: 3,
            max_dimension: 2048,
        };
        let result = compress_to_target(&png_bytes(&solid(4000, 4000)), &target).unwrap();
        assert!(!result.within_target);
        assert!(result.quality >= HIGH_QUALITY);
        assert!(result.size_bytes() < target.min_bytes);

        let decoded = result.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2048, 2048));
    }

    #[test]
    fn identical_inputs_settle_identically() {
        let data = png_bytes(&gradient(300, 200));
        let target = CompressionTarget::default();
        let first = compress_to_target(&data, &target).unwrap();
        let second = compress_to_target(&data, &target).unwrap();
        assert_eq!(first.size_bytes(), second.size_bytes());
        assert_eq!(first.quality, second.quality);
        assert_eq!(first.within_target, second.within_target);
    }

    #[test]
    fn longest_side_is_capped() {
        let target = CompressionTarget {
            min_bytes: 0,
            max_bytes: usize::MAX,
            max_dimension: 512,
            ..CompressionTarget::default()
        };
        let result = compress_to_target(&png_bytes(&gradient(2000, 1000)), &target).unwrap();
        assert_eq!(result.width, 512);
        assert_eq!(result.height, 256);
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let img = gradient(320, 240);
        let capped = cap_longest_side(img, 2048);
        assert_eq!((capped.width(), capped.height()), (320, 240));
    }

    #[test]
    fn encode_decode_round_trips_dimensions() {
        let img = gradient(123, 77);
        let jpeg = encode_jpeg(&img, 90).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (123, 77));
    }

    #[test]
    fn orientation_defaults_to_normal_without_exif() {
        // PNG carries no EXIF container at all.
        assert_eq!(read_orientation(&png_bytes(&solid(10, 10))), 1);
    }

    #[test]
    fn orientation_transforms_swap_dimensions() {
        let img = solid(4, 2);
        assert_eq!(apply_orientation(img.clone(), 6).dimensions(), (2, 4));
        assert_eq!(apply_orientation(img.clone(), 8).dimensions(), (2, 4));
        assert_eq!(apply_orientation(img.clone(), 3).dimensions(), (4, 2));
        assert_eq!(apply_orientation(img, 1).dimensions(), (4, 2));
    }
}

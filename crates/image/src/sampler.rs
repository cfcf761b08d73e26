//! Preview-click color sampling.
//!
//! Uploads are previewed scaled down; a click lands in preview coordinates
//! and has to be mapped back to the original-resolution pixel before the
//! color under it can be read.

use crate::{ImageError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// A pointer click captured on a scaled-down preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PreviewClick {
    /// Click x, relative to the preview.
    pub x: u32,
    /// Click y, relative to the preview.
    pub y: u32,
    /// Rendered preview width.
    pub preview_width: u32,
    /// Rendered preview height.
    pub preview_height: u32,
}

/// A pixel sampled from the original image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelSample {
    /// X in original-image coordinates.
    pub x: u32,
    /// Y in original-image coordinates.
    pub y: u32,
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl PixelSample {
    /// Lowercase zero-padded `#rrggbb` form of the sampled color.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Map a preview click back to original-image coordinates.
///
/// Each axis is scaled by `original / preview`, rounded, and clamped into
/// `[0, original - 1]` so boundary clicks never index outside the image.
///
/// Fails with [`ImageError::InvalidPreviewGeometry`] when either preview
/// dimension is zero.
pub fn remap_click(
    click: &PreviewClick,
    original_width: u32,
    original_height: u32,
) -> Result<(u32, u32)> {
    if click.preview_width == 0 || click.preview_height == 0 {
        return Err(ImageError::InvalidPreviewGeometry {
            width: click.preview_width,
            height: click.preview_height,
        });
    }
    if original_width == 0 || original_height == 0 {
        return Err(ImageError::InvalidImage(
            "cannot sample a zero-dimension image".into(),
        ));
    }

    let x = scale_axis(click.x, original_width, click.preview_width);
    let y = scale_axis(click.y, original_height, click.preview_height);
    Ok((x, y))
}

fn scale_axis(position: u32, original: u32, preview: u32) -> u32 {
    let mapped = (f64::from(position) * f64::from(original) / f64::from(preview)).round();
    (mapped as u32).min(original - 1)
}

/// Sample the color under a preview click.
pub fn sample_pixel(image: &DynamicImage, click: &PreviewClick) -> Result<PixelSample> {
    let (x, y) = remap_click(click, image.width(), image.height())?;
    let pixel = image.get_pixel(x, y);
    Ok(PixelSample {
        x,
        y,
        red: pixel[0],
        green: pixel[1],
        blue: pixel[2],
    })
}

/// Clamped crop box of `radius` pixels around `(x, y)`.
///
/// Returns `(x0, y0, x1, y1)` with exclusive upper bounds, never outside
/// `width`/`height`.
pub fn magnifier_box(x: u32, y: u32, radius: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let x0 = x.saturating_sub(radius);
    let y0 = y.saturating_sub(radius);
    let x1 = x.saturating_add(radius).min(width);
    let y1 = y.saturating_add(radius).min(height);
    (x0, y0, x1, y1)
}

/// Cut a magnified view around a sample: crop `radius` pixels either side,
/// then enlarge with nearest-neighbor so individual pixels stay visible.
pub fn magnify(
    image: &DynamicImage,
    sample: &PixelSample,
    radius: u32,
    output_size: u32,
) -> DynamicImage {
    let (x0, y0, x1, y1) = magnifier_box(sample.x, sample.y, radius, image.width(), image.height());
    let region = image.crop_imm(x0, y0, x1 - x0, y1 - y0);
    region.resize_exact(output_size, output_size, FilterType::Nearest)
}

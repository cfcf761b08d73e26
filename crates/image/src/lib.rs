//! Image preparation utilities for the try-on pipeline.
//!
//! This crate provides:
//! - Upload format sniffing from magic bytes
//! - Size-targeted JPEG re-encoding with orientation normalization
//! - Preview-click color sampling against the original-resolution image
//! - The intake gate deciding which uploads need re-encoding
//!
//! Everything here is synchronous and pure given its inputs; no network or
//! filesystem access happens in this crate.

#![warn(missing_docs)]

mod compress;
mod detect;
mod error;
mod intake;
mod sampler;

pub use compress::{
    compress_to_target, encode_jpeg, normalize_upload, CompressionResult, CompressionTarget,
};
pub use detect::{sniff_format, UploadFormat};
pub use error::{ImageError, Result};
pub use intake::{assess_upload, IntakeDecision, IntakeReason, UploadPolicy};
pub use sampler::{
    magnifier_box, magnify, remap_click, sample_pixel, PixelSample, PreviewClick,
};

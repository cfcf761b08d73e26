//! Error types for the image crate.

use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image preparation.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Input could not be decoded or normalized into a raster image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// A preview dimension was zero; clicks cannot be mapped back.
    #[error("degenerate preview geometry: {width}x{height}")]
    InvalidPreviewGeometry {
        /// Preview width the caller reported.
        width: u32,
        /// Preview height the caller reported.
        height: u32,
    },

    /// Upload is not one of the accepted raster formats.
    #[error("unsupported upload format")]
    UnsupportedFormat,

    /// Compression target parameters violate an invariant.
    #[error("invalid compression target: {0}")]
    InvalidTarget(String),

    /// Encoding error from the image crate.
    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),
}

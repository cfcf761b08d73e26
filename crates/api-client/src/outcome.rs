//! Terminal outcomes of a generation call.

use crate::error::{ApiError, ApiResult};
use image::DynamicImage;
use std::fmt;

/// A successfully generated image with any accompanying commentary.
#[derive(Clone)]
pub struct GeneratedImage {
    /// Decoded output image.
    pub image: DynamicImage,
    /// Media type the service tagged the payload with.
    pub mime_type: String,
    /// Text the service returned alongside the image, if any.
    pub description: Option<String>,
}

impl fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("mime_type", &self.mime_type)
            .field("description", &self.description)
            .finish()
    }
}

/// What a generation call ended with.
///
/// Every variant is terminal: the ladder has already run its course by the
/// time one of these is produced, and the client performs no further retries.
#[derive(Debug)]
pub enum GenerationOutcome {
    /// The service returned a decodable image.
    Success(GeneratedImage),
    /// A structurally valid response arrived without an image payload, e.g.
    /// after safety filtering. Expected service behavior, not a failure of
    /// the transport.
    NoImageReturned,
    /// Every ladder step failed at the transport or parse level; carries the
    /// last underlying cause.
    TransportFailure(ApiError),
    /// Image bytes arrived but are not a decodable raster image. The bytes
    /// are discarded rather than surfaced.
    DecodeFailure(String),
}

impl GenerationOutcome {
    /// True for [`GenerationOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }

    /// Convert into a `Result`, folding the non-success variants into errors.
    pub fn into_result(self) -> ApiResult<GeneratedImage> {
        match self {
            GenerationOutcome::Success(image) => Ok(image),
            GenerationOutcome::NoImageReturned => Err(ApiError::NoImage),
            GenerationOutcome::TransportFailure(cause) => Err(cause),
            GenerationOutcome::DecodeFailure(cause) => Err(ApiError::UndecodableImage(cause)),
        }
    }
}

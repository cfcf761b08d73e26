//! Client for the image generation service
//!
//! This crate provides a resilient, stateless HTTP client for submitting
//! garment images plus an instruction block to the external generation
//! service and decoding whatever comes back.
//!
//! # Features
//!
//! - **Descending resolution ladder**: a failed attempt at 4K falls back to
//!   2K and then 1K, deterministically, without ever re-trying a step
//! - **Tagged outcome decode**: responses are parsed once, at the boundary,
//!   into a closed [`GenerationOutcome`] — no speculative attribute probing
//!   downstream
//! - **Transparent inline encodings**: base64 and raw byte payloads decode
//!   identically
//! - **Stateless concurrency**: no state survives a call, so independent
//!   requests can run concurrently without locks
//! - **Request correlation**: every attempt carries a unique request ID
//!
//! # Example
//!
//! ```rust,no_run
//! use tryon_api_client::{
//!     GenerationClient, GenerationOutcome, GenerationRequest, ImageAttachment, Resolution,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create client with environment configuration
//!     let client = GenerationClient::new()?;
//!
//!     let primary = ImageAttachment::png(std::fs::read("garment.png")?);
//!     let request = GenerationRequest::new("instruction block", primary)
//!         .with_resolution(Resolution::TwoK);
//!
//!     match client.generate(&request).await {
//!         GenerationOutcome::Success(output) => output.image.save("output.png")?,
//!         other => eprintln!("no image produced: {other:?}"),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod outcome;
pub mod request;
pub mod resolution;
pub mod wire;

pub use client::GenerationClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use outcome::{GeneratedImage, GenerationOutcome};
pub use request::{GenerationRequest, ImageAttachment};
pub use resolution::{AspectRatio, Resolution};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::GenerationClient;
    pub use crate::config::ClientConfig;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::outcome::{GeneratedImage, GenerationOutcome};
    pub use crate::request::{GenerationRequest, ImageAttachment};
    pub use crate::resolution::{AspectRatio, Resolution};
}

//! Configuration for the generation client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default public endpoint of the generation service
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default image generation model
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Default per-attempt deadline in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Client configuration
///
/// Immutable once the client is built; every generation call shares it. The
/// timeout doubles as the deadline for each resolution-ladder step, so one
/// unresponsive attempt can never starve the whole ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the generation API
    pub base_url: String,
    /// API key sent with every request
    pub api_key: Option<String>,
    /// Model identifier appended to the URL path
    pub model: String,
    /// Deadline applied to each ladder step
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `TRYON_GEN_URL`: Base URL of the generation API
    /// - `TRYON_GEN_KEY` or `GEMINI_API_KEY`: API key
    /// - `TRYON_GEN_MODEL`: Model identifier
    /// - `TRYON_TIMEOUT_SECS`: Per-attempt deadline in seconds
    pub fn from_env() -> ApiResult<Self> {
        let base_url =
            env::var("TRYON_GEN_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let api_key = env::var("TRYON_GEN_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .ok();

        let model = env::var("TRYON_GEN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout = env::var("TRYON_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            base_url,
            api_key,
            model,
            timeout,
        })
    }

    /// Builder-style method to set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builder-style method to set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder-style method to set the per-attempt deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config(
                "base_url must start with http:// or https://",
            ));
        }

        if self.model.is_empty() {
            return Err(ApiError::config("model cannot be empty"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

//! Generation client with the descending resolution fallback ladder.

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::outcome::{GeneratedImage, GenerationOutcome};
use crate::request::GenerationRequest;
use crate::resolution::Resolution;
use crate::wire::{extract_payload, GenerateContentResponse};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// API key header the generation service expects
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the image generation service
///
/// This client wraps `reqwest` and adds:
/// - A fixed descending resolution ladder (4K → 2K → 1K) that masks
///   resolution-related failures without ever re-trying the same step
/// - One-shot tagged decoding of responses into [`GenerationOutcome`]
/// - Request correlation IDs for tracing
///
/// The client holds no per-call state: separate calls are independent and may
/// run concurrently without interference.
#[derive(Clone)]
pub struct GenerationClient {
    inner: Client,
    config: Arc<ClientConfig>,
}

impl GenerationClient {
    /// Create a new client with configuration from the environment
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static("tryon-api-client/0.4"),
        );

        // Add the API key header if available
        if let Some(ref key) = config.api_key {
            if let Ok(value) = HeaderValue::from_str(key) {
                default_headers.insert(API_KEY_HEADER, value);
            }
        }

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit a generation request, walking the resolution ladder until a
    /// structured response arrives or the ladder is exhausted.
    ///
    /// Transport-level failures and unparseable responses advance to the next
    /// lower tier. A structured response is terminal, whatever it contains:
    /// an empty candidate list becomes [`GenerationOutcome::NoImageReturned`],
    /// not a reason to descend further.
    #[instrument(skip(self, request), fields(resolution = %request.resolution()))]
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let mut last_error: Option<ApiError> = None;

        for &step in request.resolution().ladder() {
            match self.attempt(request, step).await {
                Ok(response) => return Self::resolve(response),
                Err(error) => {
                    warn!(step = %step, error = %error, "generation attempt failed, stepping down");
                    last_error = Some(error);
                }
            }
        }

        GenerationOutcome::TransportFailure(
            last_error.unwrap_or_else(|| ApiError::config("resolution ladder is empty")),
        )
    }

    /// One POST at one resolution step.
    async fn attempt(
        &self,
        request: &GenerationRequest,
        step: Resolution,
    ) -> ApiResult<GenerateContentResponse> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let request_id = Uuid::new_v4().to_string();
        let body = request.to_body(step);

        debug!(request_id = %request_id, step = %step, "submitting generation attempt");

        let response = self
            .inner
            .post(&url)
            .header(X_REQUEST_ID, &request_id)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ApiError::api(status.as_u16(), message));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(ApiError::Request)
    }

    /// Decode a structured response into its terminal outcome.
    fn resolve(response: GenerateContentResponse) -> GenerationOutcome {
        let payload = extract_payload(&response);

        let Some(inline) = payload.image else {
            return GenerationOutcome::NoImageReturned;
        };

        let bytes = match inline.data.decode() {
            Ok(bytes) => bytes,
            Err(error) => return GenerationOutcome::DecodeFailure(error.to_string()),
        };

        match image::load_from_memory(&bytes) {
            Ok(decoded) => GenerationOutcome::Success(GeneratedImage {
                image: decoded,
                mime_type: inline.mime_type,
                description: payload.text,
            }),
            Err(error) => GenerationOutcome::DecodeFailure(error.to_string()),
        }
    }
}

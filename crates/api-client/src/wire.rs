//! Wire schema for the `generateContent` endpoint.
//!
//! The remote schema is an opaque boundary: every response field is optional
//! at the parse layer and unknown fields are ignored, so partial or evolving
//! responses never break the decode. The tagged decode into an outcome
//! happens exactly once, here and in the client — nothing downstream probes
//! response shapes speculatively.

use crate::error::ApiResult;
use crate::resolution::{AspectRatio, Resolution};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Request body for a single generation attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentBody {
    /// Ordered content turns; a single user turn for this client.
    pub contents: Vec<Content>,
    /// Modalities and image output settings.
    pub generation_config: GenerationConfig,
}

/// One content turn: a role plus ordered parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// `user` on requests, `model` on responses; may be absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered parts; text and inline images may be interleaved.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part, either text or inline binary data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline binary payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Inline binary payload with its media type tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Media type, e.g. `image/png`.
    pub mime_type: String,
    /// Payload bytes.
    pub data: InlineBytes,
}

/// Inline payload encoding.
///
/// The service may answer with base64 text or a raw byte array; both decode
/// to the same bytes and callers never see the difference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InlineBytes {
    /// Standard base64 text.
    Base64(String),
    /// Raw byte values.
    Raw(Vec<u8>),
}

impl InlineBytes {
    /// Wrap raw bytes, base64-encoding them for the wire.
    pub fn encode(bytes: &[u8]) -> Self {
        InlineBytes::Base64(BASE64.encode(bytes))
    }

    /// Decode to raw bytes regardless of the wire encoding.
    pub fn decode(&self) -> ApiResult<Vec<u8>> {
        match self {
            InlineBytes::Base64(text) => Ok(BASE64.decode(text)?),
            InlineBytes::Raw(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Generation configuration: modalities plus image output settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested response modalities; `IMAGE` for this client.
    pub response_modalities: Vec<String>,
    /// Output image settings.
    pub image_config: ImageConfig,
}

/// Output image settings: aspect ratio and resolution tier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// Aspect ratio label.
    pub aspect_ratio: AspectRatio,
    /// Resolution tier label.
    pub image_size: Resolution,
}

/// Top-level response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    /// Candidate completions; may be absent or empty.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One candidate completion.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// May be omitted entirely, e.g. for filtered candidates.
    #[serde(default)]
    pub content: Option<Content>,
}

/// First acceptable inline image plus any accompanying text.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExtractedPayload {
    /// First inline part tagged with an `image/*` media type.
    pub image: Option<InlineData>,
    /// All text parts, joined with newlines.
    pub text: Option<String>,
}

/// Scan candidates for the first inline part tagged with an image media type.
///
/// Text parts are collected independently; neither payload is required for
/// the scan itself to succeed.
pub(crate) fn extract_payload(response: &GenerateContentResponse) -> ExtractedPayload {
    let mut image = None;
    let mut texts: Vec<&str> = Vec::new();

    for candidate in &response.candidates {
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in &content.parts {
            if let Some(text) = part.text.as_deref() {
                if !text.is_empty() {
                    texts.push(text);
                }
            }
            if image.is_none() {
                if let Some(inline) = &part.inline_data {
                    if inline.mime_type.starts_with("image/") {
                        image = Some(inline.clone());
                    }
                }
            }
        }
    }

    ExtractedPayload {
        image,
        text: if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn inline_bytes_round_trip() {
        let original = b"garment pixels";
        let encoded = InlineBytes::encode(original);
        assert_eq!(encoded.decode().unwrap(), original);
    }

    #[test]
    fn inline_bytes_accepts_raw_arrays() {
        let inline: InlineBytes = serde_json::from_value(json!([1, 2, 3, 255])).unwrap();
        assert_eq!(inline.decode().unwrap(), vec![1, 2, 3, 255]);
    }

    #[test]
    fn inline_bytes_rejects_invalid_base64() {
        let inline = InlineBytes::Base64("not valid base64!!!".into());
        assert!(inline.decode().is_err());
    }

    #[test]
    fn extracts_first_image_and_joins_text() {
        let response = parse(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "here is the render"},
                        {"inlineData": {"mimeType": "image/png", "data": BASE64.encode(b"first")}},
                        {"inlineData": {"mimeType": "image/png", "data": BASE64.encode(b"second")}},
                        {"text": "enjoy"}
                    ]
                }
            }]
        }));

        let payload = extract_payload(&response);
        let image = payload.image.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data.decode().unwrap(), b"first");
        assert_eq!(payload.text.as_deref(), Some("here is the render\nenjoy"));
    }

    #[test]
    fn non_image_media_types_are_skipped() {
        let response = parse(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"inlineData": {"mimeType": "application/pdf", "data": BASE64.encode(b"doc")}},
                        {"inlineData": {"mimeType": "image/jpeg", "data": BASE64.encode(b"pic")}}
                    ]
                }
            }]
        }));

        let payload = extract_payload(&response);
        assert_eq!(payload.image.unwrap().mime_type, "image/jpeg");
    }

    #[test]
    fn empty_candidates_yield_nothing() {
        let payload = extract_payload(&parse(json!({"candidates": []})));
        assert!(payload.image.is_none());
        assert!(payload.text.is_none());
    }

    #[test]
    fn missing_candidates_field_yields_nothing() {
        let payload = extract_payload(&parse(json!({})));
        assert!(payload.image.is_none());
    }

    #[test]
    fn contentless_candidates_are_tolerated() {
        let payload = extract_payload(&parse(json!({
            "candidates": [{}, {"content": {"parts": []}}]
        })));
        assert!(payload.image.is_none());
        assert!(payload.text.is_none());
    }

    #[test]
    fn text_only_response_keeps_the_text() {
        let payload = extract_payload(&parse(json!({
            "candidates": [{"content": {"parts": [{"text": "declined to render"}]}}]
        })));
        assert!(payload.image.is_none());
        assert_eq!(payload.text.as_deref(), Some("declined to render"));
    }

    #[test]
    fn unknown_response_fields_are_ignored() {
        let response = parse(json!({
            "candidates": [{
                "finishReason": "STOP",
                "safetyRatings": [],
                "content": {"parts": [{"text": "ok", "thought": false}]}
            }],
            "usageMetadata": {"totalTokenCount": 10}
        }));
        assert_eq!(extract_payload(&response).text.as_deref(), Some("ok"));
    }
}

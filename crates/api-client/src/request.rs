//! Generation request assembly.

use crate::resolution::{AspectRatio, Resolution};
use crate::wire::{
    Content, GenerateContentBody, GenerationConfig, ImageConfig, InlineBytes, InlineData, Part,
};

/// An image attached to a generation request, already encoded for the wire.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    /// Media type, e.g. `image/png`.
    pub mime_type: String,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

impl ImageAttachment {
    /// Attachment with an explicit media type.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// PNG attachment.
    pub fn png(data: Vec<u8>) -> Self {
        Self::new("image/png", data)
    }

    /// JPEG attachment.
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self::new("image/jpeg", data)
    }
}

/// A single generation call: the instruction block, the garment images, and
/// the output settings.
///
/// Built fresh per call and never mutated by the client; a revision pass is
/// just a new request carrying a note and the previous output as a reference.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    prompt: String,
    primary: ImageAttachment,
    references: Vec<ImageAttachment>,
    revision_note: Option<String>,
    aspect_ratio: AspectRatio,
    resolution: Resolution,
}

impl GenerationRequest {
    /// New request from an instruction block and the primary garment image.
    pub fn new(prompt: impl Into<String>, primary: ImageAttachment) -> Self {
        Self {
            prompt: prompt.into(),
            primary,
            references: Vec::new(),
            revision_note: None,
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
        }
    }

    /// Append a reference image. References follow the primary image in the
    /// order they were added.
    #[must_use]
    pub fn with_reference(mut self, reference: ImageAttachment) -> Self {
        self.references.push(reference);
        self
    }

    /// Set the output aspect ratio.
    #[must_use]
    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set the starting resolution tier.
    #[must_use]
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Append a correction note, sent as an `ONLY FIX:` section after the
    /// instruction block. Pair it with the previous output added via
    /// [`with_reference`](Self::with_reference).
    #[must_use]
    pub fn with_revision_note(mut self, note: impl Into<String>) -> Self {
        self.revision_note = Some(note.into());
        self
    }

    /// Starting resolution tier; the ladder descends from here.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Output aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Build the wire body for one ladder step.
    pub(crate) fn to_body(&self, resolution: Resolution) -> GenerateContentBody {
        let mut parts = vec![Part {
            text: Some(self.full_prompt()),
            inline_data: None,
        }];

        for attachment in std::iter::once(&self.primary).chain(&self.references) {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: attachment.mime_type.clone(),
                    data: InlineBytes::encode(&attachment.data),
                }),
            });
        }

        GenerateContentBody {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".into()],
                image_config: ImageConfig {
                    aspect_ratio: self.aspect_ratio,
                    image_size: resolution,
                },
            },
        }
    }

    fn full_prompt(&self) -> String {
        match &self.revision_note {
            Some(note) => format!("{}\nONLY FIX:\n{}", self.prompt, note),
            None => self.prompt.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest::new("render the garment", ImageAttachment::png(vec![1, 2, 3]))
            .with_aspect_ratio(AspectRatio::ThreeFour)
            .with_resolution(Resolution::TwoK)
    }

    #[test]
    fn body_matches_the_wire_shape() {
        let body = request().to_body(Resolution::TwoK);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "render the garment"},
                        {"inlineData": {"mimeType": "image/png", "data": BASE64.encode([1, 2, 3])}}
                    ]
                }],
                "generationConfig": {
                    "responseModalities": ["IMAGE"],
                    "imageConfig": {"aspectRatio": "3:4", "imageSize": "2K"}
                }
            })
        );
    }

    #[test]
    fn ladder_step_overrides_the_requested_tier() {
        let body = request().to_body(Resolution::OneK);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value["generationConfig"]["imageConfig"]["imageSize"],
            json!("1K")
        );
    }

    #[test]
    fn references_follow_the_primary_in_order() {
        let body = request()
            .with_reference(ImageAttachment::jpeg(vec![4]))
            .with_reference(ImageAttachment::jpeg(vec![5]))
            .to_body(Resolution::TwoK);

        let parts = &body.contents[0].parts;
        assert_eq!(parts.len(), 4);
        assert!(parts[0].text.is_some());
        let mimes: Vec<_> = parts[1..]
            .iter()
            .map(|p| p.inline_data.as_ref().unwrap().mime_type.as_str())
            .collect();
        assert_eq!(mimes, ["image/png", "image/jpeg", "image/jpeg"]);
    }

    #[test]
    fn revision_note_is_appended_to_the_prompt() {
        let body = request()
            .with_revision_note("sleeve length is wrong")
            .to_body(Resolution::TwoK);

        let text = body.contents[0].parts[0].text.as_deref().unwrap();
        assert_eq!(
            text,
            "render the garment\nONLY FIX:\nsleeve length is wrong"
        );
    }

    #[test]
    fn defaults_are_portrait_2k() {
        let request = GenerationRequest::new("x", ImageAttachment::png(vec![]));
        assert_eq!(request.resolution(), Resolution::TwoK);
        assert_eq!(request.aspect_ratio(), AspectRatio::ThreeFour);
    }
}

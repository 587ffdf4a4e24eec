use base64::Engine as _;
use bytes::Bytes;
use serde_json::Value;
use tracing::{info, warn};

use super::core::StudioClient;
use super::policy::Decision;
use crate::error_kind::ErrorKind;
use crate::types::{GeneratedImage, ImageConfig, OperationOutcome};

const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/png";

impl StudioClient {
    /// Single-shot image generation.
    ///
    /// A provider failure classified as `ProviderUnavailable` is retried once
    /// after the configured delay; every other failure is returned as is.
    pub async fn generate_image<S: AsRef<str>>(
        &self,
        prompt: &str,
        config: &ImageConfig,
        reference_images: &[S],
    ) -> OperationOutcome<GeneratedImage> {
        let credential = match self.credential("generate_image") {
            Ok(c) => c,
            Err(kind) => return OperationOutcome::Failure(kind),
        };
        let request = self.requests.build_image(prompt, config, reference_images);

        let mut attempt: u32 = 0;
        loop {
            let kind = match self.provider.generate_content(&request, &credential).await {
                Ok(body) => {
                    return match extract_image(&body) {
                        Ok(image) => {
                            info!(
                                model = %request.model,
                                media_type = %image.media_type,
                                bytes = image.bytes.len(),
                                "image generated"
                            );
                            OperationOutcome::Success(image)
                        }
                        Err(kind) => {
                            warn!(model = %request.model, code = kind.code(), kind = kind.name(), "image response rejected");
                            OperationOutcome::Failure(kind)
                        }
                    };
                }
                Err(e) => self.settle("generate_image", e),
            };

            match self.retry.decide(&kind, attempt) {
                Decision::Retry { delay } => {
                    info!(attempt, delay_ms = delay.as_millis() as u64, "retrying image generation");
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Decision::Fail => return OperationOutcome::Failure(kind),
            }
        }
    }
}

/// Validate the response shape in order: a candidate, content parts, inline bytes.
pub(crate) fn extract_image(body: &Value) -> std::result::Result<GeneratedImage, ErrorKind> {
    let candidate = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or(ErrorKind::NoCandidates)?;

    let parts = candidate
        .pointer("/content/parts")
        .and_then(|p| p.as_array())
        .filter(|p| !p.is_empty())
        .ok_or(ErrorKind::BlockedOrEmpty)?;

    let inline = parts
        .iter()
        .filter_map(|p| p.get("inlineData"))
        .find(|d| d.get("data").and_then(|v| v.as_str()).is_some_and(|s| !s.is_empty()))
        .ok_or(ErrorKind::NoImageData)?;

    let data = inline.get("data").and_then(|v| v.as_str()).unwrap_or_default();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|_| ErrorKind::NoImageData)?;
    let media_type = inline
        .get("mimeType")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IMAGE_MEDIA_TYPE)
        .to_string();

    Ok(GeneratedImage {
        media_type,
        bytes: Bytes::from(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shape_violations_are_distinct() {
        assert_eq!(extract_image(&json!({})), Err(ErrorKind::NoCandidates));
        assert_eq!(
            extract_image(&json!({ "candidates": [] })),
            Err(ErrorKind::NoCandidates)
        );
        assert_eq!(
            extract_image(&json!({ "candidates": [{ "finishReason": "SAFETY" }] })),
            Err(ErrorKind::BlockedOrEmpty)
        );
        assert_eq!(
            extract_image(&json!({ "candidates": [{ "content": { "parts": [] } }] })),
            Err(ErrorKind::BlockedOrEmpty)
        );
        assert_eq!(
            extract_image(&json!({ "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }] })),
            Err(ErrorKind::NoImageData)
        );
    }

    #[test]
    fn decodes_first_inline_part() {
        let body = json!({ "candidates": [{ "content": { "parts": [
            { "text": "Here you go" },
            { "inlineData": { "mimeType": "image/jpeg", "data": "aGVsbG8=" } }
        ]}}]});
        let image = extract_image(&body).unwrap();
        assert_eq!(image.media_type, "image/jpeg");
        assert_eq!(&image.bytes[..], b"hello");
    }

    #[test]
    fn undecodable_payload_is_no_image_data() {
        let body = json!({ "candidates": [{ "content": { "parts": [
            { "inlineData": { "mimeType": "image/png", "data": "***" } }
        ]}}]});
        assert_eq!(extract_image(&body), Err(ErrorKind::NoImageData));
    }
}

//! Provider request assembly.
//!
//! Pure data transformation from user inputs to Gemini REST bodies. Nothing
//! here touches the network, reads the clock or draws random numbers, so two
//! calls with identical inputs produce identical requests.
//!
//! | Builder | Endpoint | Tier rules |
//! |---------|----------|------------|
//! | [`RequestBuilder::build_chat`] | `generateContent` | search tool and system instruction from [`ChatOptions`] |
//! | [`RequestBuilder::build_image`] | `generateContent` | `high` adds search and `imageSize` |
//! | [`RequestBuilder::build_video`] | `predictLongRunning` | >1 reference forces 16:9 / 720p, max 3 references |

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::{ModelCatalog, DEFAULT_SYSTEM_INSTRUCTION};
use crate::types::{
    AspectRatio, ChatTurn, ImageConfig, QualityTier, ReferenceImage, VideoConfig, VideoResolution,
};

/// Prompt sent when the user attaches an image to chat without any text.
pub const DESCRIBE_IMAGE_PROMPT: &str = "Describe this image";

/// At most this many reference images reach the multi-reference video path.
pub const MAX_VIDEO_REFERENCES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOperation {
    /// Single-shot `generateContent` (chat, image).
    GenerateContent,
    /// Long-running `predictLongRunning` (video).
    GenerateVideos,
}

/// A fully assembled provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub operation: ProviderOperation,
    pub model: String,
    pub body: Value,
}

/// Per-call chat settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub system_instruction: Option<String>,
    /// Attach the web-search grounding tool.
    pub search: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            system_instruction: Some(DEFAULT_SYSTEM_INSTRUCTION.to_string()),
            search: true,
        }
    }
}

impl ChatOptions {
    pub fn plain() -> Self {
        Self {
            system_instruction: None,
            search: false,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_search(mut self, search: bool) -> Self {
        self.search = search;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    models: ModelCatalog,
}

impl RequestBuilder {
    pub fn new(models: ModelCatalog) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &ModelCatalog {
        &self.models
    }

    pub fn build_chat(
        &self,
        prompt: &str,
        history: &[ChatTurn],
        reference_image: Option<&str>,
        options: &ChatOptions,
    ) -> ProviderRequest {
        let mut contents: Vec<Value> = history
            .iter()
            .map(|turn| {
                json!({
                    "role": turn.role.wire_name(),
                    "parts": [{ "text": turn.content }],
                })
            })
            .collect();

        let image = reference_image.and_then(decode_reference);
        let text = if prompt.trim().is_empty() && image.is_some() {
            DESCRIBE_IMAGE_PROMPT
        } else {
            prompt
        };
        let mut parts = vec![json!({ "text": text })];
        parts.extend(image.iter().map(inline_part));
        contents.push(json!({ "role": "user", "parts": parts }));

        let mut body = Map::new();
        body.insert("contents".into(), Value::Array(contents));
        if let Some(instruction) = &options.system_instruction {
            body.insert(
                "systemInstruction".into(),
                json!({ "parts": [{ "text": instruction }] }),
            );
        }
        if options.search {
            body.insert("tools".into(), search_tools());
        }

        ProviderRequest {
            operation: ProviderOperation::GenerateContent,
            model: self.models.chat.clone(),
            body: Value::Object(body),
        }
    }

    pub fn build_image<S: AsRef<str>>(
        &self,
        prompt: &str,
        config: &ImageConfig,
        reference_images: &[S],
    ) -> ProviderRequest {
        let high = config.quality == QualityTier::High;

        let mut parts = vec![json!({ "text": prompt })];
        parts.extend(decode_all(reference_images).iter().map(inline_part));

        let mut image_config = Map::new();
        image_config.insert("aspectRatio".into(), json!(config.aspect_ratio.as_str()));
        if high {
            image_config.insert("imageSize".into(), json!(config.image_size.as_str()));
        }

        let mut body = Map::new();
        body.insert("contents".into(), json!([{ "parts": parts }]));
        body.insert(
            "generationConfig".into(),
            json!({ "imageConfig": Value::Object(image_config) }),
        );
        if high {
            body.insert("tools".into(), search_tools());
        }

        let model = if high {
            &self.models.image_high
        } else {
            &self.models.image_standard
        };
        ProviderRequest {
            operation: ProviderOperation::GenerateContent,
            model: model.clone(),
            body: Value::Object(body),
        }
    }

    /// Zero references: text-to-video with the caller's settings. One: the
    /// single-image animation path, settings honored. More: the
    /// multi-reference path, pinned to 16:9 / 720p.
    pub fn build_video<S: AsRef<str>>(
        &self,
        prompt: &str,
        config: &VideoConfig,
        reference_images: &[S],
    ) -> ProviderRequest {
        let images = decode_all(reference_images);

        let mut instance = Map::new();
        instance.insert("prompt".into(), json!(prompt));

        // The path follows how many references the caller supplied; malformed
        // ones are still left out of the body.
        let (model, aspect_ratio, resolution) = if reference_images.len() > 1 {
            if images.len() > MAX_VIDEO_REFERENCES {
                debug!(
                    supplied = images.len(),
                    kept = MAX_VIDEO_REFERENCES,
                    "extra video reference images ignored"
                );
            }
            let references: Vec<Value> = images
                .iter()
                .take(MAX_VIDEO_REFERENCES)
                .map(|img| json!({ "image": video_image(img), "referenceType": "asset" }))
                .collect();
            if !references.is_empty() {
                instance.insert("referenceImages".into(), Value::Array(references));
            }
            (
                &self.models.video_reference,
                AspectRatio::Landscape16x9,
                VideoResolution::P720,
            )
        } else {
            if let Some(single) = images.first() {
                instance.insert("image".into(), video_image(single));
            }
            (&self.models.video_fast, config.aspect_ratio, config.resolution)
        };

        ProviderRequest {
            operation: ProviderOperation::GenerateVideos,
            model: model.clone(),
            body: json!({
                "instances": [Value::Object(instance)],
                "parameters": {
                    "aspectRatio": aspect_ratio.as_str(),
                    "resolution": resolution.as_str(),
                    "sampleCount": 1,
                },
            }),
        }
    }
}

fn decode_reference(encoded: &str) -> Option<ReferenceImage> {
    let image = ReferenceImage::from_data_url(encoded);
    if image.is_none() {
        debug!(len = encoded.len(), "dropping malformed reference image");
    }
    image
}

fn decode_all<S: AsRef<str>>(encoded: &[S]) -> Vec<ReferenceImage> {
    encoded
        .iter()
        .filter_map(|e| decode_reference(e.as_ref()))
        .collect()
}

fn inline_part(image: &ReferenceImage) -> Value {
    json!({ "inlineData": { "mimeType": image.media_type, "data": image.data } })
}

fn video_image(image: &ReferenceImage) -> Value {
    json!({ "bytesBase64Encoded": image.data, "mimeType": image.media_type })
}

fn search_tools() -> Value {
    json!([{ "googleSearch": {} }])
}

//! Generated artifacts and their archive records.

use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::config::{ImageConfig, VideoConfig};

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Decoded image returned by the image operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub media_type: String,
    pub bytes: Bytes,
}

impl GeneratedImage {
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Finished video fetched from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    /// Provider URI the bytes were fetched from (without credential).
    pub source_uri: String,
    pub media_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetConfig {
    Image(ImageConfig),
    Video(VideoConfig),
}

/// Immutable record of a completed generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAsset {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Where the content can be retrieved (file path or data URL).
    pub url: String,
    pub prompt: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AssetConfig>,
}

impl GeneratedAsset {
    pub fn image(url: impl Into<String>, prompt: impl Into<String>, config: ImageConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: AssetKind::Image,
            url: url.into(),
            prompt: prompt.into(),
            timestamp: now_millis(),
            config: Some(AssetConfig::Image(config)),
        }
    }

    pub fn video(url: impl Into<String>, prompt: impl Into<String>, config: VideoConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: AssetKind::Video,
            url: url.into(),
            prompt: prompt.into(),
            timestamp: now_millis(),
            config: Some(AssetConfig::Video(config)),
        }
    }
}

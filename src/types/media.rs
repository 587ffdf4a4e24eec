//! Encoded reference images.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A reference image split into its media type and base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub media_type: String,
    /// Base64 payload, exactly as it travels on the wire.
    pub data: String,
}

impl ReferenceImage {
    /// Decompose a `data:<media-type>;base64,<payload>` string.
    ///
    /// Returns `None` when the type/data separator or the media type is missing.
    pub fn from_data_url(encoded: &str) -> Option<Self> {
        let (header, payload) = encoded.split_once(',')?;
        let media_type = header
            .split(';')
            .next()
            .and_then(|h| h.split_once(':'))
            .map(|(_, mt)| mt.trim())
            .filter(|mt| !mt.is_empty())?;
        if payload.is_empty() {
            return None;
        }
        Some(Self {
            media_type: media_type.to_string(),
            data: payload.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8], media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let media_type = guess_media_type(path).unwrap_or("application/octet-stream");
        Ok(Self::from_bytes(&bytes, media_type))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

pub(crate) fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let mt = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(mt)
}

/// File extension for a generated artifact's media type.
pub fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        m if m.starts_with("video/") => "mp4",
        _ => "png",
    }
}

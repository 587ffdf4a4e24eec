//! Runtime configuration.
//!
//! Everything has a default; `STUDIO_*` environment variables override.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `STUDIO_BASE_URL` | `https://generativelanguage.googleapis.com` |
//! | `STUDIO_HTTP_TIMEOUT_SECS` | `60` |
//! | `STUDIO_PROXY_URL` | unset |
//! | `STUDIO_POLL_INTERVAL_SECS` | `10` |
//! | `STUDIO_POLL_MAX_WAIT_SECS` | unset (wait indefinitely) |
//! | `STUDIO_RETRY_DELAY_MS` | `2000` |
//! | `STUDIO_DATA_DIR` | `.studio` |
//! | `STUDIO_CREDENTIAL_STORE` | `file` (or `keyring`) |
//! | `STUDIO_CHAT_MODEL` | `gemini-3-pro-preview` |
//! | `STUDIO_IMAGE_MODEL` | `gemini-2.5-flash-image` |
//! | `STUDIO_IMAGE_PRO_MODEL` | `gemini-3-pro-image-preview` |
//! | `STUDIO_VIDEO_MODEL` | `veo-3.1-fast-generate-preview` |
//! | `STUDIO_VIDEO_REF_MODEL` | `veo-3.1-generate-preview` |

use std::path::PathBuf;
use std::time::Duration;

use crate::poll::PollConfig;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a professional creative director. Help the user brainstorm ideas.";

/// Provider model identifiers per rendering path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    pub chat: String,
    pub image_standard: String,
    pub image_high: String,
    /// Text-only and single-image video path.
    pub video_fast: String,
    /// Multi-reference video path.
    pub video_reference: String,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            chat: "gemini-3-pro-preview".into(),
            image_standard: "gemini-2.5-flash-image".into(),
            image_high: "gemini-3-pro-image-preview".into(),
            video_fast: "veo-3.1-fast-generate-preview".into(),
            video_reference: "veo-3.1-generate-preview".into(),
        }
    }
}

/// Where a saved API key is kept between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialBackend {
    /// `studio_api_key` entry under the data directory.
    #[default]
    File,
    /// OS keyring entry.
    Keyring,
}

impl CredentialBackend {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "file" => Some(Self::File),
            "keyring" => Some(Self::Keyring),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub base_url: String,
    pub http_timeout: Duration,
    pub proxy_url: Option<String>,
    pub models: ModelCatalog,
    pub poll: PollConfig,
    /// Delay before the single automatic image retry.
    pub retry_delay: Duration,
    /// Directory holding the local store entries and generated files.
    pub data_dir: PathBuf,
    pub credential_store: CredentialBackend,
    pub system_instruction: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(60),
            proxy_url: None,
            models: ModelCatalog::default(),
            poll: PollConfig::default(),
            retry_delay: Duration::from_millis(2_000),
            data_dir: PathBuf::from(".studio"),
            credential_store: CredentialBackend::File,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unparseable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secs = |key: &str| non_empty(key).and_then(|s| s.parse::<u64>().ok());

        if let Some(url) = non_empty("STUDIO_BASE_URL") {
            cfg.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(s) = secs("STUDIO_HTTP_TIMEOUT_SECS").filter(|s| *s > 0) {
            cfg.http_timeout = Duration::from_secs(s);
        }
        cfg.proxy_url = non_empty("STUDIO_PROXY_URL");
        if let Some(s) = secs("STUDIO_POLL_INTERVAL_SECS").filter(|s| *s > 0) {
            cfg.poll.interval = Duration::from_secs(s);
        }
        cfg.poll.max_wait = secs("STUDIO_POLL_MAX_WAIT_SECS")
            .filter(|s| *s > 0)
            .map(Duration::from_secs);
        if let Some(ms) = secs("STUDIO_RETRY_DELAY_MS") {
            cfg.retry_delay = Duration::from_millis(ms);
        }
        if let Some(dir) = non_empty("STUDIO_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) =
            non_empty("STUDIO_CREDENTIAL_STORE").and_then(|v| CredentialBackend::parse(&v))
        {
            cfg.credential_store = backend;
        }

        let models = &mut cfg.models;
        for (key, slot) in [
            ("STUDIO_CHAT_MODEL", &mut models.chat),
            ("STUDIO_IMAGE_MODEL", &mut models.image_standard),
            ("STUDIO_IMAGE_PRO_MODEL", &mut models.image_high),
            ("STUDIO_VIDEO_MODEL", &mut models.video_fast),
            ("STUDIO_VIDEO_REF_MODEL", &mut models.video_reference),
        ] {
            if let Some(v) = non_empty(key) {
                *slot = v;
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = StudioConfig::from_lookup(|_| None);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.poll.interval, Duration::from_secs(10));
        assert_eq!(cfg.poll.max_wait, None);
        assert_eq!(cfg.retry_delay, Duration::from_secs(2));
        assert_eq!(cfg.models, ModelCatalog::default());
        assert_eq!(cfg.credential_store, CredentialBackend::File);
    }

    #[test]
    fn credential_store_selection() {
        let cfg = StudioConfig::from_lookup(lookup(&[("STUDIO_CREDENTIAL_STORE", " Keyring ")]));
        assert_eq!(cfg.credential_store, CredentialBackend::Keyring);

        let cfg = StudioConfig::from_lookup(lookup(&[("STUDIO_CREDENTIAL_STORE", "vault")]));
        assert_eq!(cfg.credential_store, CredentialBackend::File);
    }

    #[test]
    fn env_overrides_and_bad_numbers() {
        let cfg = StudioConfig::from_lookup(lookup(&[
            ("STUDIO_BASE_URL", "http://localhost:4010/"),
            ("STUDIO_POLL_INTERVAL_SECS", "3"),
            ("STUDIO_POLL_MAX_WAIT_SECS", "600"),
            ("STUDIO_HTTP_TIMEOUT_SECS", "soon"),
            ("STUDIO_VIDEO_MODEL", "veo-test"),
        ]));
        assert_eq!(cfg.base_url, "http://localhost:4010");
        assert_eq!(cfg.poll.interval, Duration::from_secs(3));
        assert_eq!(cfg.poll.max_wait, Some(Duration::from_secs(600)));
        assert_eq!(cfg.http_timeout, Duration::from_secs(60));
        assert_eq!(cfg.models.video_fast, "veo-test");
    }
}

//! The provider contract the operations are written against.
//!
//! [`super::GeminiTransport`] speaks the real HTTP API; tests substitute a
//! scripted implementation.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::credentials::Credential;
use crate::request::ProviderRequest;
use crate::Result;

/// Snapshot of a long-running video job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoJob {
    /// Provider-assigned operation name (the job handle).
    pub name: String,
    pub done: bool,
    /// Download URI of the first generated video, once done.
    pub video_uri: Option<String>,
    /// Provider-reported failure of the job itself.
    pub error: Option<String>,
}

impl VideoJob {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            video_uri: None,
            error: None,
        }
    }

    /// Parse a long-running operation document.
    ///
    /// Accepts both the REST shape
    /// (`response.generateVideoResponse.generatedSamples[0].video.uri`) and the
    /// SDK shape (`response.generatedVideos[0].video.uri`).
    pub fn from_operation(op: &Value) -> Self {
        let name = op
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let done = op.get("done").and_then(|v| v.as_bool()).unwrap_or(false);
        let video_uri = op
            .pointer("/response/generateVideoResponse/generatedSamples/0/video/uri")
            .or_else(|| op.pointer("/response/generatedVideos/0/video/uri"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);
        let error = op.get("error").map(|e| {
            e.get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
                .unwrap_or_else(|| e.to_string())
        });
        Self {
            name,
            done,
            video_uri,
            error,
        }
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Single-shot content generation (chat and image). Returns the raw response body.
    async fn generate_content(
        &self,
        request: &ProviderRequest,
        credential: &Credential,
    ) -> Result<Value>;

    /// Submit a video render and return the initial job snapshot.
    async fn start_video_job(
        &self,
        request: &ProviderRequest,
        credential: &Credential,
    ) -> Result<VideoJob>;

    /// Re-query a video job by handle.
    async fn get_video_job(&self, job: &VideoJob, credential: &Credential) -> Result<VideoJob>;

    /// Fetch a finished artifact. The credential travels as a `key` query parameter.
    async fn fetch_artifact(&self, uri: &str, credential: &Credential) -> Result<Bytes>;
}

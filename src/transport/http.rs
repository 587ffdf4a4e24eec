use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Proxy;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::StudioConfig;
use crate::credentials::Credential;
use crate::request::{ProviderOperation, ProviderRequest};
use crate::{Error, ErrorContext, Result};

use super::provider::{Provider, VideoJob};
use super::TransportError;

const API_VERSION: &str = "v1beta";

/// HTTP transport for the Gemini REST API.
///
/// The credential is passed as the `key` query parameter on every call, never
/// as a bearer token; the artifact download endpoint accepts nothing else.
pub struct GeminiTransport {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(config: &StudioConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Some(std::time::Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy url: {}", e),
                    ErrorContext::new().with_field_path("STUDIO_PROXY_URL"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn model_url(&self, request: &ProviderRequest) -> String {
        let method = match request.operation {
            ProviderOperation::GenerateContent => "generateContent",
            ProviderOperation::GenerateVideos => "predictLongRunning",
        };
        format!(
            "{}/{}/models/{}:{}",
            self.base_url, API_VERSION, request.model, method
        )
    }

    async fn post_json(&self, url: &str, body: &Value, credential: &Credential) -> Result<Value> {
        let resp = self
            .client
            .post(url)
            .query(&[("key", credential.expose())])
            .json(body)
            .send()
            .await
            .map_err(http_error)?;
        let resp = ensure_success(resp).await?;
        resp.json().await.map_err(http_error)
    }

    async fn get_json(&self, url: &str, credential: &Credential) -> Result<Value> {
        let resp = self
            .client
            .get(url)
            .query(&[("key", credential.expose())])
            .send()
            .await
            .map_err(http_error)?;
        let resp = ensure_success(resp).await?;
        resp.json().await.map_err(http_error)
    }
}

/// Append the credential to an artifact URI as the `key` query parameter.
pub fn authorized_url(uri: &str, credential: &Credential) -> Result<Url> {
    let mut url = Url::parse(uri).map_err(|e| {
        Error::validation_with_context(
            format!("invalid artifact uri: {}", e),
            ErrorContext::new().with_source("fetch_artifact"),
        )
    })?;
    url.query_pairs_mut().append_pair("key", credential.expose());
    Ok(url)
}

fn http_error(e: reqwest::Error) -> Error {
    // The request URL carries the key; keep it out of messages.
    Error::Transport(TransportError::Http(e.without_url()))
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let (class, message) = parse_error_body(&body);
    debug!(http_status = status.as_u16(), error_class = class.as_str(), "provider returned error");
    Err(Error::Remote {
        status: status.as_u16(),
        class,
        message,
    })
}

/// Pull `error.status` / `error.message` out of a Google-style error document.
fn parse_error_body(body: &str) -> (String, String) {
    let json: Option<Value> = serde_json::from_str(body).ok();
    let error = json.as_ref().and_then(|j| j.get("error"));
    let class = error
        .and_then(|e| e.get("status"))
        .and_then(|s| s.as_str())
        .unwrap_or("http_error")
        .to_string();
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(String::from)
        .unwrap_or_else(|| body.trim().to_string());
    (class, message)
}

#[async_trait]
impl Provider for GeminiTransport {
    async fn generate_content(
        &self,
        request: &ProviderRequest,
        credential: &Credential,
    ) -> Result<Value> {
        let url = self.model_url(request);
        self.post_json(&url, &request.body, credential).await
    }

    async fn start_video_job(
        &self,
        request: &ProviderRequest,
        credential: &Credential,
    ) -> Result<VideoJob> {
        let url = self.model_url(request);
        let op = self.post_json(&url, &request.body, credential).await?;
        let job = VideoJob::from_operation(&op);
        if job.name.is_empty() && !job.done {
            return Err(Error::validation_with_context(
                "video operation response has no name",
                ErrorContext::new()
                    .with_field_path("operation.name")
                    .with_source("start_video_job"),
            ));
        }
        Ok(job)
    }

    async fn get_video_job(&self, job: &VideoJob, credential: &Credential) -> Result<VideoJob> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            API_VERSION,
            job.name.trim_start_matches('/')
        );
        let op = self.get_json(&url, credential).await?;
        let mut next = VideoJob::from_operation(&op);
        if next.name.is_empty() {
            next.name = job.name.clone();
        }
        Ok(next)
    }

    async fn fetch_artifact(&self, uri: &str, credential: &Credential) -> Result<Bytes> {
        let url = authorized_url(uri, credential)?;
        let resp = self.client.get(url).send().await.map_err(http_error)?;
        let resp = ensure_success(resp).await?;
        resp.bytes().await.map_err(http_error)
    }
}

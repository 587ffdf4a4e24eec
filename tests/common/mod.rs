//! Shared fixtures: a scripted provider and client wiring.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use creative_studio::credentials::{
    Credential, CredentialResolver, CredentialStore, MemoryCredentialStore,
};
use creative_studio::poll::RecordingSleeper;
use creative_studio::request::ProviderRequest;
use creative_studio::transport::{Provider, VideoJob};
use creative_studio::{Error, ErrorContext, Result, StudioClient, StudioConfig};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Provider that replays queued responses and records what it was asked.
#[derive(Default)]
pub struct ScriptedProvider {
    generate: Mutex<VecDeque<Result<Value>>>,
    start: Mutex<VecDeque<Result<VideoJob>>>,
    polls: Mutex<VecDeque<Result<VideoJob>>>,
    artifacts: Mutex<VecDeque<Result<Bytes>>>,
    pub requests: Mutex<Vec<ProviderRequest>>,
    pub keys_seen: Mutex<Vec<String>>,
    pub poll_count: Mutex<usize>,
    pub fetched: Mutex<Vec<String>>,
}

fn exhausted(what: &str) -> Error {
    Error::runtime_with_context(
        format!("no scripted {} left", what),
        ErrorContext::new().with_source("scripted_provider"),
    )
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_generate(self, r: Result<Value>) -> Self {
        self.generate.lock().unwrap().push_back(r);
        self
    }

    pub fn on_start(self, r: Result<VideoJob>) -> Self {
        self.start.lock().unwrap().push_back(r);
        self
    }

    pub fn on_poll(self, r: Result<VideoJob>) -> Self {
        self.polls.lock().unwrap().push_back(r);
        self
    }

    pub fn on_fetch(self, r: Result<Bytes>) -> Self {
        self.artifacts.lock().unwrap().push_back(r);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> ProviderRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    pub fn polls(&self) -> usize {
        *self.poll_count.lock().unwrap()
    }

    fn record(&self, request: &ProviderRequest, credential: &Credential) {
        self.requests.lock().unwrap().push(request.clone());
        self.keys_seen
            .lock()
            .unwrap()
            .push(credential.expose().to_string());
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn generate_content(
        &self,
        request: &ProviderRequest,
        credential: &Credential,
    ) -> Result<Value> {
        self.record(request, credential);
        self.generate
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("generate")))
    }

    async fn start_video_job(
        &self,
        request: &ProviderRequest,
        credential: &Credential,
    ) -> Result<VideoJob> {
        self.record(request, credential);
        self.start
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("start")))
    }

    async fn get_video_job(&self, _job: &VideoJob, _credential: &Credential) -> Result<VideoJob> {
        *self.poll_count.lock().unwrap() += 1;
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("poll")))
    }

    async fn fetch_artifact(&self, uri: &str, _credential: &Credential) -> Result<Bytes> {
        self.fetched.lock().unwrap().push(uri.to_string());
        self.artifacts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("artifact")))
    }
}

pub fn remote(status: u16, class: &str, message: &str) -> Error {
    Error::Remote {
        status,
        class: class.to_string(),
        message: message.to_string(),
    }
}

pub fn text_response(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

pub fn image_response(mime: &str, b64: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [
        { "inlineData": { "mimeType": mime, "data": b64 } }
    ]}}]})
}

pub fn done_job(name: &str, uri: Option<&str>) -> VideoJob {
    VideoJob {
        name: name.to_string(),
        done: true,
        video_uri: uri.map(String::from),
        error: None,
    }
}

/// Everything a scenario needs to inspect after running an operation.
pub struct Harness {
    pub client: StudioClient,
    pub provider: Arc<ScriptedProvider>,
    pub store: Arc<MemoryCredentialStore>,
    pub resolver: Arc<CredentialResolver>,
    pub sleeper: RecordingSleeper,
}

pub const PERSISTED_KEY: &str = "persisted-key";

pub fn harness(provider: ScriptedProvider) -> Harness {
    harness_with(provider, StudioConfig::default())
}

pub fn harness_with(provider: ScriptedProvider, config: StudioConfig) -> Harness {
    let store = Arc::new(MemoryCredentialStore::with_credential(Credential::new(
        PERSISTED_KEY,
    )));
    let store_dyn: Arc<dyn CredentialStore> = store.clone();
    let resolver = Arc::new(CredentialResolver::new(store_dyn));
    let provider = Arc::new(provider);
    let provider_dyn: Arc<dyn Provider> = provider.clone();
    let sleeper = RecordingSleeper::new();

    let client = StudioClient::builder()
        .config(config)
        .provider(provider_dyn)
        .credentials(resolver.clone())
        .sleeper(Arc::new(sleeper.clone()))
        .build()
        .expect("client builds with injected collaborators");

    Harness {
        client,
        provider,
        store,
        resolver,
        sleeper,
    }
}

use crate::client::error_classification::classify;
use crate::client::policy::RetryPolicy;
use crate::config::StudioConfig;
use crate::credentials::{Credential, CredentialResolver};
use crate::error_kind::ErrorKind;
use crate::poll::Sleeper;
use crate::request::{ChatOptions, RequestBuilder};
use crate::transport::Provider;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::warn;

/// Entry point for chat, image and video operations.
///
/// Every operation resolves to exactly one [`crate::OperationOutcome`]; raw
/// transport errors are classified here and never reach the caller.
pub struct StudioClient {
    pub(crate) config: StudioConfig,
    pub(crate) provider: Arc<dyn Provider>,
    pub(crate) credentials: Arc<CredentialResolver>,
    pub(crate) sleeper: Arc<dyn Sleeper>,
    pub(crate) requests: RequestBuilder,
    pub(crate) retry: RetryPolicy,
}

impl StudioClient {
    pub fn builder() -> crate::client::builder::StudioClientBuilder {
        crate::client::builder::StudioClientBuilder::new()
    }

    /// Client with every collaborator taken from the environment.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    pub fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    /// Chat options derived from the configured system instruction, search on.
    pub fn default_chat_options(&self) -> ChatOptions {
        ChatOptions::default().with_system_instruction(self.config.system_instruction.clone())
    }

    /// Classify a raw failure message and apply its side effects: a
    /// `CredentialInvalid` result discards the active credential.
    pub fn report_failure(&self, raw: &str) -> ErrorKind {
        let kind = classify(raw);
        if kind.invalidates_credential() {
            self.credentials.invalidate();
        }
        kind
    }

    pub(crate) fn credential(&self, operation: &'static str) -> std::result::Result<Credential, ErrorKind> {
        match self.credentials.resolve() {
            Ok(resolved) => Ok(resolved.credential),
            Err(kind) => {
                warn!(operation, code = kind.code(), "no credential available");
                Err(kind)
            }
        }
    }

    pub(crate) fn settle(&self, operation: &'static str, err: Error) -> ErrorKind {
        let raw = err.to_string();
        let kind = self.report_failure(&raw);
        warn!(
            operation,
            code = kind.code(),
            kind = kind.name(),
            http_status = err.status(),
            error = %raw,
            "operation failed"
        );
        kind
    }
}

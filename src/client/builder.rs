use crate::archive::LocalStore;
use crate::client::core::StudioClient;
use crate::client::policy::RetryPolicy;
use crate::config::{CredentialBackend, StudioConfig};
use crate::credentials::{
    CredentialResolver, CredentialStore, FileCredentialStore, KeyringCredentialStore,
};
use crate::poll::{tokio_sleeper, Sleeper};
use crate::request::RequestBuilder;
use crate::transport::{GeminiTransport, Provider};
use crate::Result;
use std::sync::Arc;

/// Builder for [`StudioClient`].
///
/// Every collaborator has a production default; tests inject a scripted
/// provider, an instant sleeper and an in-memory credential store.
pub struct StudioClientBuilder {
    config: Option<StudioConfig>,
    provider: Option<Arc<dyn Provider>>,
    credentials: Option<Arc<CredentialResolver>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl StudioClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            provider: None,
            credentials: None,
            sleeper: None,
        }
    }

    /// Use this configuration instead of reading `STUDIO_*` variables.
    pub fn config(mut self, config: StudioConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the HTTP transport.
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Share a credential resolver (e.g. with a settings screen).
    pub fn credentials(mut self, credentials: Arc<CredentialResolver>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Build the client.
    ///
    /// Without an injected resolver the persisted credential lives where
    /// `config.credential_store` says (the `studio_api_key` entry under the data
    /// directory, or the OS keyring), with `GEMINI_API_KEY` / `API_KEY` as the
    /// ambient fallback.
    pub fn build(self) -> Result<StudioClient> {
        let config = self.config.unwrap_or_else(StudioConfig::from_env);

        let provider: Arc<dyn Provider> = match self.provider {
            Some(p) => p,
            None => Arc::new(GeminiTransport::new(&config)?),
        };

        let credentials = match self.credentials {
            Some(c) => c,
            None => Arc::new(CredentialResolver::from_env(credential_store(&config)?)),
        };

        Ok(StudioClient {
            requests: RequestBuilder::new(config.models.clone()),
            retry: RetryPolicy::single(config.retry_delay),
            sleeper: self.sleeper.unwrap_or_else(tokio_sleeper),
            provider,
            credentials,
            config,
        })
    }
}

fn credential_store(config: &StudioConfig) -> Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match config.credential_store {
        CredentialBackend::File => {
            Arc::new(FileCredentialStore::new(LocalStore::open(&config.data_dir)?))
        }
        CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::studio()?),
    };
    Ok(store)
}

impl Default for StudioClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

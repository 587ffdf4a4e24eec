//! Where a user-supplied credential outlives the session.

use keyring::Entry;
use std::sync::RwLock;

use super::Credential;
use crate::archive::{LocalStore, CREDENTIAL_KEY};
use crate::{Error, ErrorContext, Result};

/// Persistent slot for at most one credential.
///
/// `clear` must be idempotent: clearing an empty store succeeds.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>>;
    fn save(&self, credential: &Credential) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Process-lifetime store; useful for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

fn poisoned() -> Error {
    Error::storage_with_context(
        "credential store lock poisoned",
        ErrorContext::new().with_source("memory_credential_store"),
    )
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.slot.read().map_err(|_| poisoned())?.clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.slot.write().map_err(|_| poisoned())? = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.write().map_err(|_| poisoned())? = None;
        Ok(())
    }
}

/// The `studio_api_key` entry of the local store.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    store: LocalStore,
}

impl FileCredentialStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self
            .store
            .get(CREDENTIAL_KEY)?
            .and_then(|raw| Credential::parse(&raw)))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        self.store.set(CREDENTIAL_KEY, credential.expose())
    }

    fn clear(&self) -> Result<()> {
        self.store.remove(CREDENTIAL_KEY)
    }
}

/// OS keyring entry (`service`/`user` pair).
pub struct KeyringCredentialStore {
    entry: Entry,
}

pub const KEYRING_SERVICE: &str = "creative-studio";
pub const KEYRING_USER: &str = "gemini";

impl KeyringCredentialStore {
    pub fn new(service: &str, user: &str) -> Result<Self> {
        let entry = Entry::new(service, user).map_err(keyring_error)?;
        Ok(Self { entry })
    }

    /// The entry the studio uses by default.
    pub fn studio() -> Result<Self> {
        Self::new(KEYRING_SERVICE, KEYRING_USER)
    }
}

fn keyring_error(e: keyring::Error) -> Error {
    Error::storage_with_context(
        e.to_string(),
        ErrorContext::new().with_source("keyring_credential_store"),
    )
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        match self.entry.get_password() {
            Ok(raw) => Ok(Credential::parse(&raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(e)),
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        self.entry
            .set_password(credential.expose())
            .map_err(keyring_error)
    }

    fn clear(&self) -> Result<()> {
        match self.entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(e)),
        }
    }
}

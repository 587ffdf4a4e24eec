//! Credential resolution.
//!
//! One explicit resolver decides which API key a request presents:
//!
//! 1. a session override (pasted by the user for this run),
//! 2. a persisted credential from an earlier run ([`CredentialStore`]),
//! 3. the ambient default from the environment (`GEMINI_API_KEY`, then `API_KEY`).
//!
//! The first present source wins. With none present, resolution fails with
//! [`ErrorKind::NoCredential`] and the caller must ask the user; there is no
//! automatic retry.
//!
//! ```rust
//! use creative_studio::credentials::{
//!     Credential, CredentialResolver, CredentialSource, MemoryCredentialStore,
//! };
//! use std::sync::Arc;
//!
//! let resolver = CredentialResolver::new(Arc::new(MemoryCredentialStore::new()))
//!     .with_ambient(Some(Credential::new("env-key")));
//! assert_eq!(resolver.resolve().unwrap().source, CredentialSource::Ambient);
//!
//! resolver.save("pasted-key", false).unwrap();
//! assert_eq!(resolver.resolve().unwrap().source, CredentialSource::Session);
//! ```

mod store;

pub use store::{CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore};

use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::error_kind::ErrorKind;
use crate::{Error, ErrorContext, Result};

const AMBIENT_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Opaque API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Trimmed token, or `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        if t.is_empty() {
            None
        } else {
            Some(Self(t.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Session,
    Persisted,
    Ambient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub credential: Credential,
    pub source: CredentialSource,
}

pub struct CredentialResolver {
    session: RwLock<Option<Credential>>,
    store: Arc<dyn CredentialStore>,
    ambient: Option<Credential>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            session: RwLock::new(None),
            store,
            ambient: None,
        }
    }

    /// Resolver whose ambient default comes from the process environment.
    pub fn from_env(store: Arc<dyn CredentialStore>) -> Self {
        Self::new(store).with_ambient(ambient_from_lookup(|k| std::env::var(k).ok()))
    }

    pub fn with_ambient(mut self, ambient: Option<Credential>) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn resolve(&self) -> std::result::Result<ResolvedCredential, ErrorKind> {
        if let Some(credential) = self.session() {
            return Ok(ResolvedCredential {
                credential,
                source: CredentialSource::Session,
            });
        }

        match self.store.load() {
            Ok(Some(credential)) => {
                return Ok(ResolvedCredential {
                    credential,
                    source: CredentialSource::Persisted,
                })
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "credential store unreadable, skipping"),
        }

        self.ambient
            .clone()
            .map(|credential| ResolvedCredential {
                credential,
                source: CredentialSource::Ambient,
            })
            .ok_or(ErrorKind::NoCredential)
    }

    fn session(&self) -> Option<Credential> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    pub fn set_session(&self, credential: Option<Credential>) {
        if let Ok(mut slot) = self.session.write() {
            *slot = credential;
        }
    }

    /// Explicit user save: becomes the session override and, if asked, is persisted.
    pub fn save(&self, raw: &str, persist: bool) -> Result<Credential> {
        let credential = Credential::parse(raw).ok_or_else(|| {
            Error::validation_with_context(
                "credential must not be empty",
                ErrorContext::new().with_source("credential_resolver"),
            )
        })?;
        if persist {
            self.store.save(&credential)?;
        }
        self.set_session(Some(credential.clone()));
        info!(persisted = persist, "credential saved");
        Ok(credential)
    }

    /// Remove the persisted credential. Safe to call repeatedly.
    pub fn discard_persisted(&self) -> Result<()> {
        self.store.clear()
    }

    /// React to a `CredentialInvalid` classification: drop the session override
    /// and the persisted entry so the next resolution cannot reuse a dead key.
    pub fn invalidate(&self) {
        self.set_session(None);
        if let Err(e) = self.discard_persisted() {
            warn!(error = %e, "failed to discard persisted credential");
        }
        warn!("credential invalidated; user must re-enter an API key");
    }
}

/// Ambient default from an arbitrary variable source.
pub fn ambient_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Credential> {
    AMBIENT_VARS
        .iter()
        .find_map(|k| lookup(k).and_then(|v| Credential::parse(&v)))
}

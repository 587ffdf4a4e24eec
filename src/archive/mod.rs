//! Local persistence: a directory-backed key/value store plus the two
//! collections kept in it (chat sessions and the generated-asset archive).
//!
//! | Entry | Contents |
//! |-------|----------|
//! | `studio_sessions` | JSON array of [`ChatSession`] |
//! | `studio_assets` | JSON array of [`crate::types::GeneratedAsset`], newest first |
//! | `studio_api_key` | raw credential saved by the user |
//!
//! Entries carry no schema version; an unreadable entry is reported as a
//! serialization error rather than silently reset.

mod assets;
mod sessions;

pub use assets::AssetArchive;
pub use sessions::{ChatMessage, ChatSession, SessionList};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, ErrorContext, Result};

pub const SESSIONS_KEY: &str = "studio_sessions";
pub const ASSETS_KEY: &str = "studio_assets";
pub const CREDENTIAL_KEY: &str = "studio_api_key";

/// One file per key under a data directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(Error::validation_with_context(
                format!("invalid store key '{}'", key),
                ErrorContext::new().with_source("local_store"),
            ));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a sibling temp file and rename, so readers never see a torn entry.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Removing a missing entry is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::LocalStore;
    use tempfile::TempDir;

    /// Store over a scratch directory; keep the `TempDir` alive for the test.
    pub fn temp_store() -> (TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        (dir, store)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::temp_store;
    use super::*;

    #[test]
    fn set_get_remove() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get("studio_api_key").unwrap(), None);
        store.set("studio_api_key", "abc").unwrap();
        assert_eq!(store.get("studio_api_key").unwrap().as_deref(), Some("abc"));
        store.remove("studio_api_key").unwrap();
        store.remove("studio_api_key").unwrap();
        assert_eq!(store.get("studio_api_key").unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let (_dir, store) = temp_store();
        assert!(store.get("../etc/passwd").is_err());
        assert!(store.set("Upper", "x").is_err());
    }

    #[test]
    fn corrupt_json_is_an_error() {
        let (_dir, store) = temp_store();
        store.set(ASSETS_KEY, "{not json").unwrap();
        let r: Result<Option<Vec<u8>>> = store.get_json(ASSETS_KEY);
        assert!(matches!(r, Err(Error::Serialization(_))));
    }

    #[test]
    fn scratch_store_leaves_nothing_behind() {
        let (dir, store) = temp_store();
        store.set(SESSIONS_KEY, "[]").unwrap();
        let root = store.dir().to_path_buf();
        assert!(root.join("studio_sessions.json").exists());

        drop(dir);
        assert!(!root.exists());
    }
}

//! Credential resolution order and discard semantics.

use creative_studio::archive::LocalStore;
use creative_studio::config::CredentialBackend;
use creative_studio::credentials::{
    Credential, CredentialResolver, CredentialSource, CredentialStore, FileCredentialStore,
    MemoryCredentialStore,
};
use creative_studio::{ErrorKind, StudioClient, StudioConfig};
use std::sync::Arc;

fn resolver(persisted: Option<&str>, ambient: Option<&str>) -> CredentialResolver {
    let store = match persisted {
        Some(k) => MemoryCredentialStore::with_credential(Credential::new(k)),
        None => MemoryCredentialStore::new(),
    };
    CredentialResolver::new(Arc::new(store)).with_ambient(ambient.map(Credential::new))
}

#[test]
fn test_resolution_priority_over_all_states() {
    let cases: &[(Option<&str>, Option<&str>, Option<&str>, Option<(CredentialSource, &str)>)] = &[
        (None, None, None, None),
        (None, None, Some("amb"), Some((CredentialSource::Ambient, "amb"))),
        (None, Some("per"), None, Some((CredentialSource::Persisted, "per"))),
        (None, Some("per"), Some("amb"), Some((CredentialSource::Persisted, "per"))),
        (Some("ses"), None, None, Some((CredentialSource::Session, "ses"))),
        (Some("ses"), None, Some("amb"), Some((CredentialSource::Session, "ses"))),
        (Some("ses"), Some("per"), Some("amb"), Some((CredentialSource::Session, "ses"))),
    ];

    for (session, persisted, ambient, expected) in cases {
        let r = resolver(*persisted, *ambient);
        if let Some(s) = session {
            r.save(s, false).unwrap();
        }
        let got = r
            .resolve()
            .map(|c| (c.source, c.credential.expose().to_string()));
        match expected {
            Some((source, key)) => assert_eq!(
                got,
                Ok((*source, key.to_string())),
                "session={:?} persisted={:?} ambient={:?}",
                session,
                persisted,
                ambient
            ),
            None => assert_eq!(got, Err(ErrorKind::NoCredential)),
        }
    }
}

#[test]
fn test_discard_is_idempotent() {
    let r = resolver(Some("per"), Some("amb"));
    r.discard_persisted().unwrap();
    r.discard_persisted().unwrap();
    assert_eq!(r.resolve().unwrap().source, CredentialSource::Ambient);

    let empty = resolver(None, None);
    empty.discard_persisted().unwrap();
    empty.invalidate();
    empty.invalidate();
    assert_eq!(empty.resolve(), Err(ErrorKind::NoCredential));
}

#[test]
fn test_invalidate_keeps_ambient_fallback() {
    let r = resolver(Some("per"), Some("amb"));
    r.save("ses", true).unwrap();
    r.invalidate();
    let resolved = r.resolve().unwrap();
    assert_eq!(resolved.source, CredentialSource::Ambient);
    assert_eq!(resolved.credential.expose(), "amb");
}

#[test]
fn test_save_persists_when_asked() {
    let store = Arc::new(MemoryCredentialStore::new());
    let r = CredentialResolver::new(store.clone());

    r.save("  pasted \n", false).unwrap();
    assert_eq!(store.load().unwrap(), None);

    r.save("pasted", true).unwrap();
    assert_eq!(store.load().unwrap(), Some(Credential::new("pasted")));
    assert!(r.save("   ", true).is_err());
}

#[test]
fn test_file_store_survives_a_new_resolver() {
    let dir = tempfile::tempdir().unwrap();
    let local = LocalStore::open(dir.path()).unwrap();

    let first = CredentialResolver::new(Arc::new(FileCredentialStore::new(local.clone())));
    first.save("AIza-from-disk", true).unwrap();

    let second = CredentialResolver::new(Arc::new(FileCredentialStore::new(local)));
    let resolved = second.resolve().unwrap();
    assert_eq!(resolved.source, CredentialSource::Persisted);
    assert_eq!(resolved.credential.expose(), "AIza-from-disk");

    second.invalidate();
    assert_eq!(second.resolve(), Err(ErrorKind::NoCredential));
    assert!(!dir.path().join("studio_api_key.json").exists());
}

#[test]
fn test_builder_persists_to_keyring_when_configured() {
    keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
    let config = StudioConfig {
        credential_store: CredentialBackend::Keyring,
        ..StudioConfig::default()
    };
    let client = StudioClient::builder().config(config).build().unwrap();
    let creds = client.credentials();

    creds.save("AIza-keyring", true).unwrap();
    creds.set_session(None);
    let resolved = creds.resolve().unwrap();
    assert_eq!(resolved.source, CredentialSource::Persisted);
    assert_eq!(resolved.credential.expose(), "AIza-keyring");

    creds.invalidate();
    creds.discard_persisted().unwrap();
    assert_ne!(
        creds.resolve().map(|r| r.source),
        Ok(CredentialSource::Persisted)
    );
}

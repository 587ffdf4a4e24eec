//! Tests for error classification logic

use creative_studio::client::{classify, extract_retry_hint};
use creative_studio::{Error, ErrorKind, Remediation};
use std::time::Duration;

fn surround(needle: &str) -> Vec<String> {
    vec![
        needle.to_string(),
        needle.to_uppercase(),
        format!("Error: {} while calling the model", needle),
        format!("{{\"error\":{{\"message\":\"xx{}yy\"}}}}", needle),
    ]
}

#[test]
fn test_permission_and_403_are_entitlement() {
    for needle in ["permission", "Permission", "403"] {
        for msg in surround(needle) {
            assert_eq!(
                classify(&msg),
                ErrorKind::InsufficientEntitlement,
                "message '{}'",
                msg
            );
        }
    }
}

#[test]
fn test_quota_429_exhausted_are_rate_limited() {
    for needle in ["quota", "429", "exhausted", "EXHAUSTED", "Quota"] {
        for msg in surround(needle) {
            assert!(
                matches!(classify(&msg), ErrorKind::RateLimited { .. }),
                "message '{}'",
                msg
            );
        }
    }
}

#[test]
fn test_retry_hint_extraction() {
    let kind = classify("429 Too Many Requests: quota exceeded, retry in 15s");
    assert_eq!(
        kind,
        ErrorKind::RateLimited {
            retry_after: extract_retry_hint("in 15s")
        }
    );
    let hint = extract_retry_hint("Please retry in 15s.").unwrap();
    assert_eq!(hint.as_str(), "in 15s");
    assert_eq!(hint.delay(), Some(Duration::from_secs(15)));

    let hint = extract_retry_hint("Quota resets after 14:30 UTC").unwrap();
    assert_eq!(hint.as_str(), "after 14:30 UTC");
    assert_eq!(hint.delay(), None);

    // a hint too large for a Duration still classifies, just without a delay
    match classify("Quota exceeded. Please retry in 99999999999999999999h.") {
        ErrorKind::RateLimited { retry_after: Some(hint) } => {
            assert_eq!(hint.as_str(), "in 99999999999999999999h");
            assert_eq!(hint.delay(), None);
        }
        other => panic!("expected RateLimited with hint, got {:?}", other),
    }

    // no hint is a normal outcome
    assert_eq!(
        classify("RESOURCE_EXHAUSTED"),
        ErrorKind::RateLimited { retry_after: None }
    );
}

#[test]
fn test_precedence_order() {
    // not-found beats permission
    assert_eq!(
        classify("Requested entity was not found. (permission check skipped)"),
        ErrorKind::CredentialInvalid
    );
    // permission beats quota
    assert_eq!(
        classify("403: permission denied for quota project"),
        ErrorKind::InsufficientEntitlement
    );
    // quota beats overload
    assert!(matches!(
        classify("503 overloaded, quota exhausted"),
        ErrorKind::RateLimited { .. }
    ));
    assert_eq!(classify("The model is overloaded"), ErrorKind::ProviderUnavailable);
}

#[test]
fn test_unclassified_keeps_message_verbatim() {
    let raw = "Something odd: prompt contained unsupported characters";
    assert_eq!(
        classify(raw),
        ErrorKind::Unclassified {
            message: raw.to_string()
        }
    );
    assert_eq!(
        classify(raw).remediation(),
        Remediation::ShowMessage(raw.to_string())
    );
}

#[test]
fn test_remote_error_display_feeds_classifier() {
    let cases = [
        (400, "INVALID_ARGUMENT", "API key not valid. Please pass a valid API key.", ErrorKind::CredentialInvalid),
        (403, "PERMISSION_DENIED", "The caller does not have permission", ErrorKind::InsufficientEntitlement),
        (503, "UNAVAILABLE", "The service is currently unavailable.", ErrorKind::ProviderUnavailable),
    ];
    for (status, class, message, expected) in cases {
        let err = Error::Remote {
            status,
            class: class.to_string(),
            message: message.to_string(),
        };
        assert_eq!(classify(&err.to_string()), expected);
    }
}

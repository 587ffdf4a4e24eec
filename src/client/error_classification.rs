//! Error classification logic
//!
//! Maps raw provider failure text onto the closed [`ErrorKind`] taxonomy.
//! Matching is case-insensitive and first-match-wins in a fixed order, since a
//! single provider message often mentions several conditions at once.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error_kind::{ErrorKind, RetryHint};

const CREDENTIAL_INVALID: &[&str] = &[
    "requested entity was not found",
    "api key not valid",
    "api_key_invalid",
];
const ENTITLEMENT: &[&str] = &["permission", "403", "denied"];
const RATE_LIMITED: &[&str] = &["quota", "429", "exhausted", "rate limit"];
const UNAVAILABLE: &[&str] = &["500", "503", "internal", "overloaded", "unavailable"];

static RETRY_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:in\s+\d+(?:\.\d+)?\s*(?:ms|milliseconds?|s|secs?|seconds?|m|mins?|minutes?|h|hrs?|hours?)\b|after\s+\d{1,2}:\d{2}(?::\d{2})?(?:\s*(?:am|pm))?(?:\s*(?:utc|gmt))?)",
    )
    .expect("retry hint pattern is valid")
});

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a raw failure message.
pub fn classify(raw: &str) -> ErrorKind {
    let lower = raw.to_lowercase();

    if contains_any(&lower, CREDENTIAL_INVALID) {
        return ErrorKind::CredentialInvalid;
    }
    if contains_any(&lower, ENTITLEMENT) {
        return ErrorKind::InsufficientEntitlement;
    }
    if contains_any(&lower, RATE_LIMITED) {
        return ErrorKind::RateLimited {
            retry_after: extract_retry_hint(raw),
        };
    }
    if contains_any(&lower, UNAVAILABLE) {
        return ErrorKind::ProviderUnavailable;
    }

    ErrorKind::Unclassified {
        message: raw.to_string(),
    }
}

/// Pull the first `in <duration>` / `after <time-of-day>` fragment out of a message.
///
/// The grammar is not guaranteed by the provider; `None` is a normal result.
pub fn extract_retry_hint(raw: &str) -> Option<RetryHint> {
    RETRY_HINT
        .find(raw)
        .map(|m| RetryHint::new(m.as_str().trim_end()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_wins_over_permission() {
        let kind = classify("Permission check skipped: Requested entity was not found.");
        assert_eq!(kind, ErrorKind::CredentialInvalid);
    }

    #[test]
    fn permission_wins_over_quota() {
        let kind = classify("403 quota project denied");
        assert_eq!(kind, ErrorKind::InsufficientEntitlement);
    }

    #[test]
    fn hint_forms() {
        assert_eq!(
            extract_retry_hint("Please retry in 15s.").unwrap().as_str(),
            "in 15s"
        );
        assert_eq!(
            extract_retry_hint("Please retry in 31.52s.").unwrap().as_str(),
            "in 31.52s"
        );
        assert_eq!(
            extract_retry_hint("Try again in 2 minutes please")
                .unwrap()
                .as_str(),
            "in 2 minutes"
        );
        assert_eq!(
            extract_retry_hint("Quota resets after 14:30 UTC today")
                .unwrap()
                .as_str(),
            "after 14:30 UTC"
        );
        assert!(extract_retry_hint("Resource has been exhausted").is_none());
        assert!(extract_retry_hint("within 15s").is_none());
    }

    #[test]
    fn overload_is_unavailable() {
        assert_eq!(
            classify("The model is overloaded. Please try again later."),
            ErrorKind::ProviderUnavailable
        );
        assert_eq!(
            classify("Remote error: HTTP 500 (INTERNAL): An internal error has occurred."),
            ErrorKind::ProviderUnavailable
        );
    }

    #[test]
    fn unmatched_is_verbatim() {
        let raw = "Connection Reset By Peer";
        assert_eq!(
            classify(raw),
            ErrorKind::Unclassified {
                message: raw.to_string()
            }
        );
    }
}

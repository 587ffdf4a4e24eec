//! User-facing failure taxonomy shared by every studio operation.
//!
//! Provider failures, response-shape violations and poll outcomes all collapse
//! into one closed [`ErrorKind`] enum, so a caller needs exactly one
//! `match kind.remediation()` to decide what to show.
//!
//! ## Kinds
//!
//! | Code  | Kind                      | Remediation            |
//! |-------|---------------------------|------------------------|
//! | S1001 | `NoCredential`            | enter a credential     |
//! | S1002 | `CredentialInvalid`       | enter a credential     |
//! | S1003 | `InsufficientEntitlement` | upgrade the credential |
//! | S2001 | `RateLimited`             | wait, then retry       |
//! | S3001 | `ProviderUnavailable`     | manual retry           |
//! | S4001 | `NoCandidates`            | revise prompt          |
//! | S4002 | `BlockedOrEmpty`          | revise prompt          |
//! | S4003 | `NoImageData`             | manual retry           |
//! | S5001 | `VideoFailed`             | manual retry           |
//! | S5002 | `PollTimedOut`            | manual retry           |
//! | S5003 | `Cancelled`               | nothing                |
//! | S9999 | `Unclassified`            | show the message       |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Best-effort retry-after fragment lifted from a provider message
/// (`"in 15s"`, `"in 2 minutes"`, `"after 14:30 UTC"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryHint {
    text: String,
}

impl RetryHint {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The fragment exactly as it appeared in the provider message.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Relative delay for `in <duration>` hints. Time-of-day hints return `None`.
    pub fn delay(&self) -> Option<Duration> {
        let rest = self.text.trim();
        let rest = rest
            .strip_prefix("in ")
            .or_else(|| rest.strip_prefix("In "))
            .or_else(|| rest.strip_prefix("IN "))?
            .trim();
        let split = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (num, unit) = rest.split_at(split);
        let value: f64 = num.parse().ok()?;
        let secs = match unit.trim().to_ascii_lowercase().as_str() {
            "ms" => value / 1000.0,
            "" | "s" | "sec" | "secs" | "second" | "seconds" => value,
            "m" | "min" | "mins" | "minute" | "minutes" => value * 60.0,
            "h" | "hr" | "hour" | "hours" => value * 3600.0,
            _ => return None,
        };
        Duration::try_from_secs_f64(secs).ok()
    }
}

impl fmt::Display for RetryHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// What the caller should do about a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remediation {
    /// Ask the user for a (new) credential.
    EnterCredential,
    /// Ask the user for a credential from a paid / entitled project.
    UpgradeCredential,
    /// Tell the user to wait; `hint` is shown when the provider supplied one.
    WaitAndRetry { hint: Option<RetryHint> },
    /// Offer a retry button (or a cheaper fallback setting).
    ManualRetry,
    /// The prompt or inputs likely need changing.
    RevisePrompt,
    /// Display the raw message as-is.
    ShowMessage(String),
    /// Nothing to surface.
    None,
}

/// Closed set of failure kinds produced by studio operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    /// No credential could be resolved; the operation was not attempted.
    NoCredential,
    /// The provider says the credential or referenced resource does not exist.
    CredentialInvalid,
    /// The credential lacks the required capability or billing tier.
    InsufficientEntitlement,
    /// Quota or rate exhaustion, with an optional retry-after hint.
    RateLimited { retry_after: Option<RetryHint> },
    /// Transient provider-side failure.
    ProviderUnavailable,
    /// Image response carried no candidate.
    NoCandidates,
    /// Image candidate had no content parts (safety block or empty output).
    BlockedOrEmpty,
    /// Image candidate had parts but none with inline image bytes.
    NoImageData,
    /// Video job finished without a usable artifact.
    VideoFailed,
    /// Video job exceeded the configured maximum wait.
    PollTimedOut,
    /// The caller abandoned the poll loop.
    Cancelled,
    /// Nothing matched; the original message is kept verbatim.
    Unclassified { message: String },
}

impl ErrorKind {
    /// Stable code string (e.g., `"S2001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCredential => "S1001",
            Self::CredentialInvalid => "S1002",
            Self::InsufficientEntitlement => "S1003",
            Self::RateLimited { .. } => "S2001",
            Self::ProviderUnavailable => "S3001",
            Self::NoCandidates => "S4001",
            Self::BlockedOrEmpty => "S4002",
            Self::NoImageData => "S4003",
            Self::VideoFailed => "S5001",
            Self::PollTimedOut => "S5002",
            Self::Cancelled => "S5003",
            Self::Unclassified { .. } => "S9999",
        }
    }

    /// Snake-case name (e.g., `"rate_limited"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoCredential => "no_credential",
            Self::CredentialInvalid => "credential_invalid",
            Self::InsufficientEntitlement => "insufficient_entitlement",
            Self::RateLimited { .. } => "rate_limited",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::NoCandidates => "no_candidates",
            Self::BlockedOrEmpty => "blocked_or_empty",
            Self::NoImageData => "no_image_data",
            Self::VideoFailed => "video_failed",
            Self::PollTimedOut => "poll_timed_out",
            Self::Cancelled => "cancelled",
            Self::Unclassified { .. } => "unclassified",
        }
    }

    /// Whether the image operation may retry this kind on its own.
    #[inline]
    pub fn auto_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable)
    }

    /// Whether this kind means the active credential must be discarded.
    #[inline]
    pub fn invalidates_credential(&self) -> bool {
        matches!(self, Self::CredentialInvalid)
    }

    pub fn remediation(&self) -> Remediation {
        match self {
            Self::NoCredential | Self::CredentialInvalid => Remediation::EnterCredential,
            Self::InsufficientEntitlement => Remediation::UpgradeCredential,
            Self::RateLimited { retry_after } => Remediation::WaitAndRetry {
                hint: retry_after.clone(),
            },
            Self::ProviderUnavailable
            | Self::NoImageData
            | Self::VideoFailed
            | Self::PollTimedOut => Remediation::ManualRetry,
            Self::NoCandidates | Self::BlockedOrEmpty => Remediation::RevisePrompt,
            Self::Cancelled => Remediation::None,
            Self::Unclassified { message } => Remediation::ShowMessage(message.clone()),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredential => write!(f, "no API key configured"),
            Self::CredentialInvalid => write!(f, "API key or project was not found"),
            Self::InsufficientEntitlement => {
                write!(f, "API key lacks access; a paid project key is required")
            }
            Self::RateLimited {
                retry_after: Some(hint),
            } => write!(f, "quota exhausted, retry {}", hint),
            Self::RateLimited { retry_after: None } => write!(f, "quota exhausted"),
            Self::ProviderUnavailable => write!(f, "provider temporarily unavailable"),
            Self::NoCandidates => write!(f, "provider returned no candidates"),
            Self::BlockedOrEmpty => write!(f, "generation was blocked or empty"),
            Self::NoImageData => write!(f, "response contained no image data"),
            Self::VideoFailed => write!(f, "video generation finished without a result"),
            Self::PollTimedOut => write!(f, "video generation exceeded the maximum wait"),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::Unclassified { message } => f.write_str(message),
        }
    }
}

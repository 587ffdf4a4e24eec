use std::time::Duration;

use crate::error_kind::ErrorKind;

/// Internal decision for how to proceed after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Fixed-delay retry policy for single-shot operations.
///
/// Only kinds that report [`ErrorKind::auto_retryable`] are retried; quota,
/// credential and response-shape failures propagate on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// One transparent retry after `delay`.
    pub fn single(delay: Duration) -> Self {
        Self {
            max_retries: 1,
            delay,
        }
    }

    /// `attempt` is zero-based: the first failure is attempt 0.
    pub fn decide(&self, kind: &ErrorKind, attempt: u32) -> Decision {
        if kind.auto_retryable() && attempt < self.max_retries {
            Decision::Retry { delay: self.delay }
        } else {
            Decision::Fail
        }
    }
}

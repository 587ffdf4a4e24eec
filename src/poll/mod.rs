//! Long-running job polling.
//!
//! The video render is a small state machine over a [`VideoJob`]:
//!
//! ```text
//! Created ──► Polling{tick} ──► DoneSuccess(uri)
//!                  │  ▲    └──► DoneFailure(reason)
//!                  └──┘ check, report, sleep, refetch
//! ```
//!
//! Every tick checks the job first, then reports progress, then sleeps; a job
//! that finishes between ticks is seen within one interval. Sleeping goes
//! through [`Sleeper`] so tests drive ticks without a wall clock, and it is
//! raced against the [`CancelHandle`] so an abandoned loop holds no timer.

pub mod clock;

pub use clock::{tokio_sleeper, RecordingSleeper, Sleeper, TokioSleeper};

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::credentials::Credential;
use crate::transport::{Provider, VideoJob};
use crate::Result;

/// Phase descriptions cycled by tick count.
pub const PROGRESS_LABELS: [&str; 4] = [
    "Initializing video engine...",
    "Processing motion frames...",
    "Rendering scenes...",
    "Finalizing video...",
];

pub fn progress_label(tick: u32) -> &'static str {
    PROGRESS_LABELS[tick as usize % PROGRESS_LABELS.len()]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Give up once `interval * ticks` reaches this. `None` waits indefinitely.
    pub max_wait: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: None,
        }
    }
}

/// Reported once per non-terminal tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollProgress {
    pub tick: u32,
    pub label: &'static str,
}

/// Lets a caller abandon a poll loop from elsewhere (e.g. on shutdown).
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Created,
    Polling { tick: u32 },
    DoneSuccess { uri: String },
    DoneFailure { reason: Option<String> },
}

impl JobState {
    fn observe(job: &VideoJob, tick: u32) -> Self {
        match (job.done, &job.video_uri) {
            (true, Some(uri)) if job.error.is_none() => JobState::DoneSuccess { uri: uri.clone() },
            (true, _) => JobState::DoneFailure {
                reason: job.error.clone(),
            },
            (false, _) if tick == 0 => JobState::Created,
            (false, _) => JobState::Polling { tick },
        }
    }
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEnd {
    Ready(String),
    Failed(Option<String>),
    TimedOut,
    Cancelled,
}

pub struct Poller<'a> {
    provider: &'a dyn Provider,
    sleeper: &'a dyn Sleeper,
    config: &'a PollConfig,
}

impl<'a> Poller<'a> {
    pub fn new(provider: &'a dyn Provider, sleeper: &'a dyn Sleeper, config: &'a PollConfig) -> Self {
        Self {
            provider,
            sleeper,
            config,
        }
    }

    /// Drive `job` to a terminal state. Provider errors while refetching end
    /// the loop immediately; they are never retried here.
    pub async fn run<F>(
        &self,
        mut job: VideoJob,
        credential: &Credential,
        cancel: &CancelHandle,
        mut on_progress: F,
    ) -> Result<PollEnd>
    where
        F: FnMut(PollProgress) + Send,
    {
        let mut tick: u32 = 0;
        loop {
            let tick_now = match JobState::observe(&job, tick) {
                JobState::DoneSuccess { uri } => return Ok(PollEnd::Ready(uri)),
                JobState::DoneFailure { reason } => return Ok(PollEnd::Failed(reason)),
                JobState::Created => 0,
                JobState::Polling { tick } => tick,
            };

            if cancel.is_cancelled() {
                return Ok(PollEnd::Cancelled);
            }
            if let Some(max) = self.config.max_wait {
                if self.config.interval.saturating_mul(tick_now) >= max {
                    debug!(job = %job.name, ticks = tick_now, "poll wait exhausted");
                    return Ok(PollEnd::TimedOut);
                }
            }

            let label = progress_label(tick_now);
            debug!(job = %job.name, tick = tick_now, label, "video job pending");
            on_progress(PollProgress {
                tick: tick_now,
                label,
            });

            tokio::select! {
                biased;
                _ = cancel.token.cancelled() => return Ok(PollEnd::Cancelled),
                _ = self.sleeper.sleep(self.config.interval) => {}
            }

            job = self.provider.get_video_job(&job, credential).await?;
            tick += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_cycle_by_tick() {
        assert_eq!(progress_label(0), PROGRESS_LABELS[0]);
        assert_eq!(progress_label(3), "Finalizing video...");
        assert_eq!(progress_label(4), PROGRESS_LABELS[0]);
        assert_eq!(progress_label(6), "Rendering scenes...");
    }

    #[test]
    fn state_observation() {
        let mut job = VideoJob::pending("operations/1");
        assert_eq!(JobState::observe(&job, 0), JobState::Created);
        assert_eq!(JobState::observe(&job, 2), JobState::Polling { tick: 2 });

        job.done = true;
        assert_eq!(JobState::observe(&job, 3), JobState::DoneFailure { reason: None });

        job.video_uri = Some("https://example.com/v.mp4".into());
        assert_eq!(
            JobState::observe(&job, 3),
            JobState::DoneSuccess {
                uri: "https://example.com/v.mp4".into()
            }
        );

        job.error = Some("safety filter".into());
        assert_eq!(
            JobState::observe(&job, 3),
            JobState::DoneFailure {
                reason: Some("safety filter".into())
            }
        );
    }

    #[test]
    fn cancel_handle_clones_share_state() {
        let handle = CancelHandle::new();
        let other = handle.clone();
        other.cancel();
        assert!(handle.is_cancelled());
    }
}

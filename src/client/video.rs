use tracing::{info, warn};

use super::core::StudioClient;
use crate::error_kind::ErrorKind;
use crate::poll::{CancelHandle, PollEnd, PollProgress, Poller};
use crate::types::{OperationOutcome, VideoArtifact, VideoConfig};

const VIDEO_MEDIA_TYPE: &str = "video/mp4";

impl StudioClient {
    /// Start a render, poll until it finishes and download the result.
    ///
    /// `on_progress` is called once per pending tick with a rotating phase label.
    pub async fn generate_video<S, F>(
        &self,
        prompt: &str,
        config: &VideoConfig,
        reference_images: &[S],
        on_progress: F,
    ) -> OperationOutcome<VideoArtifact>
    where
        S: AsRef<str>,
        F: FnMut(PollProgress) + Send,
    {
        let cancel = CancelHandle::new();
        self.generate_video_with_cancel(prompt, config, reference_images, &cancel, on_progress)
            .await
    }

    /// As [`StudioClient::generate_video`], abandoning the loop once `cancel` fires.
    pub async fn generate_video_with_cancel<S, F>(
        &self,
        prompt: &str,
        config: &VideoConfig,
        reference_images: &[S],
        cancel: &CancelHandle,
        on_progress: F,
    ) -> OperationOutcome<VideoArtifact>
    where
        S: AsRef<str>,
        F: FnMut(PollProgress) + Send,
    {
        let credential = match self.credential("generate_video") {
            Ok(c) => c,
            Err(kind) => return OperationOutcome::Failure(kind),
        };
        let request = self.requests.build_video(prompt, config, reference_images);

        let job = match self.provider.start_video_job(&request, &credential).await {
            Ok(job) => job,
            Err(e) => return OperationOutcome::Failure(self.settle("generate_video", e)),
        };
        info!(job = %job.name, model = %request.model, "video job started");

        let poller = Poller::new(self.provider.as_ref(), self.sleeper.as_ref(), &self.config.poll);
        let end = match poller.run(job, &credential, cancel, on_progress).await {
            Ok(end) => end,
            Err(e) => return OperationOutcome::Failure(self.settle("poll_video", e)),
        };

        let uri = match end {
            PollEnd::Ready(uri) => uri,
            PollEnd::Failed(reason) => {
                warn!(
                    reason = reason.as_deref().unwrap_or("no result uri"),
                    "video job finished without a result"
                );
                return OperationOutcome::Failure(ErrorKind::VideoFailed);
            }
            PollEnd::TimedOut => {
                warn!(max_wait = ?self.config.poll.max_wait, "video job exceeded maximum wait");
                return OperationOutcome::Failure(ErrorKind::PollTimedOut);
            }
            PollEnd::Cancelled => {
                info!("video polling cancelled");
                return OperationOutcome::Failure(ErrorKind::Cancelled);
            }
        };

        match self.provider.fetch_artifact(&uri, &credential).await {
            Ok(bytes) => {
                info!(bytes = bytes.len(), "video downloaded");
                OperationOutcome::Success(VideoArtifact {
                    source_uri: uri,
                    media_type: VIDEO_MEDIA_TYPE.to_string(),
                    bytes,
                })
            }
            Err(e) => OperationOutcome::Failure(self.settle("fetch_video", e)),
        }
    }
}

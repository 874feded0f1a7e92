//! Video processing client: submit a video, poll job status, fetch the
//! finalized result.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::models::{
    ChapterSource, DescriptionChapters, ProcessRequest, ProcessingMode, ProcessingResponse,
    ProcessingStatus, VideoResult,
};
use crate::youtube;

use super::ApiClient;

/// Caller-supplied termination policy for status polling. There is no
/// push channel; polling is pure request/response and runs until a
/// terminal status or until the policy is exhausted.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 300,
        }
    }
}

/// Client for the `/youtube/*` endpoints.
pub struct VideoClient {
    api: Arc<ApiClient>,
}

impl VideoClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Submit a video for processing. The id is validated locally before
    /// any network dispatch; backend rejections (bad id, exhausted quota)
    /// surface as `Validation` and `QuotaExceeded`.
    pub async fn process(
        &self,
        video_id: &str,
        mode: ProcessingMode,
        chapter_source: ChapterSource,
    ) -> Result<ProcessingResponse, ApiError> {
        if !youtube::is_valid_video_id(video_id) {
            return Err(ApiError::Validation(format!(
                "'{}' is not a valid YouTube video id",
                video_id
            )));
        }

        info!("🎬 Submitting video {} (mode: {})", video_id, mode);
        let body = ProcessRequest {
            mode,
            chapter_source,
        };
        self.api
            .post(&format!("youtube/process/{}", video_id), &body)
            .await
    }

    /// Current status of a job.
    pub async fn status(&self, job_id: &str) -> Result<ProcessingStatus, ApiError> {
        self.api.get(&format!("youtube/status/{}", job_id)).await
    }

    /// Status of the most recent job for a video.
    pub async fn latest_status(&self, video_id: &str) -> Result<ProcessingStatus, ApiError> {
        self.api
            .get_with_query("youtube/latest-status", &[("video_id", video_id)])
            .await
    }

    /// Finalized result for a processed video. `NotFound` if the video was
    /// never processed.
    pub async fn result(&self, video_id: &str) -> Result<VideoResult, ApiError> {
        self.api.get(&format!("youtube/result/{}", video_id)).await
    }

    /// Chapter markers parsed from the video description, when the
    /// uploader provided them.
    pub async fn description_chapters(
        &self,
        video_id: &str,
    ) -> Result<DescriptionChapters, ApiError> {
        self.api.get(&format!("youtube/chapters/{}", video_id)).await
    }

    /// Poll a job until it reaches a terminal status or the policy is
    /// exhausted. The returned status carries the result for completed
    /// jobs and the error message for failed ones.
    pub async fn wait_for_completion(
        &self,
        job_id: &str,
        policy: PollPolicy,
    ) -> Result<ProcessingStatus, ApiError> {
        for attempt in 1..=policy.max_attempts {
            let status = self.status(job_id).await?;
            if status.status.is_terminal() {
                info!(
                    "🏁 Job {} finished after {} polls: {:?}",
                    job_id, attempt, status.status
                );
                return Ok(status);
            }
            debug!(
                "Job {} at {:.0}% (poll {}/{})",
                job_id,
                status.progress * 100.0,
                attempt,
                policy.max_attempts
            );
            // No point sleeping after the final attempt.
            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }

        Err(ApiError::PollTimeout {
            attempts: policy.max_attempts,
        })
    }
}

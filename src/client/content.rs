//! Result/content client: read and edit previously computed content.
//!
//! Every update is a direct passthrough to the backend's REST resource —
//! no local caching, no conflict detection, last-write-wins.

use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Content, ContentUpdate, VideoRecord};

use super::ApiClient;

pub struct ContentClient {
    api: Arc<ApiClient>,
}

impl ContentClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Fetch one content record.
    pub async fn get(&self, id: i64) -> Result<Content, ApiError> {
        self.api.get(&format!("content/{}", id)).await
    }

    /// Apply a partial update to a content record and return the stored
    /// state.
    pub async fn update(&self, id: i64, update: &ContentUpdate) -> Result<Content, ApiError> {
        self.api.put(&format!("content/{}", id), update).await
    }

    /// Replace the summary of a processed video (200/void endpoint).
    pub async fn update_summary(&self, video_id: &str, summary: &str) -> Result<(), ApiError> {
        self.api
            .put_unit(
                &format!("video/{}/summary", video_id),
                &json!({ "summary": summary }),
            )
            .await
    }

    /// Replace the transcript of a processed video (200/void endpoint).
    pub async fn update_transcript(
        &self,
        video_id: &str,
        transcript: &str,
    ) -> Result<(), ApiError> {
        self.api
            .put_unit(
                &format!("video/{}/transcript", video_id),
                &json!({ "transcript": transcript }),
            )
            .await
    }

    /// List the signed-in user's videos.
    pub async fn list_videos(&self) -> Result<Vec<VideoRecord>, ApiError> {
        self.api.get("videos").await
    }
}

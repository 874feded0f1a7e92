//! Wire types shared by the clients, the BFF server, and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// How much work the pipeline puts into a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    Simple,
    Detailed,
    DetailedWithScreenshots,
}

impl ProcessingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::Simple => "simple",
            ProcessingMode::Detailed => "detailed",
            ProcessingMode::DetailedWithScreenshots => "detailed_with_screenshots",
        }
    }
}

impl Default for ProcessingMode {
    fn default() -> Self {
        ProcessingMode::Detailed
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(ProcessingMode::Simple),
            "detailed" => Ok(ProcessingMode::Detailed),
            "detailed_with_screenshots" => Ok(ProcessingMode::DetailedWithScreenshots),
            other => Err(ApiError::Validation(format!(
                "unknown processing mode '{}' (expected simple, detailed, or detailed_with_screenshots)",
                other
            ))),
        }
    }
}

/// Where chapter boundaries come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterSource {
    Auto,
    Description,
}

impl ChapterSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterSource::Auto => "auto",
            ChapterSource::Description => "description",
        }
    }
}

impl Default for ChapterSource {
    fn default() -> Self {
        ChapterSource::Auto
    }
}

impl fmt::Display for ChapterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChapterSource {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ChapterSource::Auto),
            "description" => Ok(ChapterSource::Description),
            other => Err(ApiError::Validation(format!(
                "unknown chapter source '{}' (expected auto or description)",
                other
            ))),
        }
    }
}

/// Lifecycle of a processing job. Completed and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Request body for submitting a video. Both fields fall back to their
/// defaults when omitted, matching the backend's behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub mode: ProcessingMode,
    #[serde(default)]
    pub chapter_source: ChapterSource,
}

/// Job descriptor returned when a processing request is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResponse {
    pub job_id: String,
    pub video_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ProcessingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_source: Option<ChapterSource>,
}

/// Point-in-time view of a job, as returned by the status endpoints.
/// `progress` is a fraction in 0.0..=1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStatus {
    pub job_id: String,
    pub video_id: String,
    pub status: JobStatus,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VideoResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Token accounting for one processing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_price: f64,
}

/// Finalized structured output for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResult {
    pub video_id: String,
    pub chapters: Vec<Chapter>,
    pub stats: ProcessingStats,
}

impl VideoResult {
    /// Check the chapter invariants: each chapter is internally consistent,
    /// and chapters are ordered and non-overlapping in both paragraph and
    /// time ranges.
    pub fn validate(&self) -> Result<(), ApiError> {
        for chapter in &self.chapters {
            chapter.validate()?;
        }
        for pair in self.chapters.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.start_time < prev.end_time {
                return Err(ApiError::Validation(format!(
                    "chapters {} and {} overlap in time",
                    prev.num_chapter, next.num_chapter
                )));
            }
            if next.start_paragraph_number <= prev.end_paragraph_number {
                return Err(ApiError::Validation(format!(
                    "chapters {} and {} overlap in paragraphs",
                    prev.num_chapter, next.num_chapter
                )));
            }
        }
        Ok(())
    }
}

/// A titled segment of a processed video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub num_chapter: u32,
    pub title: String,
    pub start_paragraph_number: u32,
    pub end_paragraph_number: u32,
    pub start_time: f64,
    pub end_time: f64,
    pub paragraphs: Vec<String>,
    pub paragraph_timestamps: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<String>>,
}

impl Chapter {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.paragraphs.len() != self.paragraph_timestamps.len() {
            return Err(ApiError::Validation(format!(
                "chapter {}: {} paragraphs but {} timestamps",
                self.num_chapter,
                self.paragraphs.len(),
                self.paragraph_timestamps.len()
            )));
        }
        if self.start_paragraph_number > self.end_paragraph_number {
            return Err(ApiError::Validation(format!(
                "chapter {}: paragraph range {}..{} is inverted",
                self.num_chapter, self.start_paragraph_number, self.end_paragraph_number
            )));
        }
        if self.start_time > self.end_time {
            return Err(ApiError::Validation(format!(
                "chapter {}: time range {:.1}..{:.1} is inverted",
                self.num_chapter, self.start_time, self.end_time
            )));
        }
        Ok(())
    }
}

/// A chapter marker lifted straight from the video description
/// (timestamp in whole seconds, as written by the uploader).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionChapter {
    pub timestamp: u64,
    pub title: String,
}

/// Response wrapper for `GET /youtube/chapters/{video_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionChapters {
    pub chapters: Vec<DescriptionChapter>,
}

/// A persisted content record: the editable view over a processed video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: i64,
    pub content_type: String,
    pub content_id: String,
    pub title: Option<String>,
    pub processed_content: Option<String>,
    pub processing_type: String,
    pub processing_mode: String,
    pub processing_time: Option<f64>,
}

/// Partial update for a content record. Unset fields are left untouched;
/// each update is last-write-wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_content: Option<String>,
}

/// One of the signed-in user's videos, as listed by `GET /videos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: Option<String>,
    pub status: JobStatus,
    pub processing_mode: ProcessingMode,
    pub chapter_source: ChapterSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Local user record kept by the BFF, keyed by the identity provider's
/// subject identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub provider_uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub token_usage: u64,
    pub token_limit: u64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn quota_exhausted(&self) -> bool {
        self.token_usage >= self.token_limit
    }
}

/// Token issued by the login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Response from `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
}

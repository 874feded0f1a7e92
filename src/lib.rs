/// tubedigest
///
/// Client library and backend-for-frontend glue for a YouTube chaptering
/// and summarization service: submit a video, poll the processing job,
/// and read or edit the resulting structured content.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod session;
pub mod youtube;

// Re-export main types for easy access
pub use crate::client::{ApiClient, AuthClient, ContentClient, PollPolicy, VideoClient};
pub use crate::config::Config;
pub use crate::error::ApiError;
pub use crate::models::{
    Chapter, ChapterSource, Content, ContentUpdate, JobStatus, ProcessingMode,
    ProcessingResponse, ProcessingStats, ProcessingStatus, User, VideoResult,
};
pub use crate::session::{Session, SessionStore, TokenSource, UserProfile};
pub use crate::youtube::{get_video_id, is_valid_video_id};

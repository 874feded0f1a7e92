use anyhow::Result;
use clap::{Arg, Command};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use tubedigest::client::{ApiClient, PollPolicy, VideoClient};
use tubedigest::config::Config;
use tubedigest::models::JobStatus;
use tubedigest::session::{Session, SessionStore};
use tubedigest::youtube;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("tubedigest=info,warn")
        .init();

    let matches = Command::new("tubedigest")
        .version("0.1.0")
        .about("Submit a YouTube video for chaptering and wait for the result")
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("YouTube URL or bare 11-character video id")
                .required(true),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Processing mode: simple, detailed, or detailed_with_screenshots")
                .default_value("detailed"),
        )
        .arg(
            Arg::new("chapters")
                .short('c')
                .long("chapters")
                .value_name("SOURCE")
                .help("Chapter source: auto or description")
                .default_value("auto"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Processing backend base URL (overrides config)"),
        )
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .value_name("TOKEN")
                .help("Bearer token for authenticated endpoints"),
        )
        .arg(
            Arg::new("poll-interval")
                .long("poll-interval")
                .value_name("SECS")
                .help("Seconds between status polls")
                .default_value("2"),
        )
        .arg(
            Arg::new("max-polls")
                .long("max-polls")
                .value_name("NUM")
                .help("Give up after this many status polls")
                .default_value("300"),
        )
        .get_matches();

    let url = matches.get_one::<String>("url").expect("required arg");
    let mode = matches
        .get_one::<String>("mode")
        .expect("defaulted arg")
        .parse()?;
    let chapter_source = matches
        .get_one::<String>("chapters")
        .expect("defaulted arg")
        .parse()?;
    let poll_interval: u64 = matches
        .get_one::<String>("poll-interval")
        .expect("defaulted arg")
        .parse()?;
    let max_polls: u32 = matches
        .get_one::<String>("max-polls")
        .expect("defaulted arg")
        .parse()?;

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    let base_url = matches
        .get_one::<String>("base-url")
        .cloned()
        .unwrap_or(config.api.base_url);

    let video_id = match youtube::get_video_id(url) {
        Some(id) => id,
        None => {
            error!("Could not extract a video id from: {}", url);
            return Err(anyhow::anyhow!("unparseable video URL"));
        }
    };

    let store = SessionStore::new();
    if let Some(token) = matches.get_one::<String>("token") {
        store.set(Session::from_token(token.clone()));
    } else {
        warn!("No token supplied; authenticated endpoints will be rejected");
    }

    let api = Arc::new(ApiClient::with_timeout(
        &base_url,
        store,
        Duration::from_secs(config.api.timeout_seconds),
    )?);
    let videos = VideoClient::new(api);

    info!("🚀 tubedigest starting");
    info!("🎬 Video: {}", video_id);
    info!("🔗 Backend: {}", base_url);

    let start_time = std::time::Instant::now();
    let job = videos.process(&video_id, mode, chapter_source).await?;
    info!("🧾 Job accepted: {}", job.job_id);

    let policy = PollPolicy {
        interval: Duration::from_secs(poll_interval),
        max_attempts: max_polls,
    };
    let status = videos.wait_for_completion(&job.job_id, policy).await?;
    let duration = start_time.elapsed();

    match status.status {
        JobStatus::Completed => {
            info!("🎉 Processing completed in {:.1}s", duration.as_secs_f64());
            if let Some(result) = status.result {
                result.validate()?;
                for chapter in &result.chapters {
                    info!(
                        "📖 {:>3}. {} ({:.0}s - {:.0}s)",
                        chapter.num_chapter, chapter.title, chapter.start_time, chapter.end_time
                    );
                }
                info!(
                    "📊 Tokens: {} in / {} out, cost ${:.4}",
                    result.stats.total_input_tokens,
                    result.stats.total_output_tokens,
                    result.stats.total_price
                );
            } else {
                warn!("Job completed but the status carried no result");
            }
        }
        JobStatus::Failed => {
            error!(
                "❌ Processing failed: {}",
                status.error.as_deref().unwrap_or("unknown error")
            );
            return Err(anyhow::anyhow!("processing failed"));
        }
        other => {
            // wait_for_completion only returns terminal statuses
            error!("Unexpected non-terminal status: {:?}", other);
        }
    }

    Ok(())
}

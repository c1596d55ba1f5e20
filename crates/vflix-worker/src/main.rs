//! Videoflix transcoding worker binary.
//!
//! Registers the video files named on the command line, dispatches one
//! transcode job per configured resolution for each, and drains the queue
//! with a bounded worker pool before reporting per-job outcomes.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vflix_media::{check_encoder, ArtifactStore, TranscodeSettings, Transcoder};
use vflix_models::JobStatus;
use vflix_queue::{Dispatcher, JobBoard, JobQueue, QueueConfig};
use vflix_worker::{JobExecutor, NewVideo, VideoLibrary, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vflix=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting vflix-worker");

    let sources: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if sources.is_empty() {
        error!("No input files. Usage: vflix-worker <video file>...");
        std::process::exit(2);
    }

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let queue = Arc::new(JobQueue::new(QueueConfig::from_env()));
    let board = Arc::new(JobBoard::new());
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&queue), Arc::clone(&board)));

    let mut settings = TranscodeSettings::from_env();
    if settings.timeout_secs.is_none() {
        settings.timeout_secs = Some(config.job_timeout.as_secs());
    }
    if let Err(e) = check_encoder(&settings.ffmpeg_bin) {
        // Jobs will fail individually with the same diagnostic; warn early
        warn!("{}", e);
    }
    let transcoder = Arc::new(Transcoder::new(settings));

    let library = VideoLibrary::new(Arc::clone(&dispatcher), ArtifactStore::default());

    for source in &sources {
        let title = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        let record = library
            .create_video(NewVideo::new(title).with_source(source))
            .await;
        info!(
            video_id = %record.video_id,
            source = %source.display(),
            "Registered video"
        );
    }

    // All uploads are in: close the queue so the workers drain it and stop
    queue.close();

    let executor = JobExecutor::new(
        config,
        Arc::clone(&queue),
        Arc::clone(&board),
        transcoder,
    );

    executor.run().await;

    // Per-job summary
    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let mut jobs = board.all().await;
    jobs.sort_by(|a, b| a.enqueued_at.cmp(&b.enqueued_at));
    for job in &jobs {
        match job.status {
            JobStatus::Succeeded => {
                succeeded += 1;
                info!(
                    job_id = %job.job_id,
                    output = %job.output_path().display(),
                    "Variant ready"
                );
            }
            JobStatus::Failed => {
                failed += 1;
                error!(
                    job_id = %job.job_id,
                    source = %job.source_path.display(),
                    resolution = %job.resolution,
                    "Variant failed: {}",
                    job.error_message.as_deref().unwrap_or("unknown error")
                );
            }
            _ => {}
        }
    }

    info!(succeeded, failed, "Worker shutdown complete");

    if failed > 0 {
        std::process::exit(1);
    }
}

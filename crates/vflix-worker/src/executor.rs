//! Job executor.
//!
//! Runs a bounded pool of worker loops against the job queue. Each loop
//! takes one job at a time, drives the encoder, and records the terminal
//! status on the board. A job failure is local to that job: siblings keep
//! running and nothing propagates to the video record.

use std::sync::Arc;

use tracing::{debug, info};

use vflix_media::Transcoder;
use vflix_models::TranscodeJob;
use vflix_queue::{JobBoard, JobQueue};

use crate::config::WorkerConfig;
use crate::logging::JobLogger;

/// Job executor that processes jobs from the queue.
pub struct JobExecutor {
    config: WorkerConfig,
    queue: Arc<JobQueue>,
    board: Arc<JobBoard>,
    transcoder: Arc<Transcoder>,
}

impl JobExecutor {
    /// Create a new job executor.
    pub fn new(
        config: WorkerConfig,
        queue: Arc<JobQueue>,
        board: Arc<JobBoard>,
        transcoder: Arc<Transcoder>,
    ) -> Self {
        Self {
            config,
            queue,
            board,
            transcoder,
        }
    }

    /// Run worker loops until the queue is closed and drained.
    pub async fn run(&self) {
        info!(
            "Starting job executor with {} max concurrent jobs",
            self.config.max_concurrent_jobs
        );

        let mut handles = Vec::with_capacity(self.config.max_concurrent_jobs);
        for i in 0..self.config.max_concurrent_jobs {
            let worker = format!("worker-{i}");
            let queue = Arc::clone(&self.queue);
            let board = Arc::clone(&self.board);
            let transcoder = Arc::clone(&self.transcoder);

            handles.push(tokio::spawn(async move {
                while let Some(job) = queue.dequeue().await {
                    Self::execute_job(&worker, &board, &transcoder, job).await;
                }
                debug!(worker = %worker, "Queue closed, worker loop exiting");
            }));
        }

        for handle in handles {
            handle.await.ok();
        }

        info!("Job executor stopped");
    }

    /// Signal shutdown: in-flight jobs finish, then the loops exit.
    pub fn shutdown(&self) {
        self.queue.close();
    }

    /// Execute a single job and record its terminal status.
    async fn execute_job(
        worker: &str,
        board: &JobBoard,
        transcoder: &Transcoder,
        job: TranscodeJob,
    ) {
        let logger = JobLogger::new(&job.job_id, "transcode");
        logger.log_start(&format!(
            "{} -> {} on {}",
            job.source_path.display(),
            job.resolution,
            worker
        ));

        board.mark_running(&job.job_id).await;

        match transcoder.transcode(&job.source_path, job.resolution).await {
            Ok(output) => {
                board.mark_succeeded(&job.job_id).await;
                logger.log_completion(&format!("wrote {}", output.display()));
            }
            Err(e) => {
                let detail = e.job_detail();
                logger.log_error(&detail);
                board.mark_failed(&job.job_id, detail).await;
            }
        }
    }
}

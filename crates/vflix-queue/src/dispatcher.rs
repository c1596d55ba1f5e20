//! Job dispatcher.
//!
//! Translates one "video created" event into one queued transcode job per
//! configured resolution. Called explicitly from the upload-completion
//! path; queue insertion is the only side effect, so the caller is never
//! blocked on encoding.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use vflix_models::{JobId, Resolution, TranscodeJob};

use crate::error::{QueueError, QueueResult};
use crate::queue::JobQueue;
use crate::status::JobBoard;

/// Submits transcode jobs for newly uploaded source files.
pub struct Dispatcher {
    queue: Arc<JobQueue>,
    board: Arc<JobBoard>,
    resolutions: Vec<Resolution>,
}

impl Dispatcher {
    /// Create a dispatcher for the default resolution set.
    pub fn new(queue: Arc<JobQueue>, board: Arc<JobBoard>) -> Self {
        Self {
            queue,
            board,
            resolutions: Resolution::DEFAULT_SET.to_vec(),
        }
    }

    /// Override the resolution set jobs are dispatched for.
    pub fn with_resolutions(mut self, resolutions: impl Into<Vec<Resolution>>) -> Self {
        self.resolutions = resolutions.into();
        self
    }

    /// The configured resolution set.
    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    /// Enqueue one transcode job per configured resolution for `source`.
    ///
    /// The source file's existence is not checked here; a missing file
    /// surfaces as a worker-side encode failure. Every resolution is
    /// attempted even when an earlier enqueue fails; failed submissions are
    /// marked on the board, logged, and reported back to the caller in a
    /// single error.
    pub async fn submit(&self, source: impl AsRef<Path>) -> QueueResult<Vec<JobId>> {
        let source = source.as_ref();
        let mut submitted = Vec::new();
        let mut failures = Vec::new();

        for resolution in &self.resolutions {
            let job = TranscodeJob::new(source, *resolution);
            let job_id = job.job_id.clone();
            self.board.record(&job).await;

            match self.queue.enqueue(job) {
                Ok(()) => {
                    info!(
                        job_id = %job_id,
                        source = %source.display(),
                        resolution = %resolution,
                        "Dispatched transcode job"
                    );
                    submitted.push(job_id);
                }
                Err(e) => {
                    error!(
                        job_id = %job_id,
                        source = %source.display(),
                        resolution = %resolution,
                        "Failed to dispatch transcode job: {}", e
                    );
                    self.board
                        .mark_failed(&job_id, format!("dispatch failed: {e}"))
                        .await;
                    failures.push(format!("{resolution}: {e}"));
                }
            }
        }

        if failures.is_empty() {
            Ok(submitted)
        } else {
            Err(QueueError::enqueue_failed(failures.join("; ")))
        }
    }
}

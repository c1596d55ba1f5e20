//! Job status board.
//!
//! Tracks every dispatched job's lifecycle so conversion status can be
//! queried per video. The dispatcher records jobs at enqueue time; status
//! transitions are driven solely by workers.

use std::collections::HashMap;
use std::path::Path;

use tokio::sync::RwLock;

use vflix_models::{JobId, JobStatus, TranscodeJob};

/// In-memory registry of transcode jobs, keyed by job ID.
#[derive(Debug, Default)]
pub struct JobBoard {
    jobs: RwLock<HashMap<JobId, TranscodeJob>>,
}

impl JobBoard {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly created job.
    pub async fn record(&self, job: &TranscodeJob) {
        self.jobs
            .write()
            .await
            .insert(job.job_id.clone(), job.clone());
    }

    /// Mark a job as picked up by a worker.
    pub async fn mark_running(&self, job_id: &JobId) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.start();
        }
    }

    /// Mark a job as completed successfully.
    pub async fn mark_succeeded(&self, job_id: &JobId) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.succeed();
        }
    }

    /// Mark a job as failed with an error detail.
    pub async fn mark_failed(&self, job_id: &JobId, error: impl Into<String>) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.fail(error);
        }
    }

    /// Snapshot of a single job.
    pub async fn get(&self, job_id: &JobId) -> Option<TranscodeJob> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Snapshot of every job for one source file.
    pub async fn jobs_for_source(&self, source: impl AsRef<Path>) -> Vec<TranscodeJob> {
        let source = source.as_ref();
        self.jobs
            .read()
            .await
            .values()
            .filter(|job| job.source_path == source)
            .cloned()
            .collect()
    }

    /// Snapshot of every tracked job.
    pub async fn all(&self) -> Vec<TranscodeJob> {
        self.jobs.read().await.values().cloned().collect()
    }

    /// Number of jobs not yet in a terminal state.
    pub async fn in_flight(&self) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|job| !job.is_terminal())
            .count()
    }

    /// Count of jobs currently in `status`.
    pub async fn count_with_status(&self, status: JobStatus) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|job| job.status == status)
            .count()
    }
}

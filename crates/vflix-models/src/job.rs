//! Transcode job definitions.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resolution::Resolution;

/// Unique identifier for a transcode job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transcode job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting in the queue
    #[default]
    Queued,
    /// A worker is encoding this job
    Running,
    /// Encoding finished and the derived file exists
    Succeeded,
    /// Encoding failed; error detail recorded on the job
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of encoding work: "encode source S at resolution R".
///
/// Created by the dispatcher at upload time, one per configured resolution.
/// Status transitions are driven solely by the worker; `succeeded` and
/// `failed` are terminal. There is no retry state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscodeJob {
    /// Unique job ID
    pub job_id: JobId,
    /// Path to the source file
    pub source_path: PathBuf,
    /// Target resolution
    pub resolution: Resolution,
    /// Current status
    #[serde(default)]
    pub status: JobStatus,
    /// Error detail (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// When the job was enqueued
    pub enqueued_at: DateTime<Utc>,
    /// When a worker picked the job up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl TranscodeJob {
    /// Create a new queued job.
    pub fn new(source_path: impl Into<PathBuf>, resolution: Resolution) -> Self {
        Self {
            job_id: JobId::new(),
            source_path: source_path.into(),
            resolution,
            status: JobStatus::Queued,
            error_message: None,
            enqueued_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// The derived file this job produces on success.
    pub fn output_path(&self) -> PathBuf {
        self.resolution.variant_path(&self.source_path)
    }

    /// Mark the job as picked up by a worker.
    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark the job as completed successfully.
    pub fn succeed(&mut self) {
        self.status = JobStatus::Succeeded;
        self.finished_at = Some(Utc::now());
    }

    /// Mark the job as failed with an error detail.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error_message = Some(error.into());
        self.finished_at = Some(Utc::now());
    }

    /// Check if the job reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_is_queued() {
        let job = TranscodeJob::new("videos/movie.mp4", Resolution::P360);
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.error_message.is_none());
        assert!(!job.is_terminal());
    }

    #[test]
    fn output_path_follows_naming_scheme() {
        let job = TranscodeJob::new("videos/movie.mp4", Resolution::P720);
        assert_eq!(job.output_path(), PathBuf::from("videos/movie_720p.mp4"));
    }

    #[test]
    fn status_transitions() {
        let mut job = TranscodeJob::new("movie.mp4", Resolution::P360);

        job.start();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());
        assert!(!job.is_terminal());

        job.succeed();
        assert_eq!(job.status, JobStatus::Succeeded);
        assert!(job.finished_at.is_some());
        assert!(job.is_terminal());
    }

    #[test]
    fn failure_records_error_detail() {
        let mut job = TranscodeJob::new("movie.mp4", Resolution::P360);
        job.start();
        job.fail("ffmpeg exited with status 1");

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(
            job.error_message.as_deref(),
            Some("ffmpeg exited with status 1")
        );
        assert!(job.is_terminal());
    }

    #[test]
    fn job_serde_roundtrip() {
        let job = TranscodeJob::new("videos/movie.mp4", Resolution::P360);
        let json = serde_json::to_string(&job).expect("serialize TranscodeJob");
        let decoded: TranscodeJob = serde_json::from_str(&json).expect("deserialize TranscodeJob");

        assert_eq!(decoded.job_id, job.job_id);
        assert_eq!(decoded.source_path, job.source_path);
        assert_eq!(decoded.resolution, job.resolution);
        assert_eq!(decoded.status, JobStatus::Queued);
    }
}

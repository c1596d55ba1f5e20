//! Shared data models for the Videoflix backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video catalog records and genres
//! - Target resolutions and derived artifact paths
//! - Transcode jobs and their lifecycle states
//! - Encoding configuration

pub mod encoding;
pub mod job;
pub mod resolution;
pub mod video;

// Re-export common types
pub use encoding::EncodingConfig;
pub use job::{JobId, JobStatus, TranscodeJob};
pub use resolution::{Resolution, ResolutionParseError};
pub use video::{Genre, VideoId, VideoRecord};

//! FFmpeg CLI wrapper for the Videoflix backend.
//!
//! This crate provides:
//! - A builder and runner for FFmpeg invocations
//! - The per-resolution transcode operation
//! - The artifact lifecycle manager (derived-path cleanup on deletion)

pub mod artifacts;
pub mod command;
pub mod error;
pub mod transcode;

pub use artifacts::{ArtifactStore, RemovedArtifacts};
pub use command::{check_encoder, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use transcode::{TranscodeSettings, Transcoder};

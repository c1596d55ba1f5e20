//! Transcoding worker for the Videoflix backend.
//!
//! Pulls transcode jobs from the in-process queue, invokes the external
//! encoder per resolution, and reports success/failure on the job board.
//! Also hosts the video library service that wires video creation to the
//! dispatcher and deletion to the artifact lifecycle manager.

pub mod config;
pub mod executor;
pub mod library;
pub mod logging;

pub use config::WorkerConfig;
pub use executor::JobExecutor;
pub use library::{NewVideo, VideoLibrary};
pub use logging::JobLogger;

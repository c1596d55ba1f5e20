//! In-process transcode job queue.
//!
//! This crate provides:
//! - A bounded hand-off between the dispatcher and transcode workers
//!   (competing consumers, single delivery)
//! - The job dispatcher that turns one upload into one job per resolution
//! - A status board tracking every job's lifecycle

pub mod dispatcher;
pub mod error;
pub mod queue;
pub mod status;

pub use dispatcher::Dispatcher;
pub use error::{QueueError, QueueResult};
pub use queue::{JobQueue, QueueConfig};
pub use status::JobBoard;

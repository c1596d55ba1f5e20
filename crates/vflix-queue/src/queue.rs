//! Bounded in-process job queue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use vflix_models::TranscodeJob;

use crate::error::{QueueError, QueueResult};

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum number of queued jobs
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            capacity: std::env::var("QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),
        }
    }
}

/// Hand-off between the dispatcher (producer) and transcode workers
/// (consumers).
///
/// Built on a bounded channel with the receiver behind an async mutex:
/// any number of workers can call [`JobQueue::dequeue`] concurrently and
/// each job is delivered to exactly one of them. `enqueue` never blocks
/// past the bounded append; `dequeue` suspends until a job arrives or the
/// queue is closed and drained.
pub struct JobQueue {
    tx: RwLock<Option<mpsc::Sender<TranscodeJob>>>,
    rx: tokio::sync::Mutex<mpsc::Receiver<TranscodeJob>>,
    capacity: usize,
    depth: AtomicUsize,
}

impl JobQueue {
    /// Create a new job queue.
    pub fn new(config: QueueConfig) -> Self {
        let capacity = config.capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx: RwLock::new(Some(tx)),
            rx: tokio::sync::Mutex::new(rx),
            capacity,
            depth: AtomicUsize::new(0),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(QueueConfig::from_env())
    }

    /// Append a job without blocking.
    ///
    /// Fails when the queue is full or closed; the caller decides what to
    /// surface (the dispatcher logs and marks the job failed).
    pub fn enqueue(&self, job: TranscodeJob) -> QueueResult<()> {
        let tx = {
            let guard = self.tx.read().unwrap_or_else(|e| e.into_inner());
            match guard.as_ref() {
                Some(tx) => tx.clone(),
                None => return Err(QueueError::Closed),
            }
        };

        let job_id = job.job_id.clone();
        match tx.try_send(job) {
            Ok(()) => {
                let depth = self.depth.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(job_id = %job_id, depth, "Enqueued job");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(QueueError::Full(self.capacity)),
            Err(TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    /// Take the next job, suspending until one is available.
    ///
    /// Returns `None` once the queue is closed and drained - the shutdown
    /// signal for worker loops.
    pub async fn dequeue(&self) -> Option<TranscodeJob> {
        let mut rx = self.rx.lock().await;
        let job = rx.recv().await;
        if job.is_some() {
            self.depth.fetch_sub(1, Ordering::Relaxed);
        }
        job
    }

    /// Close the queue. Already-queued jobs are still delivered; after the
    /// last one, every blocked `dequeue` returns `None`.
    pub fn close(&self) {
        let mut guard = self.tx.write().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            debug!("Queue closed");
        }
    }

    /// Number of jobs currently queued.
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Video library service.
//!
//! The upload-completion and deletion entry points of the catalog. Creating
//! a video with a source file submits transcode jobs through the dispatcher;
//! deleting a video hands its artifact set to the lifecycle manager. Both
//! dependencies are injected at construction time.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use vflix_media::ArtifactStore;
use vflix_models::{Genre, VideoId, VideoRecord};
use vflix_queue::Dispatcher;

/// Input for creating a video record.
#[derive(Debug, Clone, Default)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub source_path: Option<PathBuf>,
    pub thumbnail_path: Option<PathBuf>,
    pub genre: Option<String>,
}

impl NewVideo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn with_thumbnail(mut self, path: impl Into<PathBuf>) -> Self {
        self.thumbnail_path = Some(path.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }
}

/// In-memory video catalog wired to the transcoding pipeline.
pub struct VideoLibrary {
    records: RwLock<HashMap<VideoId, VideoRecord>>,
    genres: RwLock<BTreeMap<String, Genre>>,
    dispatcher: Arc<Dispatcher>,
    artifacts: ArtifactStore,
}

impl VideoLibrary {
    /// Create a library with injected pipeline dependencies.
    pub fn new(dispatcher: Arc<Dispatcher>, artifacts: ArtifactStore) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            genres: RwLock::new(BTreeMap::new()),
            dispatcher,
            artifacts,
        }
    }

    /// Create a video record and submit transcode jobs for its source.
    ///
    /// Dispatch happens only here, on first creation - never on update.
    /// A dispatch failure is logged and does not fail the create: the
    /// record is already persisted, derived resolutions simply stay absent.
    pub async fn create_video(&self, new: NewVideo) -> VideoRecord {
        let mut record = VideoRecord::new(new.title, new.description);
        if let Some(source) = new.source_path {
            record = record.with_source(source);
        }
        if let Some(thumbnail) = new.thumbnail_path {
            record = record.with_thumbnail(thumbnail);
        }
        if let Some(genre) = new.genre {
            record = record.with_genre(genre);
        }

        self.records
            .write()
            .await
            .insert(record.video_id.clone(), record.clone());
        info!(video_id = %record.video_id, title = %record.title, "Video created");

        if let Some(source) = &record.source_path {
            if let Err(e) = self.dispatcher.submit(source).await {
                error!(
                    video_id = %record.video_id,
                    source = %source.display(),
                    "Transcode dispatch failed: {}", e
                );
            }
        }

        record
    }

    /// Delete a video record and all of its on-disk artifacts.
    ///
    /// Runs regardless of whether conversion ever completed; a derived
    /// file written by a still-running job afterwards is an orphan for a
    /// later cleanup pass. Returns `false` when no such record exists.
    pub async fn delete_video(&self, video_id: &VideoId) -> bool {
        let record = self.records.write().await.remove(video_id);
        match record {
            Some(record) => {
                let outcome = self.artifacts.remove_record_artifacts(&record).await;
                info!(
                    video_id = %video_id,
                    files_deleted = outcome.len(),
                    "Video deleted"
                );
                true
            }
            None => false,
        }
    }

    /// Look up a single record.
    pub async fn video(&self, video_id: &VideoId) -> Option<VideoRecord> {
        self.records.read().await.get(video_id).cloned()
    }

    /// All records, newest first.
    pub async fn videos(&self) -> Vec<VideoRecord> {
        let mut records: Vec<VideoRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Register a genre. Returns `false` if the name is already taken.
    pub async fn add_genre(&self, name: impl Into<String>) -> bool {
        let genre = Genre::new(name);
        let mut genres = self.genres.write().await;
        if genres.contains_key(&genre.name) {
            return false;
        }
        genres.insert(genre.name.clone(), genre);
        true
    }

    /// All genres, sorted by name.
    pub async fn genres(&self) -> Vec<Genre> {
        self.genres.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vflix_models::JobStatus;
    use vflix_queue::{JobBoard, JobQueue, QueueConfig};

    fn fixture(capacity: usize) -> (Arc<JobQueue>, Arc<JobBoard>, VideoLibrary) {
        let queue = Arc::new(JobQueue::new(QueueConfig { capacity }));
        let board = Arc::new(JobBoard::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&queue), Arc::clone(&board)));
        let library = VideoLibrary::new(dispatcher, ArtifactStore::default());
        (queue, board, library)
    }

    #[tokio::test]
    async fn create_with_source_dispatches_jobs() {
        let (queue, board, library) = fixture(16);

        let record = library
            .create_video(NewVideo::new("Movie").with_source("videos/movie.mp4"))
            .await;

        assert!(library.video(&record.video_id).await.is_some());
        assert_eq!(queue.len(), 2);
        assert_eq!(board.jobs_for_source("videos/movie.mp4").await.len(), 2);
    }

    #[tokio::test]
    async fn create_without_source_dispatches_nothing() {
        let (queue, board, library) = fixture(16);

        library.create_video(NewVideo::new("Draft")).await;

        assert!(queue.is_empty());
        assert!(board.all().await.is_empty());
    }

    #[tokio::test]
    async fn dispatch_failure_still_creates_the_record() {
        // Capacity 1 with two resolutions: the second enqueue fails
        let (_queue, board, library) = fixture(1);

        let record = library
            .create_video(NewVideo::new("Movie").with_source("movie.mp4"))
            .await;

        assert!(library.video(&record.video_id).await.is_some());
        let jobs = board.jobs_for_source("movie.mp4").await;
        assert_eq!(
            jobs.iter()
                .filter(|j| j.status == JobStatus::Failed)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn delete_removes_record_and_artifacts() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("movie.mp4");
        let variant = dir.path().join("movie_360p.mp4");
        let thumbnail = dir.path().join("movie.jpg");
        std::fs::write(&source, b"source").unwrap();
        std::fs::write(&variant, b"variant").unwrap();
        std::fs::write(&thumbnail, b"thumb").unwrap();

        let (_queue, _board, library) = fixture(16);
        let record = library
            .create_video(
                NewVideo::new("Movie")
                    .with_source(&source)
                    .with_thumbnail(&thumbnail),
            )
            .await;

        assert!(library.delete_video(&record.video_id).await);
        assert!(library.video(&record.video_id).await.is_none());
        assert!(!source.exists());
        assert!(!variant.exists());
        assert!(!thumbnail.exists());

        // Second delete: record is gone, nothing to do
        assert!(!library.delete_video(&record.video_id).await);
    }

    #[tokio::test]
    async fn genre_registry_rejects_duplicates() {
        let (_queue, _board, library) = fixture(16);

        assert!(library.add_genre("Animation").await);
        assert!(!library.add_genre("Animation").await);
        assert!(library.add_genre("Documentary").await);

        let genres = library.genres().await;
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[0].name, "Animation");
    }
}

//! Artifact lifecycle management.
//!
//! Keeps on-disk state consistent with record deletion: when a video record
//! is removed, the source file and every derived variant (and thumbnail, if
//! any) are deleted best-effort. Missing files are no-ops. A variant written
//! by a still-running job after deletion is a tolerated orphan.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use vflix_models::{Resolution, VideoRecord};

/// Outcome of an artifact cleanup pass.
#[derive(Debug, Default, Clone)]
pub struct RemovedArtifacts {
    /// Files that existed and were deleted
    pub removed: Vec<PathBuf>,
}

impl RemovedArtifacts {
    pub fn len(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Derives and deletes the artifact set belonging to a video record.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    resolutions: Vec<Resolution>,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new(Resolution::DEFAULT_SET)
    }
}

impl ArtifactStore {
    /// Create a store for the given resolution set.
    pub fn new(resolutions: impl Into<Vec<Resolution>>) -> Self {
        Self {
            resolutions: resolutions.into(),
        }
    }

    /// The configured resolution set.
    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    /// Derived variant paths for a source file, one per configured resolution.
    pub fn variant_paths(&self, source: impl AsRef<Path>) -> Vec<PathBuf> {
        let source = source.as_ref();
        self.resolutions
            .iter()
            .map(|r| r.variant_path(source))
            .collect()
    }

    /// Delete the source file and every derived variant.
    ///
    /// Deletion is idempotent: absent files are skipped silently, other IO
    /// errors are logged and skipped. Runs regardless of whether conversion
    /// ever completed.
    pub async fn remove_source_artifacts(&self, source: impl AsRef<Path>) -> RemovedArtifacts {
        let source = source.as_ref();
        let mut targets = self.variant_paths(source);
        targets.push(source.to_path_buf());
        self.remove_files(targets).await
    }

    /// Delete every on-disk artifact belonging to a record: source, derived
    /// variants, and thumbnail.
    pub async fn remove_record_artifacts(&self, record: &VideoRecord) -> RemovedArtifacts {
        let mut targets = Vec::new();
        if let Some(source) = &record.source_path {
            targets.extend(self.variant_paths(source));
            targets.push(source.clone());
        }
        if let Some(thumbnail) = &record.thumbnail_path {
            targets.push(thumbnail.clone());
        }
        self.remove_files(targets).await
    }

    async fn remove_files(&self, targets: Vec<PathBuf>) -> RemovedArtifacts {
        let mut outcome = RemovedArtifacts::default();

        for path in targets {
            match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed artifact");
                    outcome.removed.push(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), "Failed to remove artifact: {}", e);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn removes_source_and_existing_variants() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("movie.mp4");
        let variant_360 = dir.path().join("movie_360p.mp4");

        // 720p job still pending: only the source and the 360p variant exist
        std::fs::write(&source, b"source").unwrap();
        std::fs::write(&variant_360, b"variant").unwrap();

        let store = ArtifactStore::default();
        let outcome = store.remove_source_artifacts(&source).await;

        assert_eq!(outcome.len(), 2);
        assert!(!source.exists());
        assert!(!variant_360.exists());
    }

    #[tokio::test]
    async fn deletion_of_absent_files_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("gone.mp4");

        let store = ArtifactStore::default();
        let outcome = store.remove_source_artifacts(&source).await;
        assert!(outcome.is_empty());

        // Running it again is just as harmless
        let outcome = store.remove_source_artifacts(&source).await;
        assert!(outcome.is_empty());
    }

    #[tokio::test]
    async fn record_cleanup_includes_thumbnail() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("movie.mp4");
        let thumbnail = dir.path().join("movie.jpg");
        std::fs::write(&source, b"source").unwrap();
        std::fs::write(&thumbnail, b"thumb").unwrap();

        let record = VideoRecord::new("Movie", "")
            .with_source(&source)
            .with_thumbnail(&thumbnail);

        let store = ArtifactStore::default();
        let outcome = store.remove_record_artifacts(&record).await;

        assert_eq!(outcome.len(), 2);
        assert!(!source.exists());
        assert!(!thumbnail.exists());
    }

    #[tokio::test]
    async fn record_without_files_removes_nothing() {
        let record = VideoRecord::new("No files", "");
        let store = ArtifactStore::default();
        let outcome = store.remove_record_artifacts(&record).await;
        assert!(outcome.is_empty());
    }

    #[test]
    fn variant_paths_cover_configured_set() {
        let store = ArtifactStore::new([Resolution::P360, Resolution::P720, Resolution::P1080]);
        let paths = store.variant_paths("movie.mp4");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("movie_360p.mp4"),
                PathBuf::from("movie_720p.mp4"),
                PathBuf::from("movie_1080p.mp4"),
            ]
        );
    }
}

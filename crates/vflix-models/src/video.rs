//! Video catalog models.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a video record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
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

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named video category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Genre {
    /// Unique genre name
    pub name: String,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A video in the catalog.
///
/// Created on upload; file fields never change after creation. Deleting a
/// record also removes its on-disk artifacts (source, derived variants,
/// thumbnail).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// Unique video ID
    pub video_id: VideoId,

    /// Video title
    pub title: String,

    /// Video description
    #[serde(default)]
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Path to the uploaded source file, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,

    /// Path to the thumbnail file, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,

    /// Genre name, if assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl VideoRecord {
    /// Create a new record with no files attached.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            video_id: VideoId::new(),
            title: title.into(),
            description: description.into(),
            created_at: Utc::now(),
            source_path: None,
            thumbnail_path: None,
            genre: None,
        }
    }

    /// Attach the uploaded source file.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Attach a thumbnail file.
    pub fn with_thumbnail(mut self, path: impl Into<PathBuf>) -> Self {
        self.thumbnail_path = Some(path.into());
        self
    }

    /// Assign a genre.
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }
}

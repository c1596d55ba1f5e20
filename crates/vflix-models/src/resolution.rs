//! Target resolutions and derived artifact paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File extension for every derived variant, regardless of source container.
pub const VARIANT_EXTENSION: &str = "mp4";

/// A fixed target resolution for transcoding.
///
/// Each resolution maps to an FFmpeg size argument. The derived file for a
/// `(source, resolution)` pair is a pure function of both, so variants never
/// need their own storage table - they can always be recomputed or probed
/// on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Resolution {
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    /// Every resolution the encoder knows how to produce.
    pub const ALL: [Resolution; 3] = [Resolution::P360, Resolution::P720, Resolution::P1080];

    /// The default set jobs are dispatched for. 1080p is supported but not
    /// enabled by default.
    pub const DEFAULT_SET: [Resolution; 2] = [Resolution::P360, Resolution::P720];

    /// Human-readable label, also used in derived file names.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::P360 => "360p",
            Resolution::P720 => "720p",
            Resolution::P1080 => "1080p",
        }
    }

    /// FFmpeg `-s` size argument for this resolution.
    pub fn geometry(&self) -> &'static str {
        match self {
            Resolution::P360 => "640x360",
            Resolution::P720 => "hd720",
            Resolution::P1080 => "hd1080",
        }
    }

    /// Derived artifact path for a source file at this resolution.
    ///
    /// Strips the source extension, appends `_{label}` and restores the
    /// fixed variant extension: `movie.mp4` -> `movie_360p.mp4`.
    pub fn variant_path(&self, source: impl AsRef<Path>) -> PathBuf {
        let source = source.as_ref();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        source.with_file_name(format!("{}_{}.{}", stem, self.label(), VARIANT_EXTENSION))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Error returned when parsing an unknown resolution label.
#[derive(Debug, Error)]
#[error("Unknown resolution: {0}")]
pub struct ResolutionParseError(pub String);

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "360p" => Ok(Resolution::P360),
            "720p" => Ok(Resolution::P720),
            "1080p" => Ok(Resolution::P1080),
            other => Err(ResolutionParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_path_is_deterministic() {
        let a = Resolution::P360.variant_path("videos/movie.mp4");
        let b = Resolution::P360.variant_path("videos/movie.mp4");
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("videos/movie_360p.mp4"));
    }

    #[test]
    fn variant_paths_are_distinct_per_resolution() {
        let source = "movie.mp4";
        let paths: Vec<PathBuf> = Resolution::ALL
            .iter()
            .map(|r| r.variant_path(source))
            .collect();
        for (i, a) in paths.iter().enumerate() {
            for b in &paths[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn variant_path_replaces_source_extension() {
        assert_eq!(
            Resolution::P720.variant_path("clips/raw.mov"),
            PathBuf::from("clips/raw_720p.mp4")
        );
    }

    #[test]
    fn variant_path_handles_missing_extension() {
        assert_eq!(
            Resolution::P360.variant_path("movie"),
            PathBuf::from("movie_360p.mp4")
        );
    }

    #[test]
    fn geometry_mapping() {
        assert_eq!(Resolution::P360.geometry(), "640x360");
        assert_eq!(Resolution::P720.geometry(), "hd720");
        assert_eq!(Resolution::P1080.geometry(), "hd1080");
    }

    #[test]
    fn default_set_excludes_1080p() {
        assert!(!Resolution::DEFAULT_SET.contains(&Resolution::P1080));
        assert_eq!(Resolution::DEFAULT_SET.len(), 2);
    }

    #[test]
    fn label_round_trips_through_from_str() {
        for r in Resolution::ALL {
            assert_eq!(r.label().parse::<Resolution>().unwrap(), r);
        }
        assert!("480p".parse::<Resolution>().is_err());
    }
}

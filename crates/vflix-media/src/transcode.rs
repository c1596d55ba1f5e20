//! Per-resolution transcode operation.

use std::path::{Path, PathBuf};

use tracing::info;

use vflix_models::{EncodingConfig, Resolution};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Settings for the transcode operation.
#[derive(Debug, Clone)]
pub struct TranscodeSettings {
    /// Encoder binary name or path
    pub ffmpeg_bin: String,
    /// Codec/quality settings shared by all variants
    pub encoding: EncodingConfig,
    /// Per-encode timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            encoding: EncodingConfig::default(),
            timeout_secs: None,
        }
    }
}

impl TranscodeSettings {
    /// Create settings from environment variables.
    pub fn from_env() -> Self {
        Self {
            ffmpeg_bin: std::env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string()),
            encoding: EncodingConfig::default(),
            timeout_secs: std::env::var("TRANSCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}

/// Produces resolution variants of a source file with an external encoder.
#[derive(Debug, Clone)]
pub struct Transcoder {
    settings: TranscodeSettings,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new(TranscodeSettings::default())
    }
}

impl Transcoder {
    /// Create a transcoder with the given settings.
    pub fn new(settings: TranscodeSettings) -> Self {
        Self { settings }
    }

    /// Create a transcoder from environment variables.
    pub fn from_env() -> Self {
        Self::new(TranscodeSettings::from_env())
    }

    /// The derived file a transcode of `source` at `resolution` produces.
    pub fn output_path(&self, source: impl AsRef<Path>, resolution: Resolution) -> PathBuf {
        resolution.variant_path(source)
    }

    /// Encode `source` into its variant at `resolution`.
    ///
    /// Blocks (asynchronously) for the duration of the encoder process.
    /// Returns the derived file path on success. A zero exit status with no
    /// output file present is still an error.
    pub async fn transcode(
        &self,
        source: impl AsRef<Path>,
        resolution: Resolution,
    ) -> MediaResult<PathBuf> {
        let source = source.as_ref();
        let output = resolution.variant_path(source);

        let cmd = FfmpegCommand::new(source, &output)
            .size(resolution.geometry())
            .output_args(self.settings.encoding.to_ffmpeg_args());

        let mut runner = FfmpegRunner::new().with_program(&self.settings.ffmpeg_bin);
        if let Some(secs) = self.settings.timeout_secs {
            runner = runner.with_timeout(secs);
        }

        runner.run(&cmd).await?;

        if !tokio::fs::try_exists(&output).await? {
            return Err(MediaError::OutputMissing(output));
        }

        info!(
            source = %source.display(),
            output = %output.display(),
            resolution = %resolution,
            "Transcode complete"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Writes a stand-in encoder script that touches its last argument,
    /// or fails when the output name contains "broken".
    #[cfg(unix)]
    fn stub_encoder(dir: &TempDir) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-ffmpeg");
        std::fs::write(
            &path,
            "#!/bin/sh\nfor arg in \"$@\"; do out=\"$arg\"; done\ncase \"$out\" in\n  *broken*) echo \"conversion failed\" >&2; exit 1 ;;\nesac\n: > \"$out\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    fn stub_transcoder(dir: &TempDir) -> Transcoder {
        Transcoder::new(TranscodeSettings {
            ffmpeg_bin: stub_encoder(dir),
            ..Default::default()
        })
    }

    #[test]
    fn output_path_matches_naming_scheme() {
        let transcoder = Transcoder::default();
        assert_eq!(
            transcoder.output_path("videos/movie.mp4", Resolution::P360),
            PathBuf::from("videos/movie_360p.mp4")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_encode_produces_variant_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("movie.mp4");
        std::fs::write(&source, b"source bytes").unwrap();

        let transcoder = stub_transcoder(&dir);
        let output = transcoder
            .transcode(&source, Resolution::P360)
            .await
            .unwrap();

        assert_eq!(output, dir.path().join("movie_360p.mp4"));
        assert!(output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_encode_reports_stderr_and_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.mp4");
        std::fs::write(&source, b"source bytes").unwrap();

        let transcoder = stub_transcoder(&dir);
        let err = transcoder
            .transcode(&source, Resolution::P720)
            .await
            .unwrap_err();

        match err {
            MediaError::FfmpegFailed {
                stderr: Some(stderr),
                exit_code: Some(code),
                ..
            } => {
                assert!(stderr.contains("conversion failed"));
                assert_eq!(code, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dir.path().join("broken_720p.mp4").exists());
    }

    #[tokio::test]
    async fn missing_encoder_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("movie.mp4");
        std::fs::write(&source, b"source bytes").unwrap();

        let transcoder = Transcoder::new(TranscodeSettings {
            ffmpeg_bin: "no-such-encoder-binary".to_string(),
            ..Default::default()
        });
        let err = transcoder
            .transcode(&source, Resolution::P360)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::EncoderNotFound(_)));
    }
}

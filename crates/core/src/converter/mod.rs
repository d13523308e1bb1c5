//! Audio transcode glue around the external ffmpeg binary.
//!
//! Soulseek peers often only carry lossless rips; the sweep turns every
//! downloaded .flac into an mp3 next to the original. All codec work
//! happens in ffmpeg, not in-process.

mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the transcode glue.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The ffmpeg binary could not be spawned.
    #[error("ffmpeg binary not found: {0}")]
    FfmpegNotFound(String),

    /// ffmpeg exited with a failure status.
    #[error("conversion failed: {0}")]
    ConversionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings for the transcode sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Directory scanned for .flac files (the slskd download root).
    pub downloads_dir: PathBuf,
    /// Target mp3 bitrate in kbit/s.
    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,
    /// ffmpeg binary to invoke.
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,
}

fn default_bitrate() -> u32 {
    320
}

fn default_ffmpeg_bin() -> String {
    "ffmpeg".to_string()
}

/// A transcoder producing mp3 files from lossless sources.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Transcoder name for logging.
    fn name(&self) -> &str;

    /// Transcode one file.
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), ConverterError>;
}

/// Output path for a flac input: same location, .mp3 extension.
pub fn mp3_output_path(input: &Path) -> PathBuf {
    input.with_extension("mp3")
}

/// Recursively collect .flac files under a directory, sorted for a stable
/// sweep order.
pub fn collect_flac_files(dir: &Path) -> Result<Vec<PathBuf>, ConverterError> {
    let mut files = Vec::new();
    collect_into(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ConverterError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_into(&path, files)?;
        } else if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("flac"))
        {
            files.push(path);
        }
    }
    Ok(())
}

/// Convert every .flac under `dir`, continuing past per-file failures.
///
/// Returns the number of files converted.
pub async fn convert_directory(
    transcoder: &dyn AudioTranscoder,
    dir: &Path,
) -> Result<usize, ConverterError> {
    let flac_files = collect_flac_files(dir)?;
    info!(
        count = flac_files.len(),
        dir = %dir.display(),
        "starting transcode sweep"
    );

    let mut converted = 0;
    for input in &flac_files {
        let output = mp3_output_path(input);
        match transcoder.transcode(input, &output).await {
            Ok(()) => {
                info!(input = %input.display(), output = %output.display(), "converted");
                converted += 1;
            }
            Err(e) => {
                warn!(input = %input.display(), error = %e, "conversion failed, continuing");
            }
        }
    }

    Ok(converted)
}

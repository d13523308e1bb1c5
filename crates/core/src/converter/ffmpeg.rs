//! FFmpeg-based transcoder implementation.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{AudioTranscoder, ConverterConfig, ConverterError};

/// Transcoder shelling out to the ffmpeg binary.
pub struct FfmpegTranscoder {
    config: ConverterConfig,
}

impl FfmpegTranscoder {
    /// Create a transcoder with the given settings.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Builds ffmpeg arguments for a single conversion.
    fn build_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(), // overwrite output
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-b:a".to_string(),
            format!("{}k", self.config.bitrate_kbps),
            "-loglevel".to_string(),
            "error".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), ConverterError> {
        let args = self.build_args(input, output);
        debug!(bin = %self.config.ffmpeg_bin, ?args, "invoking ffmpeg");

        let child = Command::new(&self.config.ffmpeg_bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ConverterError::FfmpegNotFound(self.config.ffmpeg_bin.clone())
                }
                _ => ConverterError::Io(e),
            })?;

        let result = child.wait_with_output().await?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ConverterError::ConversionFailed(
                stderr.chars().take(500).collect(),
            ));
        }
        Ok(())
    }
}

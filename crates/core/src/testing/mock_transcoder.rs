//! Mock transcoder for testing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::converter::{AudioTranscoder, ConverterError};

/// Transcoder that records calls instead of running ffmpeg.
#[derive(Debug, Default)]
pub struct MockTranscoder {
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    fail_inputs: Mutex<HashSet<PathBuf>>,
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make conversions of the given input fail.
    pub fn fail_for(&self, input: &Path) {
        self.fail_inputs.lock().unwrap().insert(input.to_path_buf());
    }

    /// (input, output) pairs in call order.
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioTranscoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), ConverterError> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));

        if self.fail_inputs.lock().unwrap().contains(input) {
            return Err(ConverterError::ConversionFailed(
                "injected failure".to_string(),
            ));
        }
        Ok(())
    }
}

//! Testing utilities and mock implementations for the integration suite.
//!
//! Mocks for every external collaborator trait, so acquisition runs can
//! be exercised without a slskd daemon, a database file, or ffmpeg.

mod mock_ledger;
mod mock_slskd;
mod mock_transcoder;

pub use mock_ledger::MemoryLedger;
pub use mock_slskd::{MockSoulseek, RecordedEnqueue};
pub use mock_transcoder::MockTranscoder;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::Track;
    use crate::matcher::QualityTier;
    use crate::slskd::{FileListing, Offer};

    /// Create a test track.
    pub fn track(id: &str, title: &str, artists: &[&str]) -> Track {
        Track::new(
            id,
            title,
            artists.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create a file listing; a zero bitrate models an unreported one.
    pub fn listing(filename: &str, bitrate: u32) -> FileListing {
        FileListing {
            filename: filename.to_string(),
            size: 1024 * 1024 * 8,
            bit_rate: if bitrate == 0 { None } else { Some(bitrate) },
            extension: None,
        }
    }

    /// Create one peer's offer.
    pub fn offer(username: &str, files: Vec<FileListing>) -> Offer {
        Offer {
            username: username.to_string(),
            file_count: files.len() as u32,
            files,
        }
    }

    /// Create a quality tier.
    pub fn tier(extension: &str, min_bitrate: u32) -> QualityTier {
        QualityTier::new(extension, min_bitrate)
    }
}

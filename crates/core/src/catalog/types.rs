//! Types for wanted tracks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wanted track as produced by the upstream catalog.
///
/// Immutable once produced; `id` is the stable key used for dedup against
/// the download ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Stable catalog identifier.
    pub id: String,
    /// Track title.
    pub title: String,
    /// Artist names, in catalog order.
    pub artists: Vec<String>,
}

impl Track {
    /// Create a new track descriptor.
    pub fn new(id: impl Into<String>, title: impl Into<String>, artists: Vec<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists,
        }
    }

    /// The string sent as the search query and scored against filenames:
    /// the title followed by the artist names, space-separated.
    ///
    /// `None` when the title is blank or no artist name is usable; such a
    /// track cannot be searched for.
    pub fn match_string(&self) -> Option<String> {
        let title = self.title.trim();
        let artists: Vec<&str> = self
            .artists
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();

        if title.is_empty() || artists.is_empty() {
            return None;
        }

        Some(format!("{} {}", title, artists.join(" ")))
    }
}

/// Errors reading a track source.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read want-list: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed want-list: {0}")]
    Parse(String),
}

/// A source of wanted tracks (a playlist, a local file, ...).
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Fetch the full list of wanted tracks.
    async fn tracks(&self) -> Result<Vec<Track>, CatalogError>;
}

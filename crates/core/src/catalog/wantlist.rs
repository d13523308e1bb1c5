//! JSON file want-list source.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{CatalogError, Track, TrackSource};

/// Want-list backed by a local JSON file containing an array of tracks.
///
/// This is the CLI's concrete input; a remote playlist provider would be
/// another `TrackSource` implementation behind the same seam.
pub struct JsonWantList {
    path: PathBuf,
}

impl JsonWantList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TrackSource for JsonWantList {
    fn name(&self) -> &str {
        "json-wantlist"
    }

    async fn tracks(&self) -> Result<Vec<Track>, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&raw).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

//! Types for the slskd search/transfer API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State of a remote search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    /// Accepted by the daemon, not yet running.
    Pending,
    /// Running; responses may still arrive.
    InProgress,
    /// Terminal; responses can be fetched.
    Completed,
    /// Terminal; the daemon gave up on the search.
    Failed,
}

impl SearchState {
    /// Whether the session will make no further progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchState::Completed | SearchState::Failed)
    }

    /// Parse the daemon's state string.
    ///
    /// slskd reports completion as a comma-joined flag set
    /// ("Completed, TimedOut", "Completed, ResponseLimitReached", ...);
    /// any state carrying the Completed flag is terminal and its responses
    /// can be fetched. Unknown strings are rejected at this boundary
    /// rather than guessed at.
    pub fn parse(raw: &str) -> Result<Self, SlskdError> {
        if raw.contains("Completed") {
            return Ok(SearchState::Completed);
        }
        match raw.trim() {
            "None" | "Pending" | "Requested" => Ok(SearchState::Pending),
            "InProgress" => Ok(SearchState::InProgress),
            "Cancelled" | "Errored" | "TimedOut" => Ok(SearchState::Failed),
            other => Err(SlskdError::InvalidResponse(format!(
                "unknown search state {:?}",
                other
            ))),
        }
    }
}

/// A single file advertised by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListing {
    /// Full remote path as listed by the peer.
    pub filename: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Encoded bitrate in kbit/s; absent when the peer did not report one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u32>,
    /// Container extension as reported by the peer; often blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl FileListing {
    /// Lowercased extension, from the listing field when the peer reported
    /// one, otherwise derived from the filename suffix.
    pub fn ext(&self) -> Option<String> {
        if let Some(ext) = &self.extension {
            let ext = ext.trim().trim_start_matches('.');
            if !ext.is_empty() {
                return Some(ext.to_ascii_lowercase());
            }
        }
        // Remote paths are usually Windows-style ("@@abc\\Music\\x.mp3")
        let basename = self
            .filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.filename);
        match basename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
                Some(ext.to_ascii_lowercase())
            }
            _ => None,
        }
    }

    /// Reported bitrate, zero when unknown.
    pub fn bitrate(&self) -> u32 {
        self.bit_rate.unwrap_or(0)
    }
}

/// One peer's response to a search: zero or more file listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Peer handle the files can be requested from.
    pub username: String,
    /// Number of files the peer reported.
    #[serde(default)]
    pub file_count: u32,
    /// The advertised files.
    #[serde(default)]
    pub files: Vec<FileListing>,
}

/// Errors that can occur talking to the slskd daemon.
#[derive(Debug, Error)]
pub enum SlskdError {
    /// The search text was empty.
    #[error("search query must not be empty")]
    InvalidQuery,

    /// Network or authentication failure.
    #[error("slskd transport error: {0}")]
    Transport(String),

    /// The daemon no longer knows the session (expired or never existed).
    #[error("search session not found: {0}")]
    NotFound(String),

    /// The daemon answered outside the expected schema.
    #[error("malformed slskd response: {0}")]
    InvalidResponse(String),
}

/// Client for the slskd search/transfer daemon.
#[async_trait]
pub trait SoulseekClient: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &str;

    /// Start a search and return the session id.
    async fn start_search(&self, query: &str) -> Result<String, SlskdError>;

    /// Single non-blocking check of a search session's state. Repeated
    /// polling is the caller's responsibility.
    async fn search_state(&self, id: &str) -> Result<SearchState, SlskdError>;

    /// Fetch the responses of a completed search. Empty when no peer
    /// answered.
    async fn search_responses(&self, id: &str) -> Result<Vec<Offer>, SlskdError>;

    /// Ask the daemon to start downloading a file from a peer.
    ///
    /// Fire-and-forget: a successful return means the transfer was queued,
    /// not that it will complete.
    async fn enqueue_download(&self, username: &str, file: &FileListing)
        -> Result<(), SlskdError>;
}

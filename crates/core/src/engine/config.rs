//! Acquisition engine configuration.

use serde::{Deserialize, Serialize};

use crate::matcher::{default_tiers, QualityTier};

/// Configuration for the acquisition engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds to sleep between search-state polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Upper bound on the wait for a single search to reach a terminal
    /// state. A search still running past this is abandoned for the tier.
    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,

    /// Acceptance tiers, tried strictly in order per track.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<QualityTier>,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_search_timeout() -> u64 {
    120
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            search_timeout_secs: default_search_timeout(),
            tiers: default_tiers(),
        }
    }
}

//! Soulseek search/transfer abstraction.
//!
//! This module provides a `SoulseekClient` trait over the slskd daemon's
//! HTTP API: start a search, poll its state, fetch peer responses, and
//! enqueue a transfer. The daemon owns the peer-to-peer protocol; nothing
//! here speaks Soulseek directly.

mod client;
mod types;

pub use client::SlskdClient;
pub use types::{FileListing, Offer, SearchState, SlskdError, SoulseekClient};

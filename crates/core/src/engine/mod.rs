//! The acquisition engine.
//!
//! Per track: iterate the quality tiers, search the network and wait for
//! results, score and rank the candidate files, and hand the best one to
//! the transfer queue. This is the only part of the system with real
//! decision-making and failure policy; everything it touches (daemon,
//! ledger, event sink) sits behind a trait.

mod config;
mod runner;
mod types;

pub use config::EngineConfig;
pub use runner::AcquisitionEngine;
pub use types::{AcquireReport, CancellationToken};

//! Acquisition outcome events.
//!
//! The engine reports outcomes through an event stream rather than
//! printing or returning them; the CLI (or a test collector) attaches to
//! the receiving end.

mod handle;
mod types;

pub use handle::{EventEnvelope, EventHandle};
pub use types::{AcquisitionEvent, MissReason, TierMissReason};

//! Track descriptors and want-list input.
//!
//! A `Track` is what the upstream catalog says we want; where the list
//! comes from is hidden behind the `TrackSource` seam so the engine never
//! talks to a playlist provider directly.

mod types;
mod wantlist;

pub use types::{CatalogError, Track, TrackSource};
pub use wantlist::JsonWantList;

//! Stats translation engine
//!
//! Turns upstream absolute byte counters into monotonically increasing
//! exported counters, surviving upstream resets and a changing user set.

pub mod delta;
pub mod error;
pub mod fetcher;
pub mod poller;
pub mod state;
pub mod types;

pub use delta::{apply_snapshot, counter_delta, ApplyReport};
pub use error::{FetchError, FetchResult};
pub use fetcher::{HttpSnapshotSource, SnapshotSource};
pub use poller::Poller;
pub use state::SeriesStore;
pub use types::{Category, Direction, Snapshot, TrafficCounters};

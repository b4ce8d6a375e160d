// Progress tracking.
// Implements: the per-learner week list, its snapshot persistence, and the
// HTTP handlers that expose toggling and project links.

pub mod handlers;
pub mod registry;
pub mod store;
pub mod tracker;

pub use registry::TrackerRegistry;
pub use store::{MemorySnapshotStore, RedisSnapshotStore, SnapshotStore};
pub use tracker::{ProgressView, TrackerError};

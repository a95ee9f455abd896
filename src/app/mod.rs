//! Coordination around the core operations.
//!
//! - [`KeyedSerializer`] - per-key FIFO serialization of async calls
//! - [`DirtyTracker`] / [`spawn_dirty_listener`] - dirty-bit resync driven by
//!   server pushes

mod dirty;
mod keyed_buffer;

pub use dirty::{spawn_dirty_listener, DirtyOutcome, DirtyState, DirtyTracker, DIRTY_ROUTE};
pub use keyed_buffer::KeyedSerializer;

//! Cache Module
//!
//! Tagged read-through caching: memoized async reads keyed by function
//! identity and arguments, invalidated by tag after writes.

mod entry;
mod key;
mod lru;
mod stats;
mod store;
mod tag;
mod tagged;


// Re-export public types
pub use entry::CacheEntry;
pub use key::CacheKey;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{FetchGuard, TagStore};
pub use tag::{Owned, Resource, ResourceKind, Tag};
pub use tagged::{Cached, TaggedCache};

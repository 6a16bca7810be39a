//! Wordbook - vocabulary lists with a shared space, served over a tagged
//! read-through cache.
//!
//! Reads are memoized per function and arguments and tagged with the scopes
//! they depend on; writes invalidate the scopes derived from the rows they
//! touch.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::TaggedCache;
pub use config::Config;
pub use tasks::spawn_cleanup_task;

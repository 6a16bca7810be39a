//! Tagged Read-Through Cache
//!
//! Wraps async lookups so repeated calls with equal arguments are memoized,
//! and drops memoized results by tag after writes.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheStats, Owned, Resource, Tag, TagStore};
use crate::config::Config;

// == Tagged Cache ==
/// Shared handle to one isolated cache instance.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct TaggedCache {
    store: Arc<RwLock<TagStore>>,
    disposed: Arc<AtomicBool>,
}

impl TaggedCache {
    // == Lifecycle ==
    /// Creates a new cache instance from configuration.
    pub fn create(config: &Config) -> Self {
        Self::new(config.max_entries, config.ttl())
    }

    /// Creates a new cache instance.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity before LRU eviction kicks in
    /// * `ttl` - Optional revalidate TTL in seconds
    pub fn new(max_entries: usize, ttl: Option<u64>) -> Self {
        Self {
            store: Arc::new(RwLock::new(TagStore::new(max_entries, ttl))),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Drops every entry and turns this instance into a pass-through.
    ///
    /// Calls made after disposal always run the underlying fetch.
    pub async fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        let removed = self.store.write().await.clear();
        debug!(removed, "cache disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Shared store, for background maintenance.
    pub fn store(&self) -> Arc<RwLock<TagStore>> {
        self.store.clone()
    }

    // == Wrap ==
    /// Returns `fetch` wrapped in this cache under function identity `name`.
    pub fn wrap<F>(&self, name: &'static str, tags: Vec<Tag>, fetch: F) -> Cached<F> {
        Cached {
            cache: self.clone(),
            name,
            tags,
            fetch,
        }
    }

    // == Get Or Fetch ==
    /// Returns the memoized result for (`name`, `args`) or runs `fetch`.
    ///
    /// On success the result is stored under `tags` plus `*`. Errors from
    /// `fetch` are returned as-is and nothing is stored. Cache-layer
    /// failures fall back to calling `fetch` directly.
    pub async fn get_or_fetch<A, T, E, F, Fut>(
        &self,
        name: &'static str,
        tags: &[Tag],
        args: A,
        fetch: F,
    ) -> Result<T, E>
    where
        A: Serialize,
        T: Clone + Send + Sync + 'static,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if self.is_disposed() {
            return fetch(args).await;
        }

        let key = match CacheKey::new(name, &args) {
            Ok(key) => key,
            Err(err) => {
                warn!(error = %err, "cache unavailable, fetching directly");
                return fetch(args).await;
            }
        };

        // Held until the insert below, or dropped if this future is cancelled
        let fetching = {
            let mut store = self.store.write().await;
            match store.get::<T>(&key) {
                Ok(Some(value)) => {
                    debug!(%key, "cache hit");
                    return Ok(value);
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "cache read failed, fetching directly"),
            }
            store.begin_fetch()
        };

        debug!(%key, "cache miss");
        match fetch(args).await {
            Ok(value) => {
                if !self.is_disposed() {
                    let stored = self.store.write().await.insert(
                        key.clone(),
                        Arc::new(value.clone()),
                        tags.to_vec(),
                        fetching.since(),
                    );
                    if !stored {
                        debug!(%key, "fetched value not cached");
                    }
                }
                Ok(value)
            }
            Err(err) => {
                self.store.write().await.record_fetch_error();
                Err(err)
            }
        }
    }

    // == Invalidate ==
    /// Drops every entry registered under `tag`. Unknown tags are a no-op.
    pub async fn invalidate(&self, tag: &Tag) {
        let removed = self.store.write().await.invalidate(tag);
        debug!(%tag, removed, "invalidated tag");
    }

    /// Invalidates every scope a resource expands to.
    pub async fn invalidate_resource(&self, resource: &Resource) {
        self.invalidate_tags(resource.tags()).await;
    }

    /// Invalidates every resource a written row belongs to.
    pub async fn invalidate_for<O: Owned + ?Sized>(&self, row: &O) {
        let tags = row.resources().iter().flat_map(Resource::tags).collect();
        self.invalidate_tags(tags).await;
    }

    /// Full flush.
    pub async fn clear(&self) {
        let removed = self.store.write().await.clear();
        debug!(removed, "cache cleared");
    }

    async fn invalidate_tags(&self, tags: Vec<Tag>) {
        let mut unique: Vec<Tag> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }

        let mut store = self.store.write().await;
        for tag in &unique {
            let removed = store.invalidate(tag);
            debug!(%tag, removed, "invalidated tag");
        }
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

// == Cached ==
/// A fetch function bound to a cache, a function identity and a tag list.
pub struct Cached<F> {
    cache: TaggedCache,
    name: &'static str,
    tags: Vec<Tag>,
    fetch: F,
}

impl<F> Cached<F> {
    /// Calls the wrapped function through the cache.
    pub async fn call<A, T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        A: Serialize,
        T: Clone + Send + Sync + 'static,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cache
            .get_or_fetch(self.name, &self.tags, args, &self.fetch)
            .await
    }
}

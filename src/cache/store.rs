//! Tag Store Module
//!
//! Entry storage plus the tag → keys index used by invalidation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use crate::cache::entry::CachedValue;
use crate::cache::{CacheEntry, CacheKey, CacheStats, LruTracker, Tag};
use crate::error::CacheError;

// == Tag Store ==
/// Memoized values indexed by key and by tag.
///
/// Every invalidation advances `generation` and records it against the
/// invalidated tag. A value fetched after a miss is only stored if none of
/// its tags were invalidated since the generation observed at miss time.
///
/// Epochs are only kept while a fetch that could still observe them is in
/// flight, so `invalidated_at` never outgrows the invalidations issued
/// during the oldest running fetch.
#[derive(Debug)]
pub struct TagStore {
    /// Key-value storage
    entries: HashMap<CacheKey, CacheEntry>,
    /// Tag to keys currently registered under it
    tag_index: HashMap<Tag, HashSet<CacheKey>>,
    /// Generation at which each tag was last invalidated
    invalidated_at: HashMap<Tag, u64>,
    generation: u64,
    /// Generations observed by fetches still running
    in_flight: InFlight,
    /// LRU access tracker
    lru: LruTracker<CacheKey>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL in seconds applied to new entries
    ttl: Option<u64>,
}

impl TagStore {
    // == Constructor ==
    /// Creates a new TagStore.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the store can hold
    /// * `ttl` - Optional TTL in seconds for every entry
    pub fn new(max_entries: usize, ttl: Option<u64>) -> Self {
        Self {
            entries: HashMap::new(),
            tag_index: HashMap::new(),
            invalidated_at: HashMap::new(),
            generation: 0,
            in_flight: InFlight::default(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            ttl,
        }
    }

    /// Current invalidation generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Registers a fetch starting at the current generation.
    ///
    /// Invalidations are remembered until the returned guard is dropped,
    /// so pass `guard.since()` to `insert` while still holding it.
    pub fn begin_fetch(&mut self) -> FetchGuard {
        self.prune_epochs();
        self.in_flight.enter(self.generation)
    }

    /// Number of tags with a recorded invalidation epoch.
    pub fn epochs(&self) -> usize {
        self.invalidated_at.len()
    }

    // == Get ==
    /// Looks up a live entry and returns its value as `T`.
    ///
    /// Expired entries are removed and counted as misses. A value of the
    /// wrong type is reported as an error and also counted as a miss.
    pub fn get<T: Clone + 'static>(&mut self, key: &CacheKey) -> Result<Option<T>, CacheError> {
        let value = match self.entries.get(key) {
            None => None,
            Some(entry) if entry.is_expired() => {
                self.remove_entry(key);
                None
            }
            Some(entry) => match entry.value::<T>() {
                Some(value) => Some(value),
                None => {
                    self.stats.record_miss();
                    return Err(CacheError::TypeMismatch(key.to_string()));
                }
            },
        };

        match value {
            Some(value) => {
                self.stats.record_hit();
                self.lru.touch(key);
                Ok(Some(value))
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Insert ==
    /// Stores a fetched value under `key`, tagged with `tags` and `*`.
    ///
    /// Returns false when the value was not stored: one of its tags was
    /// invalidated after generation `since`, or capacity is zero.
    pub fn insert(
        &mut self,
        key: CacheKey,
        value: CachedValue,
        mut tags: Vec<Tag>,
        since: u64,
    ) -> bool {
        if !tags.contains(&Tag::All) {
            tags.push(Tag::All);
        }

        let stale = tags.iter().any(|tag| {
            self.invalidated_at
                .get(tag)
                .is_some_and(|generation| *generation > since)
        });
        if stale {
            self.stats.record_stale_discard();
            return false;
        }

        if self.max_entries == 0 {
            return false;
        }

        // Re-registering replaces the old tag set
        if self.entries.contains_key(&key) {
            self.remove_entry(&key);
        } else if self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.remove_entry(&evicted);
                self.stats.record_eviction();
            }
        }

        for tag in &tags {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
        self.lru.touch(&key);
        self.entries
            .insert(key, CacheEntry::new(value, tags, self.ttl));
        self.stats.set_total_entries(self.entries.len());

        true
    }

    // == Invalidate ==
    /// Drops every entry registered under `tag`.
    ///
    /// Returns the number of entries removed. A tag nothing was registered
    /// under still opens a new epoch for it.
    pub fn invalidate(&mut self, tag: &Tag) -> usize {
        self.generation += 1;
        self.prune_epochs();
        if !self.in_flight.is_empty() {
            self.invalidated_at.insert(tag.clone(), self.generation);
        }
        self.stats.record_invalidation();

        let removed = match self.tag_index.remove(tag) {
            Some(keys) => keys
                .into_iter()
                .filter(|key| self.remove_entry(key).is_some())
                .count(),
            None => 0,
        };

        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Full flush through the catch-all tag.
    pub fn clear(&mut self) -> usize {
        let removed = self.invalidate(&Tag::All);
        self.entries.clear();
        self.tag_index.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
        removed
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            self.remove_entry(&key);
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    pub fn record_fetch_error(&mut self) {
        self.stats.record_fetch_error();
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys currently registered under `tag`.
    pub fn tagged(&self, tag: &Tag) -> usize {
        self.tag_index.get(tag).map_or(0, HashSet::len)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets epochs no running fetch started before.
    fn prune_epochs(&mut self) {
        match self.in_flight.oldest() {
            None => self.invalidated_at.clear(),
            Some(oldest) => self.invalidated_at.retain(|_, generation| *generation > oldest),
        }
    }

    /// Removes an entry and unlinks it from the index and LRU order.
    fn remove_entry(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        for tag in &entry.tags {
            if let Some(keys) = self.tag_index.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }
        Some(entry)
    }
}

// == In-Flight Fetches ==
/// Count of running fetches per generation they started at.
#[derive(Debug, Default, Clone)]
struct InFlight(Arc<Mutex<BTreeMap<u64, usize>>>);

impl InFlight {
    fn enter(&self, since: u64) -> FetchGuard {
        *self.lock().entry(since).or_insert(0) += 1;
        FetchGuard {
            in_flight: self.clone(),
            since,
        }
    }

    fn oldest(&self) -> Option<u64> {
        self.lock().keys().next().copied()
    }

    fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u64, usize>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks one fetch as running until dropped, including when the fetch
/// future is cancelled.
#[derive(Debug)]
pub struct FetchGuard {
    in_flight: InFlight,
    since: u64,
}

impl FetchGuard {
    /// Generation observed when the fetch started.
    pub fn since(&self) -> u64 {
        self.since
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        let mut running = self.in_flight.lock();
        if let Some(count) = running.get_mut(&self.since) {
            *count -= 1;
            if *count == 0 {
                running.remove(&self.since);
            }
        }
    }
}

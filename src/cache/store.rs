//! The concurrent content-addressed result store.
//!
//! A `DashMap` keyed by content digest holds one [`CacheEntry`] per unique
//! input ever processed. Workers probe and insert without any coordinator
//! level locking; concurrent inserts of the same digest resolve to a single
//! winning entry that every racer observes afterwards.
//!
//! The map lives behind a swappable `Arc` handle so [`ResultCache::reset`]
//! can replace the whole store atomically from the caller's perspective:
//! in-flight readers that already cloned the old handle keep a consistent
//! snapshot and simply finish against the old map.

use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;

use crate::hasher::Digest;

use super::entry::CacheEntry;

/// Default capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 1000;

type Map = DashMap<Digest, Arc<CacheEntry>>;

/// Concurrent digest → entry map with insert-if-absent semantics.
///
/// Capacity is pre-declared to avoid shard resizing on the hot path; growth
/// beyond it is allowed and degrades to short shard-level write locking
/// while a shard rehashes (DashMap policy). Size the capacity for the
/// expected number of *distinct* images in the corpus.
#[derive(Debug)]
pub struct ResultCache {
    inner: RwLock<Arc<Map>>,
}

impl ResultCache {
    /// Create a cache pre-sized for `capacity` distinct entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Arc::new(Map::with_capacity(capacity))),
        }
    }

    fn map(&self) -> Arc<Map> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Non-blocking lookup.
    ///
    /// Returns immediately whether or not the digest is present; inserts of
    /// *other* digests never block this call.
    #[must_use]
    pub fn find(&self, digest: &Digest) -> Option<Arc<CacheEntry>> {
        self.map().get(digest).map(|entry| entry.value().clone())
    }

    /// Insert `entry` unless its digest is already present.
    ///
    /// Returns the entry now in the map: either the one just inserted or a
    /// pre-existing one from a lost race. Callers must not assume the
    /// returned entry is the one they passed in.
    #[must_use]
    pub fn insert_if_absent(&self, entry: CacheEntry) -> Arc<CacheEntry> {
        let digest = entry.digest;
        self.map()
            .entry(digest)
            .or_insert_with(|| Arc::new(entry))
            .value()
            .clone()
    }

    /// Replace the whole store with an empty map pre-sized for
    /// `new_capacity`.
    ///
    /// Readers holding the old map finish against it unaffected; inserts
    /// racing with the reset may land in the old map and be dropped with it.
    pub fn reset(&self, new_capacity: usize) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(Map::with_capacity(new_capacity));
    }

    /// Number of distinct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    /// Snapshot of all entries, safe to take concurrently with inserts.
    ///
    /// Consistency: contains at least every entry whose insert completed
    /// before this call began; entries inserted concurrently may or may not
    /// appear. Used for reporting.
    #[must_use]
    pub fn entries(&self) -> Vec<Arc<CacheEntry>> {
        self.map()
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

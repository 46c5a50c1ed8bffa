//! # Least Recently Used (LRU) Reference Policy
//!
//! Stamps each resident key with the logical clock
//! ([`CacheState::access_count`](crate::state::CacheState::access_count))
//! on insert and on every hit, and evicts the key with the lowest stamp.
//!
//! ## Metadata
//!
//! | Field         | Set on insert | Updated on hit | Dropped on evict |
//! |---------------|---------------|----------------|------------------|
//! | `last_access` | clock value   | clock value    | yes              |
//!
//! Ties (two keys stamped in the same request are impossible, but keys
//! never touched since a clock reset are not) resolve to the first key in
//! the state's insertion-order iteration, which keeps replays
//! reproducible.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::state::{CacheState, CachedObject};
use crate::traits::EvictionPolicy;

/// Classic recency-based eviction.
pub struct LruPolicy<K> {
    last_access: IndexMap<K, u64, FxBuildHasher>,
}

impl<K> LruPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            last_access: IndexMap::with_hasher(FxBuildHasher),
        }
    }

    /// The recency stamp currently held for `key`, if any.
    pub fn last_access(&self, key: &K) -> Option<u64> {
        self.last_access.get(key).copied()
    }
}

impl<K> Default for LruPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for LruPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send,
{
    fn name(&self) -> &'static str {
        "lru"
    }

    fn evict(&self, state: &CacheState<K>) -> Option<K> {
        let mut victim: Option<(&K, u64)> = None;
        for key in state.keys() {
            let stamp = self.last_access.get(key).copied().unwrap_or(0);
            match victim {
                Some((_, best)) if stamp >= best => {},
                _ => victim = Some((key, stamp)),
            }
        }
        victim.map(|(key, _)| key.clone())
    }

    fn update_after_hit(&mut self, state: &CacheState<K>, obj: &CachedObject<K>) {
        self.last_access
            .insert(obj.key().clone(), state.access_count());
    }

    fn update_after_insert(&mut self, state: &CacheState<K>, obj: &CachedObject<K>) {
        self.last_access
            .insert(obj.key().clone(), state.access_count());
    }

    fn update_after_evict(
        &mut self,
        _state: &CacheState<K>,
        _incoming: &CachedObject<K>,
        evicted: &CachedObject<K>,
    ) {
        self.last_access.shift_remove(evicted.key());
    }

    fn metadata_keys(&self) -> Vec<K> {
        self.last_access.keys().cloned().collect()
    }
}

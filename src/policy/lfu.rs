//! # Least Frequently Used (LFU) Reference Policy
//!
//! Tracks a per-key access frequency (1 on insert, +1 on every hit) and
//! evicts the key with the lowest frequency. Frequency ties are broken by
//! the oldest insertion, then by insertion-order iteration.
//!
//! ## Metadata
//!
//! | Field         | Set on insert | Updated on hit | Dropped on evict |
//! |---------------|---------------|----------------|------------------|
//! | `frequency`   | 1             | +1             | yes              |
//! | `inserted_at` | clock value   | -              | yes              |
//!
//! No aging: an item that was hot long ago keeps its count until evicted.
//! That is the classic LFU cold-start trade-off, accepted here because
//! reference policies are meant to be textbook-shaped.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::state::{CacheState, CachedObject};
use crate::traits::EvictionPolicy;

#[derive(Debug, Clone, Copy)]
struct LfuMeta {
    frequency: u64,
    inserted_at: u64,
}

/// Classic frequency-based eviction with oldest-insertion tie-breaking.
pub struct LfuPolicy<K> {
    meta: IndexMap<K, LfuMeta, FxBuildHasher>,
}

impl<K> LfuPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            meta: IndexMap::with_hasher(FxBuildHasher),
        }
    }

    /// The frequency count currently held for `key`, if any.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.meta.get(key).map(|m| m.frequency)
    }
}

impl<K> Default for LfuPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for LfuPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send,
{
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn evict(&self, state: &CacheState<K>) -> Option<K> {
        let mut victim: Option<(&K, (u64, u64))> = None;
        for key in state.keys() {
            // Missing metadata ranks first so a leaky run still terminates.
            let rank = self
                .meta
                .get(key)
                .map(|m| (m.frequency, m.inserted_at))
                .unwrap_or((0, 0));
            match victim {
                Some((_, best)) if rank >= best => {},
                _ => victim = Some((key, rank)),
            }
        }
        victim.map(|(key, _)| key.clone())
    }

    fn update_after_hit(&mut self, _state: &CacheState<K>, obj: &CachedObject<K>) {
        if let Some(meta) = self.meta.get_mut(obj.key()) {
            meta.frequency += 1;
        }
    }

    fn update_after_insert(&mut self, state: &CacheState<K>, obj: &CachedObject<K>) {
        self.meta.insert(
            obj.key().clone(),
            LfuMeta {
                frequency: 1,
                inserted_at: state.access_count(),
            },
        );
    }

    fn update_after_evict(
        &mut self,
        _state: &CacheState<K>,
        _incoming: &CachedObject<K>,
        evicted: &CachedObject<K>,
    ) {
        self.meta.shift_remove(evicted.key());
    }

    fn metadata_keys(&self) -> Vec<K> {
        self.meta.keys().cloned().collect()
    }
}

//! # First In, First Out (FIFO) Reference Policy
//!
//! Evicts the oldest insertion regardless of access pattern. Hits do not
//! touch metadata, which makes FIFO the useful degenerate case for
//! exercising the policy contract: `update_after_hit` is a no-op yet the
//! hygiene audit must still hold.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::state::{CacheState, CachedObject};
use crate::traits::EvictionPolicy;

/// Insertion-order eviction.
pub struct FifoPolicy<K> {
    inserted_at: IndexMap<K, u64, FxBuildHasher>,
}

impl<K> FifoPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            inserted_at: IndexMap::with_hasher(FxBuildHasher),
        }
    }
}

impl<K> Default for FifoPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for FifoPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send,
{
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn evict(&self, state: &CacheState<K>) -> Option<K> {
        let mut victim: Option<(&K, u64)> = None;
        for key in state.keys() {
            let stamp = self.inserted_at.get(key).copied().unwrap_or(0);
            match victim {
                Some((_, best)) if stamp >= best => {},
                _ => victim = Some((key, stamp)),
            }
        }
        victim.map(|(key, _)| key.clone())
    }

    fn update_after_hit(&mut self, _state: &CacheState<K>, _obj: &CachedObject<K>) {
        // Hits are irrelevant to insertion order.
    }

    fn update_after_insert(&mut self, state: &CacheState<K>, obj: &CachedObject<K>) {
        self.inserted_at
            .insert(obj.key().clone(), state.access_count());
    }

    fn update_after_evict(
        &mut self,
        _state: &CacheState<K>,
        _incoming: &CachedObject<K>,
        evicted: &CachedObject<K>,
    ) {
        self.inserted_at.shift_remove(evicted.key());
    }

    fn metadata_keys(&self) -> Vec<K> {
        self.inserted_at.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(key: u64) -> CachedObject<u64> {
        CachedObject::new(key, 1)
    }

    fn insert(state: &mut CacheState<u64>, policy: &mut FifoPolicy<u64>, key: u64) {
        state.record_access(false);
        state.insert(obj(key)).unwrap();
        policy.update_after_insert(state, &obj(key));
    }

    #[test]
    fn evicts_oldest_insertion() {
        let mut state = CacheState::new(3);
        let mut policy = FifoPolicy::new();
        insert(&mut state, &mut policy, 1);
        insert(&mut state, &mut policy, 2);
        insert(&mut state, &mut policy, 3);

        assert_eq!(policy.evict(&state), Some(1));
    }

    #[test]
    fn hits_do_not_protect_entries() {
        let mut state = CacheState::new(2);
        let mut policy = FifoPolicy::new();
        insert(&mut state, &mut policy, 1);
        insert(&mut state, &mut policy, 2);

        state.record_access(true);
        policy.update_after_hit(&state, &obj(1));

        assert_eq!(policy.evict(&state), Some(1));
    }
}

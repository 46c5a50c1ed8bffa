//! Cache state bookkeeping: resident objects, size accounting, counters.
//!
//! [`CacheState`] is the authoritative record of what is currently cached.
//! It performs pure bookkeeping and contains no policy logic: eviction
//! decisions and the pre-eviction loop live in
//! [`CacheSimulator`](crate::sim::CacheSimulator), which is the only
//! component allowed to mutate the state. Policies see `&CacheState`.
//!
//! ## Invariants
//!
//! | Invariant                                      | Enforced by                  |
//! |------------------------------------------------|------------------------------|
//! | `used == Σ size of resident objects`           | `insert` / `remove`          |
//! | `used <= capacity` after every request         | simulator eviction loop      |
//! | iteration order == insertion order             | `IndexMap` + `shift_remove`  |
//! | counters bump exactly once per request         | `record_access`              |
//!
//! Insertion-order iteration is load-bearing: policies may break scoring
//! ties by the first key they encounter, so iteration order must be
//! reproducible across runs for the simulation to be deterministic.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::error::{InvariantError, SimError};

/// One cacheable unit: a key plus the logical size it occupies.
///
/// Owned exclusively by [`CacheState`] once inserted and immutable for its
/// lifetime in cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedObject<K> {
    key: K,
    size: u64,
}

impl<K> CachedObject<K> {
    pub fn new(key: K, size: u64) -> Self {
        Self { key, size }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Authoritative in-memory record of cache contents and counters.
pub struct CacheState<K> {
    capacity: u64,
    used: u64,
    cache: IndexMap<K, CachedObject<K>, FxBuildHasher>,
    access_count: u64,
    hit_count: u64,
    miss_count: u64,
}

impl<K> CacheState<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Creates a state with the given capacity.
    ///
    /// Capacity zero is accepted here (every insert will fail); use
    /// [`try_new`](Self::try_new) when the capacity comes from user
    /// configuration.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            used: 0,
            cache: IndexMap::with_hasher(FxBuildHasher),
            access_count: 0,
            hit_count: 0,
            miss_count: 0,
        }
    }

    /// Fallible constructor for user-configurable capacities.
    pub fn try_new(capacity: u64) -> Result<Self, crate::error::ConfigError> {
        if capacity == 0 {
            return Err(crate::error::ConfigError::new("capacity must be > 0"));
        }
        Ok(Self::new(capacity))
    }

    /// Fixed capacity ceiling on the sum of resident object sizes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Current sum of resident object sizes.
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Number of resident objects.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Logical clock: total requests served so far (hits plus misses).
    ///
    /// Policies use this as a proxy for time when stamping metadata.
    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    pub fn miss_count(&self) -> u64 {
        self.miss_count
    }

    pub fn contains(&self, key: &K) -> bool {
        self.cache.contains_key(key)
    }

    /// Looks up a resident object.
    pub fn get(&self, key: &K) -> Result<&CachedObject<K>, SimError> {
        self.cache.get(key).ok_or_else(|| SimError::KeyNotFound {
            key: format!("{key:?}"),
        })
    }

    /// Resident keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.cache.keys()
    }

    /// Resident entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &CachedObject<K>)> {
        self.cache.iter()
    }

    /// Adds an object, growing `used` by its size.
    ///
    /// Reinserting a resident key replaces the old object and re-accounts
    /// its size. Fails with `CapacityViolation` if the caller has not made
    /// room first; pre-eviction is the simulator's job, not this type's.
    pub fn insert(&mut self, obj: CachedObject<K>) -> Result<Option<CachedObject<K>>, SimError> {
        let replaced_size = self
            .cache
            .get(&obj.key)
            .map(|existing| existing.size)
            .unwrap_or(0);
        let next_used = self.used - replaced_size + obj.size;
        if next_used > self.capacity {
            return Err(SimError::CapacityViolation {
                capacity: self.capacity,
                used: self.used,
                incoming: obj.size,
            });
        }
        let previous = self.cache.insert(obj.key.clone(), obj);
        self.used = next_used;
        debug_assert!(self.check_invariants().is_ok());
        Ok(previous)
    }

    /// Removes and returns an object, shrinking `used` by its size.
    ///
    /// Uses `shift_remove` so that surviving entries keep their insertion
    /// order.
    pub fn remove(&mut self, key: &K) -> Result<CachedObject<K>, SimError> {
        let obj = self
            .cache
            .shift_remove(key)
            .ok_or_else(|| SimError::KeyNotFound {
                key: format!("{key:?}"),
            })?;
        self.used -= obj.size;
        debug_assert!(self.check_invariants().is_ok());
        Ok(obj)
    }

    /// Records one request outcome, bumping the logical clock and exactly
    /// one of the hit/miss counters.
    pub fn record_access(&mut self, hit: bool) {
        self.access_count += 1;
        if hit {
            self.hit_count += 1;
        } else {
            self.miss_count += 1;
        }
    }

    /// Audits the size accounting and counter invariants.
    ///
    /// Called from `debug_assert!` after every mutation and directly by
    /// tests.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let actual: u64 = self.cache.values().map(|obj| obj.size).sum();
        if actual != self.used {
            return Err(InvariantError::new(format!(
                "size accounting mismatch: tracked {} but resident objects sum to {}",
                self.used, actual
            )));
        }
        if self.used > self.capacity {
            return Err(InvariantError::new(format!(
                "occupancy {} exceeds capacity {}",
                self.used, self.capacity
            )));
        }
        if self.hit_count + self.miss_count != self.access_count {
            return Err(InvariantError::new(format!(
                "counter mismatch: {} hits + {} misses != {} accesses",
                self.hit_count, self.miss_count, self.access_count
            )));
        }
        Ok(())
    }
}

impl<K> fmt::Debug for CacheState<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheState")
            .field("capacity", &self.capacity)
            .field("used", &self.used)
            .field("entries", &self.cache.len())
            .field("access_count", &self.access_count)
            .field("hit_count", &self.hit_count)
            .field("miss_count", &self.miss_count)
            .finish()
    }
}

//! # Eviction Policy Contract
//!
//! This module defines [`EvictionPolicy`], the seam between the simulation
//! engine and pluggable eviction heuristics. The engine owns the cache
//! mechanics (lookup, removal, insertion, counters); a policy only ranks
//! resident keys and reacts to lifecycle events.
//!
//! ## Lifecycle
//!
//! ```text
//!   request(key, size)
//!        │
//!        ├─ hit ──► record_access(true) ──► update_after_hit(state, obj)
//!        │
//!        └─ miss ─► record_access(false)
//!                        │
//!                        ▼
//!            ┌─ while used + size > capacity ─────────────────────────┐
//!            │   victim ◄── evict(state)        (validated, removed)  │
//!            │   update_after_evict(state, incoming, evicted)         │
//!            └──────────────────────────────────────────────────────--┘
//!                        │
//!                        ▼
//!            insert(incoming) ──► update_after_insert(state, obj)
//! ```
//!
//! ## Contract
//!
//! | Operation             | May mutate          | Must guarantee                         |
//! |-----------------------|---------------------|----------------------------------------|
//! | `evict`               | nothing (`&self`)   | returned key is resident               |
//! | `update_after_hit`    | own metadata only   | -                                      |
//! | `update_after_insert` | own metadata only   | metadata established for `obj.key`     |
//! | `update_after_evict`  | own metadata only   | no metadata survives for `evicted.key` |
//!
//! The last column of `update_after_evict` is the contract most often
//! broken by ad-hoc policies: leaked metadata grows without bound and
//! skews future scoring. The engine's strict mode audits
//! [`metadata_keys`](EvictionPolicy::metadata_keys) against the resident
//! key set after every request and fails the run on any divergence.
//!
//! Each policy instance owns its metadata privately (no globals), so
//! independent (policy, trace) pairs can run on parallel workers without
//! any shared state.

use std::fmt;
use std::hash::Hash;

use crate::state::{CacheState, CachedObject};

/// A pluggable eviction heuristic driven by the simulator's lifecycle
/// callbacks.
///
/// Implementations rank resident keys by policy-owned per-key metadata and
/// return the victim directly from [`evict`](Self::evict); whether a high
/// or low score means "evict me" is entirely the policy's business.
pub trait EvictionPolicy<K>: Send
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Stable identifier used in reports and logs.
    fn name(&self) -> &'static str;

    /// Selects the key to remove next.
    ///
    /// Precondition: the cache is non-empty. Must be a pure function of
    /// `state` plus the policy's own metadata. Returning `None` or a
    /// non-resident key is a contract violation the engine surfaces as
    /// [`InvalidEvictionChoice`](crate::error::SimError::InvalidEvictionChoice).
    fn evict(&self, state: &CacheState<K>) -> Option<K>;

    /// Called after a hit has been recorded; `obj` is resident.
    fn update_after_hit(&mut self, state: &CacheState<K>, obj: &CachedObject<K>);

    /// Called immediately after `obj` was inserted; must establish
    /// metadata for `obj.key()`.
    fn update_after_insert(&mut self, state: &CacheState<K>, obj: &CachedObject<K>);

    /// Called immediately after `evicted` was removed and before
    /// `incoming` is inserted; must drop all metadata for
    /// `evicted.key()` and may adjust metadata of surviving keys.
    fn update_after_evict(
        &mut self,
        state: &CacheState<K>,
        incoming: &CachedObject<K>,
        evicted: &CachedObject<K>,
    );

    /// Every key the policy currently holds metadata for.
    ///
    /// Powers the strict-mode hygiene audit; the returned set must equal
    /// the resident key set after each request completes.
    fn metadata_keys(&self) -> Vec<K>;
}

/// Owned, dynamically-dispatched policy handle used by the simulator and
/// the batch runner.
pub type BoxedPolicy<K> = Box<dyn EvictionPolicy<K>>;

//! # Cache Simulator
//!
//! [`CacheSimulator`] drives a trace of requests against one
//! [`CacheState`] / [`EvictionPolicy`] pair. It owns all cache mechanics;
//! the policy is only consulted for victim selection and notified at the
//! lifecycle points defined in [`crate::traits`].
//!
//! ## Per-request State Machine
//!
//! ```text
//!   lookup ──► hit ───► record_access(true) ──► update_after_hit ──► done
//!      │
//!      └────► miss ──► record_access(false)
//!                │
//!                ├─ size > capacity ──► ObjectTooLarge (cache untouched)
//!                │
//!                └─ evict until it fits ──► insert ──► update_after_insert
//! ```
//!
//! ## Failure Semantics
//!
//! | Condition               | Effect                                         |
//! |-------------------------|------------------------------------------------|
//! | `ObjectTooLarge`        | request skipped, run continues                 |
//! | `InvalidEvictionChoice` | run aborted, no removal from the failed attempt|
//! | `KeyNotFound` etc.      | engine bug, propagated immediately             |
//! | `MetadataLeak` (strict) | run aborted after the offending request        |
//!
//! The victim key returned by the policy is validated *before* removal, so
//! a misbehaving policy can never leave a half-applied eviction behind.
//!
//! A doomed insert (object larger than the whole cache) is rejected before
//! the eviction loop; evicting resident entries to make room for an object
//! that can never fit would destroy the cache for nothing.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::error::{ConfigError, SimError};
use crate::state::{CacheState, CachedObject};
use crate::trace::Trace;
use crate::traits::BoxedPolicy;

/// Terminal outcome of a single successful request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The key was resident.
    Hit,
    /// The key was fetched and inserted, after `evictions` removals.
    Miss { evictions: u32 },
}

/// Aggregate counters for one replayed trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Misses skipped because the object could never fit.
    pub too_large: u64,
}

impl RunStats {
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }

    /// Miss ratio, the score the batch runner ranks policies by.
    pub fn miss_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.misses as f64 / self.requests as f64
        }
    }
}

/// Single-threaded, synchronous simulation of one policy over one state.
pub struct CacheSimulator<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    state: CacheState<K>,
    policy: BoxedPolicy<K>,
    strict_metadata: bool,
}

impl<K> CacheSimulator<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Creates a simulator with a fresh state of the given capacity.
    pub fn new(capacity: u64, policy: BoxedPolicy<K>) -> Result<Self, ConfigError> {
        Ok(Self {
            state: CacheState::try_new(capacity)?,
            policy,
            strict_metadata: cfg!(debug_assertions),
        })
    }

    /// Enables or disables the per-request metadata hygiene audit.
    ///
    /// Defaults to on in debug builds and off in release builds; tests and
    /// the batch runner turn it on explicitly.
    pub fn with_strict_metadata(mut self, strict: bool) -> Self {
        self.strict_metadata = strict;
        self
    }

    pub fn state(&self) -> &CacheState<K> {
        &self.state
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Serves one request for `key` with the given object size.
    pub fn request(&mut self, key: K, size: u64) -> Result<RequestOutcome, SimError> {
        if self.state.contains(&key) {
            self.state.record_access(true);
            let obj = self.state.get(&key)?.clone();
            self.policy.update_after_hit(&self.state, &obj);
            self.audit_metadata()?;
            return Ok(RequestOutcome::Hit);
        }

        self.state.record_access(false);

        if size > self.state.capacity() {
            self.audit_metadata()?;
            return Err(SimError::ObjectTooLarge {
                key: format!("{key:?}"),
                size,
                capacity: self.state.capacity(),
            });
        }

        let incoming = CachedObject::new(key, size);
        let mut evictions = 0u32;
        while self.state.used() + incoming.size() > self.state.capacity()
            && !self.state.is_empty()
        {
            let choice = self.policy.evict(&self.state);
            let victim = match choice {
                Some(victim) if self.state.contains(&victim) => victim,
                other => {
                    warn!(
                        policy = self.policy.name(),
                        victim = ?other,
                        "eviction choice rejected"
                    );
                    return Err(SimError::InvalidEvictionChoice {
                        policy: self.policy.name().to_string(),
                        victim: other.map(|key| format!("{key:?}")),
                    });
                },
            };
            let evicted = self.state.remove(&victim)?;
            debug!(
                policy = self.policy.name(),
                victim = ?evicted.key(),
                size = evicted.size(),
                "evicted"
            );
            self.policy
                .update_after_evict(&self.state, &incoming, &evicted);
            evictions += 1;
        }

        self.state.insert(incoming.clone())?;
        self.policy.update_after_insert(&self.state, &incoming);
        self.audit_metadata()?;
        Ok(RequestOutcome::Miss { evictions })
    }

    /// Replays a full trace, optionally bounded by a step budget.
    ///
    /// `ObjectTooLarge` requests are counted and skipped; every other
    /// error aborts the replay.
    pub fn replay(&mut self, trace: &Trace<K>, step_budget: Option<u64>) -> Result<RunStats, SimError> {
        let mut stats = RunStats::default();
        for record in trace.iter() {
            if let Some(budget) = step_budget {
                if stats.requests >= budget {
                    return Err(SimError::BudgetExceeded { steps: budget });
                }
            }
            stats.requests += 1;
            match self.request(record.key.clone(), record.size) {
                Ok(RequestOutcome::Hit) => stats.hits += 1,
                Ok(RequestOutcome::Miss { evictions }) => {
                    stats.misses += 1;
                    stats.evictions += u64::from(evictions);
                },
                Err(err) if err.is_recoverable() => {
                    stats.misses += 1;
                    stats.too_large += 1;
                },
                Err(err) => return Err(err),
            }
        }
        Ok(stats)
    }

    /// Strict-mode audit: the policy's tracked key set must equal the
    /// resident key set after every request.
    fn audit_metadata(&self) -> Result<(), SimError> {
        if !self.strict_metadata {
            return Ok(());
        }
        let tracked = self.policy.metadata_keys();
        let tracked_set: FxHashSet<&K> = tracked.iter().collect();

        let mut leaked: Vec<&K> = tracked_set
            .iter()
            .copied()
            .filter(|key| !self.state.contains(key))
            .collect();
        let mut untracked: Vec<&K> = self
            .state
            .keys()
            .filter(|key| !tracked_set.contains(key))
            .collect();

        if leaked.is_empty() && untracked.is_empty() {
            return Ok(());
        }

        let detail = match (leaked.pop(), untracked.pop()) {
            (Some(example), _) => format!(
                "{} stale key(s) tracked past eviction, e.g. {example:?}",
                leaked.len() + 1
            ),
            (None, Some(example)) => format!(
                "{} resident key(s) missing metadata, e.g. {example:?}",
                untracked.len() + 1
            ),
            (None, None) => unreachable!(),
        };
        Err(SimError::MetadataLeak {
            policy: self.policy.name().to_string(),
            detail,
        })
    }
}

impl<K> fmt::Debug for CacheSimulator<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheSimulator")
            .field("policy", &self.policy.name())
            .field("state", &self.state)
            .field("strict_metadata", &self.strict_metadata)
            .finish()
    }
}

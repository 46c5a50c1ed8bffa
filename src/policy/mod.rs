//! Reference eviction policies and the built-in policy registry.
//!
//! These implementations exist to validate the [`EvictionPolicy`] contract
//! and to give the simulator and batch runner something real to drive.
//! They are deliberately written in the shape the contract pushes every
//! heuristic into: a per-key metadata map plus a linear argmin over the
//! state's (insertion-ordered, deterministic) key iteration.
//!
//! The registry is the single source of truth for built-in policies; the
//! batch runner and benchmarks iterate it instead of hard-coding
//! constructors.

pub mod fifo;
pub mod lfu;
pub mod lru;

use std::fmt;
use std::hash::Hash;

use crate::traits::BoxedPolicy;

/// A named policy constructor, as consumed by the batch runner.
pub struct PolicyCase<K> {
    /// Short identifier (e.g. "lru").
    pub id: &'static str,
    /// Human-readable display name (e.g. "LRU").
    pub display_name: &'static str,
    /// Builds a fresh policy instance with empty metadata.
    pub build: fn() -> BoxedPolicy<K>,
}

impl<K> Clone for PolicyCase<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            display_name: self.display_name,
            build: self.build,
        }
    }
}

impl<K> fmt::Debug for PolicyCase<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyCase").field("id", &self.id).finish()
    }
}

fn build_lru<K>() -> BoxedPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
    Box::new(lru::LruPolicy::new())
}

fn build_lfu<K>() -> BoxedPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
    Box::new(lfu::LfuPolicy::new())
}

fn build_fifo<K>() -> BoxedPolicy<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
    Box::new(fifo::FifoPolicy::new())
}

/// The built-in policy suite.
pub fn builtin_policies<K>() -> Vec<PolicyCase<K>>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
    vec![
        PolicyCase {
            id: "lru",
            display_name: "LRU",
            build: build_lru::<K>,
        },
        PolicyCase {
            id: "lfu",
            display_name: "LFU",
            build: build_lfu::<K>,
        },
        PolicyCase {
            id: "fifo",
            display_name: "FIFO",
            build: build_fifo::<K>,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_ids_are_unique() {
        let cases = builtin_policies::<u64>();
        let mut ids: Vec<&str> = cases.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), cases.len());
    }

    #[test]
    fn registry_constructors_report_matching_names() {
        for case in builtin_policies::<u64>() {
            let policy = (case.build)();
            assert_eq!(policy.name(), case.id);
        }
    }
}

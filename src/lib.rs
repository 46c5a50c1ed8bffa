//! cachesim: deterministic cache simulation engine with pluggable
//! eviction policies.
//!
//! The engine replays a trace of requests against a bookkeeping
//! [`CacheState`](state::CacheState), consulting an
//! [`EvictionPolicy`](traits::EvictionPolicy) at fixed lifecycle points,
//! and a [`BatchRunner`](runner::BatchRunner) evaluates many candidate
//! policies against the same trace on parallel workers.
//!
//! ```
//! use cachesim::policy::lru::LruPolicy;
//! use cachesim::sim::CacheSimulator;
//! use cachesim::trace::Trace;
//!
//! let mut sim = CacheSimulator::new(2, Box::new(LruPolicy::new())).unwrap();
//! let trace = Trace::from_keys(["a", "b", "a", "c"]);
//! let stats = sim.replay(&trace, None).unwrap();
//! assert_eq!(stats.hits, 1);
//! ```

pub mod error;
pub mod policy;
pub mod prelude;
pub mod report;
pub mod runner;
pub mod sim;
pub mod state;
pub mod trace;
pub mod traits;

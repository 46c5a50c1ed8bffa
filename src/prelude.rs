//! Convenience re-exports for driving simulations.

pub use crate::error::{ConfigError, InvariantError, SimError};
pub use crate::policy::fifo::FifoPolicy;
pub use crate::policy::lfu::LfuPolicy;
pub use crate::policy::lru::LruPolicy;
pub use crate::policy::{builtin_policies, PolicyCase};
pub use crate::report::{BatchReport, PolicyRun, RunOutcome, RunReport};
pub use crate::runner::BatchRunner;
pub use crate::sim::{CacheSimulator, RequestOutcome, RunStats};
pub use crate::state::{CacheState, CachedObject};
pub use crate::trace::{
    load_trace, AccessPattern, SizeModel, Trace, TraceFormat, TraceRecord, WorkloadSpec,
};
pub use crate::traits::{BoxedPolicy, EvictionPolicy};

//! Parallel batch evaluation of candidate policies.
//!
//! Each (policy, trace) pair is independent: a worker owns its private
//! [`CacheState`](crate::state::CacheState) and policy metadata, so runs
//! execute on rayon workers with no shared mutable state and no locking.
//! A benchmark run is atomic per policy: a run that exceeds its step
//! budget or trips a policy defect contributes a failure row, never
//! partial statistics.
//!
//! Fatal errors (`KeyNotFound`, `CapacityViolation`, `MetadataLeak`)
//! indicate a bug in the engine or a policy contract breach that strict
//! mode exists to catch; they abort the whole batch rather than being
//! folded into a row.

use std::fmt;
use std::hash::Hash;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{ConfigError, SimError};
use crate::policy::{builtin_policies, PolicyCase};
use crate::report::{BatchReport, PolicyRun, RunMetadata, RunOutcome, RunReport};
use crate::sim::CacheSimulator;
use crate::trace::Trace;

/// Runs a suite of policies against one trace with a shared configuration.
#[derive(Debug, Clone)]
pub struct BatchRunner<K> {
    capacity: u64,
    strict_metadata: bool,
    step_budget: Option<u64>,
    policies: Vec<PolicyCase<K>>,
}

impl<K> BatchRunner<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn new(capacity: u64) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        Ok(Self {
            capacity,
            strict_metadata: true,
            step_budget: None,
            policies: Vec::new(),
        })
    }

    /// Registers the built-in LRU/LFU/FIFO suite.
    pub fn with_builtin_policies(mut self) -> Self {
        self.policies.extend(builtin_policies::<K>());
        self
    }

    /// Registers one candidate policy.
    pub fn register(mut self, case: PolicyCase<K>) -> Self {
        self.policies.push(case);
        self
    }

    /// Caps the number of requests a single run may serve.
    pub fn with_step_budget(mut self, steps: u64) -> Self {
        self.step_budget = Some(steps);
        self
    }

    /// Toggles the per-request metadata hygiene audit (on by default for
    /// batch runs).
    pub fn with_strict_metadata(mut self, strict: bool) -> Self {
        self.strict_metadata = strict;
        self
    }

    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    /// Evaluates every registered policy against `trace` in parallel.
    pub fn run(&self, trace: &Trace<K>) -> Result<BatchReport, SimError> {
        let runs: Vec<PolicyRun> = self
            .policies
            .par_iter()
            .map(|case| self.run_one(case, trace))
            .collect::<Result<_, SimError>>()?;

        let metadata = RunMetadata::collect(self.capacity, trace.len(), self.step_budget);
        info!(
            policies = runs.len(),
            trace_len = trace.len(),
            capacity = self.capacity,
            "batch evaluation complete"
        );
        Ok(BatchReport::new(metadata, runs))
    }

    fn run_one(&self, case: &PolicyCase<K>, trace: &Trace<K>) -> Result<PolicyRun, SimError> {
        let policy = (case.build)();
        let mut sim = CacheSimulator::new(self.capacity, policy)
            .expect("capacity validated at construction")
            .with_strict_metadata(self.strict_metadata);

        let outcome = match sim.replay(trace, self.step_budget) {
            Ok(stats) => RunOutcome::Completed(RunReport::from_stats(
                &stats,
                sim.state().used(),
                sim.state().len(),
            )),
            Err(err @ SimError::InvalidEvictionChoice { .. }) => {
                warn!(policy = case.id, error = %err, "policy defect; run aborted");
                RunOutcome::PolicyDefect {
                    error: err.to_string(),
                }
            },
            Err(SimError::BudgetExceeded { steps }) => {
                warn!(policy = case.id, steps, "step budget exceeded; run discarded");
                RunOutcome::BudgetExceeded { steps }
            },
            Err(fatal) => return Err(fatal),
        };

        Ok(PolicyRun {
            policy_id: case.id.to_string(),
            policy_name: case.display_name.to_string(),
            outcome,
        })
    }
}

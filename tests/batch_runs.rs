// ==============================================
// BATCH EVALUATION TESTS (integration)
// ==============================================
//
// End-to-end runs of the batch runner: defect containment across
// candidate policies, fatal-error propagation, trace-file round trips,
// and the JSON artifact shape.

use std::io::Write;

use cachesim::policy::PolicyCase;
use cachesim::report::RunOutcome;
use cachesim::runner::BatchRunner;
use cachesim::state::{CacheState, CachedObject};
use cachesim::trace::{load_trace, AccessPattern, SizeModel, Trace, TraceFormat, WorkloadSpec};
use cachesim::traits::{BoxedPolicy, EvictionPolicy};

fn hotset_trace(n: usize) -> Trace<u64> {
    WorkloadSpec {
        universe: 64,
        pattern: AccessPattern::Hotset {
            hot_fraction: 0.25,
            hot_prob: 0.9,
        },
        sizes: SizeModel::Unit,
        seed: 13,
    }
    .synthesize(n)
}

// ==============================================
// Defect Containment
// ==============================================

/// Keeps its metadata in order but refuses to ever pick a victim.
struct IndecisivePolicy {
    tracked: Vec<u64>,
}

impl IndecisivePolicy {
    fn new() -> Self {
        Self { tracked: Vec::new() }
    }
}

impl EvictionPolicy<u64> for IndecisivePolicy {
    fn name(&self) -> &'static str {
        "indecisive"
    }

    fn evict(&self, _state: &CacheState<u64>) -> Option<u64> {
        None
    }

    fn update_after_hit(&mut self, _state: &CacheState<u64>, _obj: &CachedObject<u64>) {}

    fn update_after_insert(&mut self, _state: &CacheState<u64>, obj: &CachedObject<u64>) {
        self.tracked.push(*obj.key());
    }

    fn update_after_evict(
        &mut self,
        _state: &CacheState<u64>,
        _incoming: &CachedObject<u64>,
        evicted: &CachedObject<u64>,
    ) {
        self.tracked.retain(|key| key != evicted.key());
    }

    fn metadata_keys(&self) -> Vec<u64> {
        self.tracked.clone()
    }
}

fn build_indecisive() -> BoxedPolicy<u64> {
    Box::new(IndecisivePolicy::new())
}

/// Tracks nothing at all; strict mode flags it on the first insert.
struct AmnesiacPolicy;

impl EvictionPolicy<u64> for AmnesiacPolicy {
    fn name(&self) -> &'static str {
        "amnesiac"
    }

    fn evict(&self, state: &CacheState<u64>) -> Option<u64> {
        state.keys().next().copied()
    }

    fn update_after_hit(&mut self, _state: &CacheState<u64>, _obj: &CachedObject<u64>) {}

    fn update_after_insert(&mut self, _state: &CacheState<u64>, _obj: &CachedObject<u64>) {}

    fn update_after_evict(
        &mut self,
        _state: &CacheState<u64>,
        _incoming: &CachedObject<u64>,
        _evicted: &CachedObject<u64>,
    ) {
    }

    fn metadata_keys(&self) -> Vec<u64> {
        Vec::new()
    }
}

fn build_amnesiac() -> BoxedPolicy<u64> {
    Box::new(AmnesiacPolicy)
}

#[test]
fn one_defective_policy_does_not_poison_the_batch() {
    let runner = BatchRunner::<u64>::new(16)
        .unwrap()
        .with_builtin_policies()
        .register(PolicyCase {
            id: "indecisive",
            display_name: "Indecisive",
            build: build_indecisive,
        });
    let report = runner.run(&hotset_trace(2_000)).unwrap();

    assert_eq!(report.runs.len(), 4);
    for run in &report.runs {
        match run.policy_id.as_str() {
            "indecisive" => {
                assert!(matches!(run.outcome, RunOutcome::PolicyDefect { .. }));
            },
            _ => assert!(
                matches!(run.outcome, RunOutcome::Completed(_)),
                "policy {} should have completed",
                run.policy_id
            ),
        }
    }
    // The defective run never competes for the ranking.
    assert_ne!(report.best().unwrap().policy_id, "indecisive");
}

#[test]
fn metadata_leak_aborts_the_whole_batch() {
    let runner = BatchRunner::<u64>::new(16)
        .unwrap()
        .with_builtin_policies()
        .register(PolicyCase {
            id: "amnesiac",
            display_name: "Amnesiac",
            build: build_amnesiac,
        });
    let err = runner.run(&hotset_trace(100)).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn lenient_mode_lets_an_untracked_policy_run() {
    let runner = BatchRunner::<u64>::new(16)
        .unwrap()
        .register(PolicyCase {
            id: "amnesiac",
            display_name: "Amnesiac",
            build: build_amnesiac,
        })
        .with_strict_metadata(false);
    let report = runner.run(&hotset_trace(500)).unwrap();
    assert!(matches!(report.runs[0].outcome, RunOutcome::Completed(_)));
}

// ==============================================
// Trace File Round Trip
// ==============================================

#[test]
fn loaded_trace_drives_a_string_keyed_batch() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "key,size").unwrap();
    for key in ["a", "b", "a", "c", "b", "a", "d", "a"] {
        writeln!(file, "{key},1").unwrap();
    }

    let format = TraceFormat {
        has_header: true,
        ..TraceFormat::default()
    };
    let trace = load_trace(file.path(), &format).unwrap();
    assert_eq!(trace.len(), 8);

    let report = BatchRunner::<String>::new(2)
        .unwrap()
        .with_builtin_policies()
        .run(&trace)
        .unwrap();

    for (run, stats) in report.completed() {
        assert_eq!(stats.access_count, 8, "policy {}", run.policy_id);
        assert_eq!(stats.hit_count + stats.miss_count, 8);
        assert!(stats.final_occupancy <= 2);
    }
    assert_eq!(report.completed().count(), 3);
}

// ==============================================
// Artifact Shape
// ==============================================

#[test]
fn json_artifact_carries_rows_and_metadata() {
    let report = BatchRunner::<u64>::new(16)
        .unwrap()
        .with_builtin_policies()
        .with_step_budget(10_000)
        .run(&hotset_trace(2_000))
        .unwrap();

    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["schema_version"], 1);
    assert_eq!(value["metadata"]["capacity"], 16);
    assert_eq!(value["metadata"]["trace_len"], 2_000);
    assert_eq!(value["metadata"]["step_budget"], 10_000);

    let runs = value["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 3);
    for run in runs {
        assert_eq!(run["status"], "completed");
        assert!(run["policy_id"].is_string());
        assert!(run["miss_ratio"].is_number());
        assert_eq!(
            run["hit_count"].as_u64().unwrap() + run["miss_count"].as_u64().unwrap(),
            2_000
        );
    }
}

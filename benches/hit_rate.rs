//! Replay throughput for the built-in policies over synthetic workloads.
//!
//! Run with: `cargo bench --bench hit_rate`

use cachesim::policy::builtin_policies;
use cachesim::sim::CacheSimulator;
use cachesim::trace::{AccessPattern, SizeModel, Trace, WorkloadSpec};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

const CAPACITY: u64 = 1024;
const UNIVERSE: u64 = 16_384;
const OPS: usize = 50_000;
const SEED: u64 = 42;

fn workload(pattern: AccessPattern) -> Trace<u64> {
    WorkloadSpec {
        universe: UNIVERSE,
        pattern,
        sizes: SizeModel::Unit,
        seed: SEED,
    }
    .synthesize(OPS)
}

fn bench_replay(c: &mut Criterion) {
    let workloads = [
        ("uniform", workload(AccessPattern::Uniform)),
        (
            "hotset",
            workload(AccessPattern::Hotset {
                hot_fraction: 0.1,
                hot_prob: 0.9,
            }),
        ),
        ("zipfian", workload(AccessPattern::Zipfian { theta: 0.99 })),
    ];

    for (workload_name, trace) in &workloads {
        for case in builtin_policies::<u64>() {
            c.bench_function(&format!("replay_{}_{workload_name}", case.id), |b| {
                b.iter_batched(
                    || {
                        CacheSimulator::new(CAPACITY, (case.build)())
                            .expect("nonzero capacity")
                            .with_strict_metadata(false)
                    },
                    |mut sim| {
                        let stats = sim.replay(std::hint::black_box(trace), None).unwrap();
                        std::hint::black_box(stats)
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }
}

fn bench_strict_audit_overhead(c: &mut Criterion) {
    let trace = workload(AccessPattern::Zipfian { theta: 0.99 });
    let build_lru = builtin_policies::<u64>()[0].build;

    for strict in [false, true] {
        let label = if strict { "strict" } else { "lenient" };
        c.bench_function(&format!("replay_lru_zipfian_{label}"), |b| {
            b.iter_batched(
                || {
                    CacheSimulator::new(CAPACITY, build_lru())
                        .expect("nonzero capacity")
                        .with_strict_metadata(strict)
                },
                |mut sim| {
                    let stats = sim.replay(std::hint::black_box(&trace), None).unwrap();
                    std::hint::black_box(stats)
                },
                BatchSize::LargeInput,
            )
        });
    }
}

criterion_group!(benches, bench_replay, bench_strict_audit_overhead);
criterion_main!(benches);

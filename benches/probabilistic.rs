use std::{hint::black_box, sync::Arc, thread};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use firstseen::{
    BloomSizing, ExpectedCardinality, FalsePositiveTarget, MembershipOracle,
    MembershipOracleOptions, OracleStrategy, ProbabilisticSetOptions, ShardCount,
};

fn options(expected_cardinality: u64, target: f64) -> ProbabilisticSetOptions {
    ProbabilisticSetOptions {
        expected_cardinality: ExpectedCardinality::try_from(expected_cardinality).unwrap(),
        false_positive_target: FalsePositiveTarget::try_from(target).unwrap(),
        shard_count: ShardCount::default(),
    }
}

fn oracle(expected_cardinality: u64) -> MembershipOracle {
    MembershipOracle::new(MembershipOracleOptions {
        strategy: OracleStrategy::Probabilistic(options(expected_cardinality, 0.001)),
    })
    .unwrap()
}

fn bench_duplicate_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("probabilistic/duplicate");
    group.sample_size(200);

    group.bench_function("check_and_mark/hot_id", |b| {
        let oracle = oracle(1_000_000);
        oracle.check_and_mark(1).unwrap();

        b.iter(|| black_box(oracle.check_and_mark(black_box(1))));
    });

    group.finish();
}

fn bench_first_seen_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("probabilistic/first_seen");
    group.sample_size(100);

    for expected in [1_000_000_u64, 100_000_000] {
        group.bench_function(format!("check_and_mark/expected={expected}"), |b| {
            let oracle = oracle(expected);
            let mut next = 0_i64;

            b.iter_batched(
                || {
                    next += 1;
                    next
                },
                |id| black_box(oracle.check_and_mark(black_box(id))),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("probabilistic/contended");
    group.sample_size(20);

    for threads in [2_usize, 8] {
        group.bench_function(format!("100k_ids/threads={threads}"), |b| {
            b.iter_batched(
                || Arc::new(oracle(100_000)),
                |oracle| {
                    thread::scope(|s| {
                        for t in 0..threads {
                            let oracle = &oracle;
                            s.spawn(move || {
                                for id in 0..100_000_i64 {
                                    let id = (id + t as i64 * 12_500) % 100_000;
                                    black_box(oracle.check_and_mark(id).unwrap());
                                }
                            });
                        }
                    });
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_sizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("probabilistic/sizing");

    group.bench_function("compute/10M@0.001", |b| {
        let opts = options(10_000_000, 0.001);
        b.iter(|| {
            black_box(BloomSizing::compute(
                black_box(opts.expected_cardinality),
                black_box(opts.false_positive_target),
                black_box(opts.shard_count),
            ))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_duplicate_path,
    bench_first_seen_path,
    bench_contended,
    bench_sizing
);
criterion_main!(benches);

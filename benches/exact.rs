use std::{hint::black_box, sync::Arc, thread};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use firstseen::{ExactSetOptions, MembershipOracle, MembershipOracleOptions, OracleStrategy};

fn oracle() -> MembershipOracle {
    MembershipOracle::new(MembershipOracleOptions {
        strategy: OracleStrategy::Exact(ExactSetOptions::default()),
    })
    .unwrap()
}

fn bench_duplicate_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact/duplicate");
    group.sample_size(200);

    group.bench_function("check_and_mark/hot_id", |b| {
        let oracle = oracle();
        oracle.check_and_mark(1).unwrap();

        b.iter(|| black_box(oracle.check_and_mark(black_box(1))));
    });

    group.finish();
}

fn bench_first_seen_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact/first_seen");
    group.sample_size(100);

    for prefill in [0_i64, 1_000_000] {
        group.bench_function(format!("check_and_mark/prefill={prefill}"), |b| {
            let oracle = oracle();
            for id in 0..prefill {
                oracle.check_and_mark(id).unwrap();
            }
            let mut next = prefill;

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
    let mut group = c.benchmark_group("exact/contended");
    group.sample_size(20);

    for threads in [2_usize, 8] {
        group.bench_function(format!("100k_ids/threads={threads}"), |b| {
            b.iter_batched(
                || Arc::new(oracle()),
                |oracle| {
                    thread::scope(|s| {
                        for t in 0..threads {
                            let oracle = &oracle;
                            s.spawn(move || {
                                for id in 0..100_000_i64 {
                                    // Every thread walks the same ids from a different offset.
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

criterion_group!(
    benches,
    bench_duplicate_path,
    bench_first_seen_path,
    bench_contended
);
criterion_main!(benches);

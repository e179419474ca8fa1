use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use clap::{Parser, ValueEnum};
use hdrhistogram::Histogram;

use firstseen::{
    ExactSetOptions, ExpectedCardinality, FalsePositiveTarget, MembershipOracle,
    MembershipOracleOptions, OracleStrategy, ProbabilisticSetOptions, SeenId, ShardCount,
};

mod baseline;
use baseline::Baseline;

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Strategy {
    /// firstseen exact strategy.
    Exact,
    /// firstseen probabilistic strategy.
    Probabilistic,
    /// Global `Mutex<HashSet>`.
    Mutex,
    /// Plain `DashSet`.
    DashSet,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum IdDist {
    /// Every id is issued once; duplicates reported are false positives.
    Distinct,
    /// Ids drawn uniformly from `0..ids`.
    Uniform,
    /// A single id hammered by every thread.
    Hot,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "firstseen-stress",
    about = "Load test / benchmark harness for firstseen"
)]
struct Args {
    #[arg(long, value_enum, default_value_t = Strategy::Probabilistic)]
    strategy: Strategy,

    #[arg(long, value_enum, default_value_t = IdDist::Distinct)]
    id_dist: IdDist,

    #[arg(long, default_value_t = 8)]
    threads: usize,

    #[arg(long, default_value_t = 10)]
    duration_s: u64,

    /// Id space; also the expected cardinality of the probabilistic filter.
    #[arg(long, default_value_t = 10_000_000)]
    ids: u64,

    #[arg(long, default_value_t = 0.001)]
    fp_target: f64,

    /// Shard count; defaults to the library default.
    #[arg(long)]
    shards: Option<usize>,

    #[arg(long, default_value_t = 100)]
    sample_every: u64,
}

enum Target {
    Oracle(MembershipOracle),
    Baseline(Baseline),
}

impl Target {
    fn mark(&self, id: u64) -> bool {
        match self {
            Target::Oracle(oracle) => oracle.mark(SeenId::from(id)),
            Target::Baseline(baseline) => baseline.mark(id),
        }
    }
}

#[derive(Default)]
struct Counts {
    first: AtomicU64,
    duplicate: AtomicU64,
}

fn shard_count(args: &Args) -> ShardCount {
    match args.shards {
        Some(shards) => ShardCount::try_from(shards).unwrap(),
        None => ShardCount::default(),
    }
}

fn build_target(args: &Args) -> Target {
    let strategy = match args.strategy {
        Strategy::Mutex => return Target::Baseline(Baseline::mutex()),
        Strategy::DashSet => return Target::Baseline(Baseline::dash_set()),
        Strategy::Exact => OracleStrategy::Exact(ExactSetOptions {
            shard_count: shard_count(args),
            initial_capacity: 0,
        }),
        Strategy::Probabilistic => OracleStrategy::Probabilistic(ProbabilisticSetOptions {
            expected_cardinality: ExpectedCardinality::try_from(args.ids).unwrap(),
            false_positive_target: FalsePositiveTarget::try_from(args.fp_target).unwrap(),
            shard_count: shard_count(args),
        }),
    };

    Target::Oracle(MembershipOracle::new(MembershipOracleOptions { strategy }).unwrap())
}

fn should_sample(iter: u64, sample_every: u64) -> bool {
    if sample_every <= 1 {
        return true;
    }

    iter.is_multiple_of(sample_every)
}

fn print_results(
    args: &Args,
    target: &Target,
    elapsed: Duration,
    ops: u64,
    hist: &Histogram<u64>,
    counts: &Counts,
) {
    let ops_s = ops as f64 / elapsed.as_secs_f64();
    let first = counts.first.load(Ordering::Relaxed);
    let duplicate = counts.duplicate.load(Ordering::Relaxed);

    println!("strategy={:?} id_dist={:?}", args.strategy, args.id_dist);
    println!(
        "threads={} duration_s={} ids={} fp_target={}",
        args.threads, args.duration_s, args.ids, args.fp_target
    );
    println!(
        "elapsed_s={:.3} ops={} ops_per_s={:.0}",
        elapsed.as_secs_f64(),
        ops,
        ops_s
    );
    println!("first={first} duplicate={duplicate}");

    if args.id_dist == IdDist::Distinct && ops > 0 {
        println!(
            "observed_fp_rate={:.6} (distinct ids: every duplicate is a false positive)",
            duplicate as f64 / ops as f64
        );
    }

    if let Target::Oracle(oracle) = target
        && let Some(filter) = oracle.bloom_filter()
    {
        let sizing = filter.sizing();
        println!(
            "bloom shards={} words_per_shard={} hash_count={} memory_bytes={} bits_per_id={:.2}",
            sizing.shards,
            sizing.words_per_shard,
            sizing.hash_count,
            sizing.memory_bytes(),
            sizing.bits_per_id()
        );
        println!(
            "bloom marked={} estimated_fp_rate={:.6} fill_ratio={:.4}",
            filter.marked_count(),
            filter.estimated_false_positive_rate(),
            filter.fill_ratio()
        );
    }

    if !hist.is_empty() {
        println!(
            "lat_ns p50={} p95={} p99={} p999={} max={}",
            hist.value_at_quantile(0.50),
            hist.value_at_quantile(0.95),
            hist.value_at_quantile(0.99),
            hist.value_at_quantile(0.999),
            hist.max()
        );
        println!("sample_every={} samples={}", args.sample_every, hist.len());
    } else {
        println!("no latency samples collected");
    }
}

fn run(args: &Args) {
    let target = Arc::new(build_target(args));

    let counts = Arc::new(Counts::default());
    let total_ops = Arc::new(AtomicU64::new(0));
    let next_distinct = Arc::new(AtomicU64::new(0));

    let started = Instant::now();
    let deadline = started + Duration::from_secs(args.duration_s);

    let mut handles = Vec::with_capacity(args.threads);
    for t in 0..args.threads {
        let target = Arc::clone(&target);
        let counts = Arc::clone(&counts);
        let total_ops = Arc::clone(&total_ops);
        let next_distinct = Arc::clone(&next_distinct);
        let args = args.clone();

        handles.push(std::thread::spawn(move || {
            let mut hist = Histogram::<u64>::new_with_bounds(1, 60_000_000_000, 3).unwrap();
            let mut i = 0_u64;
            let mut seed = (t as u64 + 1) * 0x9E37_79B9_7F4A_7C15;

            let mut rng_u64 = || {
                // xorshift64*
                seed ^= seed >> 12;
                seed ^= seed << 25;
                seed ^= seed >> 27;
                seed = seed.wrapping_mul(0x2545_F491_4F6C_DD1D);
                seed
            };

            while Instant::now() < deadline {
                let id = match args.id_dist {
                    IdDist::Distinct => {
                        let id = next_distinct.fetch_add(1, Ordering::Relaxed);
                        if id >= args.ids {
                            break;
                        }
                        id
                    }
                    IdDist::Uniform => rng_u64() % args.ids.max(1),
                    IdDist::Hot => 0,
                };

                i = i.wrapping_add(1);
                let t0 = should_sample(i, args.sample_every).then(Instant::now);

                let first = target.mark(id);

                if let Some(t0) = t0 {
                    let ns = t0.elapsed().as_nanos() as u64;
                    let _ = hist.record(ns.max(1));
                }

                total_ops.fetch_add(1, Ordering::Relaxed);
                if first {
                    counts.first.fetch_add(1, Ordering::Relaxed);
                } else {
                    counts.duplicate.fetch_add(1, Ordering::Relaxed);
                }
            }

            hist
        }));
    }

    let mut merged = Histogram::<u64>::new_with_bounds(1, 60_000_000_000, 3).unwrap();
    for h in handles {
        let hist = h.join().unwrap();
        merged.add(&hist).unwrap();
    }

    let elapsed = started.elapsed();
    let ops = total_ops.load(Ordering::Relaxed);
    print_results(args, &target, elapsed, ops, &merged, &counts);
}

fn main() {
    let args = Args::parse();
    run(&args);
}

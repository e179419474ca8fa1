use std::{
    collections::HashMap,
    sync::{Arc, Barrier, Mutex},
    thread,
};

use crate::{
    DuplicateCheck, ExactSetOptions, ExpectedCardinality, FalsePositiveTarget, FirstSeenError,
    MembershipOracle, MembershipOracleOptions, OracleStrategy, ProbabilisticSetOptions, SeenId,
    ShardCount, StrategyKind,
};

fn exact() -> MembershipOracle {
    MembershipOracle::new(MembershipOracleOptions {
        strategy: OracleStrategy::Exact(ExactSetOptions {
            shard_count: ShardCount::try_from(8usize).unwrap(),
            initial_capacity: 16,
        }),
    })
    .unwrap()
}

fn probabilistic() -> MembershipOracle {
    MembershipOracle::new(MembershipOracleOptions {
        strategy: OracleStrategy::Probabilistic(ProbabilisticSetOptions {
            expected_cardinality: ExpectedCardinality::try_from(10_000u64).unwrap(),
            false_positive_target: FalsePositiveTarget::try_from(0.001).unwrap(),
            shard_count: ShardCount::try_from(8usize).unwrap(),
        }),
    })
    .unwrap()
}

fn both() -> [MembershipOracle; 2] {
    [exact(), probabilistic()]
}

/// Issues every id from its own thread, released together, and returns the
/// results by index.
fn run_concurrently(oracle: &MembershipOracle, ids: &[i64]) -> Vec<bool> {
    let barrier = Barrier::new(ids.len());
    let results = Mutex::new(HashMap::new());

    thread::scope(|s| {
        for (index, &id) in ids.iter().enumerate() {
            let barrier = &barrier;
            let results = &results;
            s.spawn(move || {
                barrier.wait();
                let seen_first = oracle.check_and_mark(id).unwrap();
                results.lock().unwrap().insert(index, seen_first);
            });
        }
    });

    let results = results.into_inner().unwrap();
    (0..ids.len()).map(|i| results[&i]).collect()
}

#[test]
fn reference_scenario_has_one_winner_per_duplicate_pair() {
    let ids = [1, 2, 1, 2, 3, 4, 5, 3];

    for oracle in both() {
        let results = run_concurrently(&oracle, &ids);

        assert!(results[0] ^ results[2], "id 1: {results:?}");
        assert!(results[1] ^ results[3], "id 2: {results:?}");
        assert!(results[4] ^ results[7], "id 3: {results:?}");
        assert!(results[5], "id 4 should be new");
        assert!(results[6], "id 5 should be new");
        assert_eq!(oracle.marked_count(), 5);
    }
}

#[test]
fn negative_id_is_rejected_and_changes_nothing() {
    for oracle in both() {
        assert_eq!(oracle.check_and_mark(10), Ok(true));

        assert_eq!(
            oracle.check_and_mark(-1).unwrap_err(),
            FirstSeenError::InvalidArgument(-1)
        );
        assert_eq!(oracle.marked_count(), 1);

        // Same absolute value behaves as if the rejected call never happened.
        assert_eq!(oracle.check_and_mark(1), Ok(true));
        assert_eq!(oracle.check_and_mark(10), Ok(false));
    }
}

#[test]
fn duplicates_stay_false() {
    for oracle in both() {
        assert_eq!(oracle.check_and_mark(i64::MAX), Ok(true));
        for _ in 0..100 {
            assert_eq!(oracle.check_and_mark(i64::MAX), Ok(false));
        }
    }
}

#[test]
fn mark_accepts_validated_ids() {
    let oracle = exact();
    let id = SeenId::try_from(5i64).unwrap();

    assert!(oracle.mark(id));
    assert_eq!(oracle.check_and_mark(5), Ok(false));
}

#[test]
fn strategy_accessors_match_construction() {
    let oracle = exact();
    assert_eq!(oracle.strategy_kind(), StrategyKind::Exact);
    assert!(oracle.exact_set().is_some());
    assert!(oracle.bloom_filter().is_none());

    let oracle = probabilistic();
    assert_eq!(oracle.strategy_kind(), StrategyKind::Probabilistic);
    assert!(oracle.exact_set().is_none());
    assert_eq!(
        oracle.bloom_filter().unwrap().sizing().expected_cardinality,
        10_000
    );
}

#[test]
fn shorthand_constructors() {
    let oracle = MembershipOracle::exact();
    assert_eq!(oracle.strategy_kind(), StrategyKind::Exact);

    let oracle = MembershipOracle::probabilistic(1_000).unwrap();
    assert_eq!(oracle.strategy_kind(), StrategyKind::Probabilistic);
    let sizing = oracle.bloom_filter().unwrap().sizing();
    assert_eq!(
        sizing.false_positive_target,
        *FalsePositiveTarget::default()
    );

    assert!(matches!(
        MembershipOracle::probabilistic(0),
        Err(FirstSeenError::InvalidExpectedCardinality(_))
    ));
}

#[test]
fn usable_as_shared_duplicate_check() {
    let checks: Vec<Arc<dyn DuplicateCheck>> = both()
        .into_iter()
        .map(|oracle| Arc::new(oracle) as Arc<dyn DuplicateCheck>)
        .collect();

    for check in checks {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let check = Arc::clone(&check);
                thread::spawn(move || check.check_and_mark(99).unwrap())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&first| first)
            .count();

        assert_eq!(wins, 1);
    }
}

// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use std::sync::{Arc, Barrier};
use std::thread;
use veilstake::core::economics::ledger::{StakeError, StakeLedger};
use veilstake::core::economics::registry::{Pool, PoolRegistry};
use veilstake::core::types::{Amount, ParticipantId, PoolId};

fn pool(id: &str, cap: u64) -> Pool {
    Pool {
        id: PoolId::new(id).unwrap(),
        name: id.to_string(),
        min_stake: Amount::from_whole(1),
        max_capacity: Amount::from_whole(cap),
        reward_rate_bps: 500,
    }
}

fn participant(n: u16) -> ParticipantId {
    let mut b = [0u8; 20];
    b[18..].copy_from_slice(&n.to_be_bytes());
    ParticipantId::from_bytes(b)
}

fn ledger(pools: Vec<Pool>) -> Arc<StakeLedger> {
    Arc::new(StakeLedger::new(Arc::new(PoolRegistry::new(pools).unwrap())))
}

#[test]
fn two_racing_reservations_exactly_one_wins() {
    for _ in 0..200 {
        let ledger = ledger(vec![pool("p", 100)]);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (1..=2u16)
            .map(|who| {
                let ledger = ledger.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let p = PoolId::new("p").unwrap();
                    barrier.wait();
                    ledger.reserve_and_commit(&p, &participant(who), Amount::from_whole(60))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let capped = results
            .iter()
            .filter(|r| matches!(r, Err(StakeError::CapacityExceeded { .. })))
            .count();
        assert_eq!((ok, capped), (1, 1));

        let totals = ledger.pool_totals(&PoolId::new("p").unwrap()).unwrap();
        assert_eq!(totals.total_staked, Amount::from_whole(60));
        assert_eq!(totals.participant_count, 1);
    }
}

#[test]
fn many_writers_never_overfill() {
    let ledger = ledger(vec![pool("p", 1_000)]);
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16u16)
        .map(|t| {
            let ledger = ledger.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let p = PoolId::new("p").unwrap();
                barrier.wait();
                let mut committed = Amount::ZERO;
                for i in 0..50u16 {
                    let amount = Amount::from_whole(1 + ((t + i) % 7) as u64);
                    if ledger
                        .reserve_and_commit(&p, &participant(t), amount)
                        .is_ok()
                    {
                        committed = committed.checked_add(amount).unwrap();
                    }
                }
                committed
            })
        })
        .collect();

    let mut sum = Amount::ZERO;
    for h in handles {
        sum = sum.checked_add(h.join().unwrap()).unwrap();
    }

    let p = PoolId::new("p").unwrap();
    let totals = ledger.pool_totals(&p).unwrap();
    assert!(totals.total_staked <= Amount::from_whole(1_000));
    assert_eq!(totals.total_staked, sum);

    let mut own_sum = Amount::ZERO;
    for t in 0..16u16 {
        own_sum = own_sum
            .checked_add(ledger.get_own_stake(&p, &participant(t)).unwrap())
            .unwrap();
    }
    assert_eq!(own_sum, totals.total_staked);
}

#[test]
fn pools_are_independent_under_load() {
    let ids = ["a", "b", "c", "d"];
    let ledger = ledger(ids.iter().map(|id| pool(id, 10_000)).collect());
    let barrier = Arc::new(Barrier::new(ids.len()));

    let handles: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(n, id)| {
            let ledger = ledger.clone();
            let barrier = barrier.clone();
            let id = id.to_string();
            thread::spawn(move || {
                let p = PoolId::new(id).unwrap();
                barrier.wait();
                for i in 0..100u16 {
                    ledger
                        .reserve_and_commit(&p, &participant(i), Amount::from_whole(n as u64 + 1))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for (n, id) in ids.iter().enumerate() {
        let totals = ledger.pool_totals(&PoolId::new(*id).unwrap()).unwrap();
        assert_eq!(totals.total_staked, Amount::from_whole(100 * (n as u64 + 1)));
        assert_eq!(totals.participant_count, 100);
    }
}

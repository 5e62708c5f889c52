// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use veilstake::core::economics::ledger::{StakeError, StakeLedger};
use veilstake::core::economics::registry::{Pool, PoolRegistry};
use veilstake::core::types::{Amount, ParticipantId, PoolId};

fn participant(n: u8) -> ParticipantId {
    let mut b = [0u8; 20];
    b[0] = n;
    ParticipantId::from_bytes(b)
}

fn make_ledger(min: u64, cap: u64) -> StakeLedger {
    let pool = Pool {
        id: PoolId::new("p").unwrap(),
        name: "prop".into(),
        min_stake: Amount::from_whole(min),
        max_capacity: Amount::from_whole(cap),
        reward_rate_bps: 500,
    };
    StakeLedger::new(Arc::new(PoolRegistry::new(vec![pool]).unwrap()))
}

proptest! {
    #[test]
    fn prop_commits_respect_capacity_and_ownership(
        min in 1u64..5,
        cap in 5u64..500,
        ops in prop::collection::vec((0u8..6, 0u64..120), 1..80),
    ) {
        let ledger = make_ledger(min, cap);
        let p = PoolId::new("p").unwrap();
        let mut model: BTreeMap<u8, u64> = BTreeMap::new();
        let mut total: u64 = 0;

        for (who, whole) in ops {
            let amount = Amount::from_whole(whole);
            let before = ledger.pool_totals(&p).unwrap();
            match ledger.reserve_and_commit(&p, &participant(who), amount) {
                Ok(own) => {
                    prop_assert!(whole >= min);
                    prop_assert!(total + whole <= cap);
                    total += whole;
                    let e = model.entry(who).or_insert(0);
                    *e += whole;
                    prop_assert_eq!(own, Amount::from_whole(*e));
                }
                Err(StakeError::InvalidAmount) => prop_assert_eq!(whole, 0),
                Err(StakeError::BelowMinimum { .. }) => prop_assert!(whole > 0 && whole < min),
                Err(StakeError::CapacityExceeded { remaining }) => {
                    prop_assert!(total + whole > cap);
                    prop_assert_eq!(remaining, Amount::from_whole(cap - total));
                }
                Err(e) => prop_assert!(false, "unexpected error {e}"),
            }
            let after = ledger.pool_totals(&p).unwrap();
            prop_assert!(after.total_staked <= Amount::from_whole(cap));
            prop_assert!(after.total_staked >= before.total_staked);
        }

        let totals = ledger.pool_totals(&p).unwrap();
        prop_assert_eq!(totals.total_staked, Amount::from_whole(total));
        prop_assert_eq!(totals.participant_count, model.len());
        for who in 0u8..6 {
            let expected = model.get(&who).copied().unwrap_or(0);
            prop_assert_eq!(
                ledger.get_own_stake(&p, &participant(who)).unwrap(),
                Amount::from_whole(expected)
            );
        }
    }
}

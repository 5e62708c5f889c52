// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use veilstake::core::economics::registry::{Pool, RegistryError};
use veilstake::core::economics::service::{ServiceError, StakingService};
use veilstake::core::economics::session::StakeRequest;
use veilstake::core::types::{Amount, ParticipantId, PoolId};

fn pool(id: &str, cap: u64, bps: u32) -> Pool {
    Pool {
        id: PoolId::new(id).unwrap(),
        name: id.to_string(),
        min_stake: Amount::parse_decimal("0.1").unwrap(),
        max_capacity: Amount::from_whole(cap),
        reward_rate_bps: bps,
    }
}

fn stake(svc: &StakingService, pool: &str, who: u8, whole: u64) {
    let mut b = [0u8; 20];
    b[5] = who;
    svc.stake(StakeRequest {
        pool_id: PoolId::new(pool).unwrap(),
        participant: ParticipantId::from_bytes(b),
        amount: Amount::from_whole(whole),
    });
}

fn dashboard() -> StakingService {
    StakingService::in_memory(vec![
        pool("001", 50_000, 820),
        pool("002", 25_000, 670),
        pool("003", 15_000, 1240),
    ])
    .unwrap()
}

#[test]
fn empty_system_has_zero_yield_and_no_active_pools() {
    let svc = dashboard();
    let sys = svc.system_aggregate().unwrap();
    assert_eq!(sys.total_value_locked, Amount::ZERO);
    assert_eq!(sys.average_yield, 0.0);
    assert_eq!(sys.total_stakers, 0);
    assert_eq!(sys.active_pool_count, 0);
    assert_eq!(sys.pool_count, 3);
}

#[test]
fn average_yield_ignores_empty_pools() {
    let svc = dashboard();
    stake(&svc, "001", 1, 100);
    stake(&svc, "003", 2, 100);

    let sys = svc.system_aggregate().unwrap();
    assert_eq!(sys.active_pool_count, 2);
    assert!((sys.average_yield - 10.3).abs() < 1e-9);

    stake(&svc, "002", 3, 100);
    let sys = svc.system_aggregate().unwrap();
    assert!((sys.average_yield - (8.2 + 6.7 + 12.4) / 3.0).abs() < 1e-9);
}

#[test]
fn totals_and_stakers_sum_across_pools() {
    let svc = dashboard();
    stake(&svc, "001", 1, 10);
    stake(&svc, "001", 1, 10);
    stake(&svc, "001", 2, 5);
    stake(&svc, "002", 1, 7);

    let sys = svc.system_aggregate().unwrap();
    assert_eq!(sys.total_value_locked, Amount::from_whole(32));
    // Participant 1 is in two pools and counted once per pool.
    assert_eq!(sys.total_stakers, 3);

    let a = svc.pool_aggregate(&PoolId::new("001").unwrap()).unwrap();
    assert_eq!(a.participant_count, 2);
    assert_eq!(a.total_staked, Amount::from_whole(25));
    assert!((a.capacity_used_ratio - 25.0 / 50_000.0).abs() < 1e-12);
}

#[test]
fn full_pool_ratio_is_one() {
    let svc = StakingService::in_memory(vec![pool("x", 100, 100)]).unwrap();
    stake(&svc, "x", 1, 100);
    let a = svc.pool_aggregate(&PoolId::new("x").unwrap()).unwrap();
    assert_eq!(a.capacity_used_ratio, 1.0);
}

#[test]
fn registry_rejects_bad_pools() {
    let dup = StakingService::in_memory(vec![pool("a", 10, 1), pool("a", 20, 1)]);
    assert!(matches!(
        dup,
        Err(ServiceError::Registry(RegistryError::DuplicatePool(_)))
    ));

    let mut tiny = pool("b", 10, 1);
    tiny.min_stake = Amount::from_whole(11);
    assert!(matches!(
        StakingService::in_memory(vec![tiny]),
        Err(ServiceError::Registry(RegistryError::MinAboveCapacity(_)))
    ));

    let mut zero = pool("c", 10, 1);
    zero.min_stake = Amount::ZERO;
    assert!(matches!(
        StakingService::in_memory(vec![zero]),
        Err(ServiceError::Registry(RegistryError::ZeroMinStake(_)))
    ));
}

#[test]
fn list_pools_keeps_registration_order() {
    let svc = dashboard();
    let ids: Vec<&str> = svc.list_pools().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["001", "002", "003"]);
}

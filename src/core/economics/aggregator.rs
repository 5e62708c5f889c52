#![allow(missing_docs)]
// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

//! Public statistics derived from the stake ledger.
//!
//! Reads are computed on demand from the ledger's per-pool totals, so they
//! always reflect the latest commit. Individual entries are never visited.
//!
//! Average yield policy: arithmetic mean of reward rates over pools with at
//! least one participant. Empty pools are excluded; with no participants
//! anywhere the average is `0.0`.

#![forbid(unsafe_code)]

use crate::core::economics::ledger::{StakeError, StakeLedger};
use crate::core::types::{Amount, PoolId};
use crate::monitoring::metrics::Metrics;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoolAggregate {
    pub total_staked: Amount,
    pub participant_count: usize,
    /// total / capacity, in `[0, 1]`.
    pub capacity_used_ratio: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SystemAggregate {
    pub total_value_locked: Amount,
    /// Percent.
    pub average_yield: f64,
    /// Sum of per-pool participant counts.
    pub total_stakers: usize,
    /// Pools with at least one participant.
    pub active_pool_count: usize,
    pub pool_count: usize,
}

pub struct Aggregator {
    ledger: Arc<StakeLedger>,
    metrics: Option<Metrics>,
    // Held across compute and publish so gauges never go backwards.
    publish: Mutex<()>,
}

impl Aggregator {
    pub fn new(ledger: Arc<StakeLedger>) -> Self {
        Self {
            ledger,
            metrics: None,
            publish: Mutex::new(()),
        }
    }

    /// Publish refreshed figures to `metrics` on every `refresh`.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn get_pool_aggregate(&self, pool_id: &PoolId) -> Result<PoolAggregate, StakeError> {
        let pool = self
            .ledger
            .registry()
            .get_pool(pool_id)
            .ok_or_else(|| StakeError::NotFound(pool_id.clone()))?;
        let totals = self.ledger.pool_totals(pool_id)?;
        Ok(PoolAggregate {
            total_staked: totals.total_staked,
            participant_count: totals.participant_count,
            capacity_used_ratio: totals.total_staked.to_f64() / pool.max_capacity.to_f64(),
        })
    }

    pub fn get_system_aggregate(&self) -> Result<SystemAggregate, StakeError> {
        let pools = self.ledger.registry().list_pools();
        let mut tvl = Amount::ZERO;
        let mut stakers = 0usize;
        let mut active = 0usize;
        let mut rate_sum_bps: u64 = 0;

        for pool in pools {
            let totals = self.ledger.pool_totals(&pool.id)?;
            tvl = tvl.checked_add(totals.total_staked).ok_or_else(|| {
                StakeError::InvariantViolation("total value locked overflows".into())
            })?;
            stakers += totals.participant_count;
            if totals.participant_count > 0 {
                active += 1;
                rate_sum_bps += pool.reward_rate_bps as u64;
            }
        }

        let average_yield = if active == 0 {
            0.0
        } else {
            rate_sum_bps as f64 / active as f64 / 100.0
        };

        Ok(SystemAggregate {
            total_value_locked: tvl,
            average_yield,
            total_stakers: stakers,
            active_pool_count: active,
            pool_count: pools.len(),
        })
    }

    /// Compute the system aggregate and publish it to metrics, if attached.
    pub fn publish_system(&self) -> Result<SystemAggregate, StakeError> {
        let _guard = self.publish.lock();
        let system = self.get_system_aggregate()?;
        if let Some(m) = &self.metrics {
            m.observe_system(&system);
        }
        Ok(system)
    }

    /// Push hook run after a commit on `pool_id`.
    pub fn refresh(&self, pool_id: &PoolId) -> Result<(), StakeError> {
        let pool = self.get_pool_aggregate(pool_id)?;
        let system = self.publish_system()?;
        debug!(
            pool = %pool_id,
            pool_total = %pool.total_staked,
            pool_participants = pool.participant_count,
            capacity_used = pool.capacity_used_ratio,
            tvl = %system.total_value_locked,
            "aggregates refreshed"
        );
        Ok(())
    }
}

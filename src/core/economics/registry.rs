#![allow(missing_docs)]
// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

//! Pool registry: immutable set of pools and their public parameters.

#![forbid(unsafe_code)]

use crate::core::types::{Amount, PoolId};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate pool id {0}")]
    DuplicatePool(PoolId),
    #[error("pool {0}: minimum stake must be positive")]
    ZeroMinStake(PoolId),
    #[error("pool {0}: capacity must be positive")]
    ZeroCapacity(PoolId),
    #[error("pool {0}: minimum stake exceeds capacity")]
    MinAboveCapacity(PoolId),
}

/// Public parameters of a staking pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    pub min_stake: Amount,
    pub max_capacity: Amount,
    /// Reward rate in basis points (820 == 8.2%).
    pub reward_rate_bps: u32,
}

impl Pool {
    /// Reward rate as a percentage.
    pub fn reward_rate_pct(&self) -> f64 {
        self.reward_rate_bps as f64 / 100.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
    index: BTreeMap<PoolId, usize>,
}

impl PoolRegistry {
    /// Build a registry, keeping the given order for `list_pools`.
    pub fn new(pools: Vec<Pool>) -> Result<Self, RegistryError> {
        let mut index = BTreeMap::new();
        for (i, p) in pools.iter().enumerate() {
            if p.min_stake.is_zero() {
                return Err(RegistryError::ZeroMinStake(p.id.clone()));
            }
            if p.max_capacity.is_zero() {
                return Err(RegistryError::ZeroCapacity(p.id.clone()));
            }
            if p.min_stake > p.max_capacity {
                return Err(RegistryError::MinAboveCapacity(p.id.clone()));
            }
            if index.insert(p.id.clone(), i).is_some() {
                return Err(RegistryError::DuplicatePool(p.id.clone()));
            }
        }
        Ok(Self { pools, index })
    }

    pub fn get_pool(&self, id: &PoolId) -> Option<&Pool> {
        self.index.get(id).map(|&i| &self.pools[i])
    }

    pub fn list_pools(&self) -> &[Pool] {
        &self.pools
    }
}

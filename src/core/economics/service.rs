#![allow(missing_docs)]
// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

//! Staking service: registry, ledger and aggregator wired together.

#![forbid(unsafe_code)]

use crate::core::config::{ConfigError, ServiceConfig};
use crate::core::economics::aggregator::{Aggregator, PoolAggregate, SystemAggregate};
use crate::core::economics::ledger::{StakeError, StakeLedger};
use crate::core::economics::registry::{Pool, PoolRegistry, RegistryError};
use crate::core::economics::session::{RejectReason, StakeReceipt, StakeRequest, StakeSession};
use crate::core::state::persistent_state::{LedgerStore, StakeStore, StateError};
use crate::core::types::{Amount, ParticipantId, PoolId};
use crate::monitoring::metrics::{Metrics, MetricsError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Ledger(#[from] StakeError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

pub struct StakingService {
    ledger: Arc<StakeLedger>,
    aggregator: Aggregator,
    metrics: Metrics,
}

impl StakingService {
    /// Build a service over `pools`; `store` makes the ledger durable.
    pub fn new(
        pools: Vec<Pool>,
        store: Option<Box<dyn StakeStore>>,
        metrics: Metrics,
    ) -> Result<Self, ServiceError> {
        let registry = Arc::new(PoolRegistry::new(pools)?);
        let ledger = Arc::new(match store {
            Some(store) => StakeLedger::open(registry, store)?,
            None => StakeLedger::new(registry),
        });
        let aggregator = Aggregator::new(ledger.clone()).with_metrics(metrics.clone());

        let svc = Self {
            ledger,
            aggregator,
            metrics,
        };
        // Gauges start from whatever was reloaded.
        svc.publish_system_metrics()?;
        Ok(svc)
    }

    /// In-memory service with a private metrics registry.
    pub fn in_memory(pools: Vec<Pool>) -> Result<Self, ServiceError> {
        Self::new(pools, None, Metrics::new()?)
    }

    pub fn from_config(cfg: &ServiceConfig, metrics: Metrics) -> Result<Self, ServiceError> {
        let pools = cfg.pools()?;
        let store = match &cfg.service.data_dir {
            Some(dir) => {
                info!(data_dir = %dir, "opening ledger store");
                Some(Box::new(LedgerStore::open(dir)?) as Box<dyn StakeStore>)
            }
            None if cfg!(feature = "production") => {
                return Err(ConfigError::Invalid(
                    "production builds require service.data_dir".into(),
                )
                .into());
            }
            None => {
                info!("ledger store disabled; stakes are kept in memory only");
                None
            }
        };
        Self::new(pools, store, metrics)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Recompute the system gauges from the ledger and publish them.
    pub fn publish_system_metrics(&self) -> Result<(), StakeError> {
        self.aggregator.publish_system().map(|_| ())
    }

    pub fn list_pools(&self) -> &[Pool] {
        self.ledger.registry().list_pools()
    }

    pub fn get_pool(&self, pool_id: &PoolId) -> Result<&Pool, StakeError> {
        self.ledger
            .registry()
            .get_pool(pool_id)
            .ok_or_else(|| StakeError::NotFound(pool_id.clone()))
    }

    /// Run a stake request to completion and return the settled session.
    pub fn stake_session(&self, request: StakeRequest) -> StakeSession {
        let mut session = StakeSession::new(request);
        session.run(&self.ledger, &self.aggregator);
        match session.receipt().and_then(|r| r.reason) {
            Some(reason) => self.metrics.record_rejection(reason.as_str()),
            None => self.metrics.record_commit(),
        }
        session
    }

    pub fn stake(&self, request: StakeRequest) -> StakeReceipt {
        let session = self.stake_session(request);
        session
            .receipt()
            .unwrap_or_else(|| StakeReceipt::rejected(RejectReason::Internal))
    }

    /// Stake from unparsed input: a malformed pool id is unknown, a malformed
    /// amount is invalid.
    pub fn stake_raw(&self, pool_id: &str, participant: ParticipantId, amount: &str) -> StakeReceipt {
        let Ok(pool_id) = PoolId::new(pool_id) else {
            self.metrics.record_rejection(RejectReason::NotFound.as_str());
            return StakeReceipt::rejected(RejectReason::NotFound);
        };
        let Ok(amount) = Amount::parse_decimal(amount) else {
            self.metrics.record_rejection(RejectReason::InvalidAmount.as_str());
            return StakeReceipt::rejected(RejectReason::InvalidAmount);
        };
        self.stake(StakeRequest {
            pool_id,
            participant,
            amount,
        })
    }

    pub fn own_stake(
        &self,
        pool_id: &PoolId,
        participant: &ParticipantId,
    ) -> Result<Amount, StakeError> {
        self.ledger.get_own_stake(pool_id, participant)
    }

    pub fn pool_aggregate(&self, pool_id: &PoolId) -> Result<PoolAggregate, StakeError> {
        self.aggregator.get_pool_aggregate(pool_id)
    }

    pub fn system_aggregate(&self) -> Result<SystemAggregate, StakeError> {
        self.aggregator.get_system_aggregate()
    }
}

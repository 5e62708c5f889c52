#![allow(missing_docs)]
// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

//! Stake ledger: per-pool, per-participant committed amounts.
//!
//! Every pool owns its own lock. `reserve_and_commit` holds it across the
//! capacity check and the write, so reservations on one pool serialize while
//! different pools never contend. The read surface is limited to pool totals
//! and the caller's own entry; there is no way to enumerate entries.

#![forbid(unsafe_code)]

use crate::core::economics::registry::PoolRegistry;
use crate::core::state::persistent_state::{Durability, StakeStore, StateError, StoredEntry};
use crate::core::types::{unix_now_ms, Amount, ParticipantId, PoolId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum StakeError {
    #[error("unknown pool {0}")]
    NotFound(PoolId),
    #[error("amount must be a positive decimal")]
    InvalidAmount,
    #[error("amount {amount} is below the pool minimum {min}")]
    BelowMinimum { min: Amount, amount: Amount },
    #[error("pool capacity exceeded ({remaining} remaining)")]
    CapacityExceeded { remaining: Amount },
    #[error("ledger invariant violated: {0}")]
    InvariantViolation(String),
    #[error("ledger storage: {0}")]
    Storage(#[from] StateError),
}

/// One participant's cumulative stake in one pool. Only ever returned to its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeEntry {
    pub amount: Amount,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

/// Public per-pool figures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolTotals {
    pub total_staked: Amount,
    pub participant_count: usize,
}

#[derive(Debug, Default)]
struct PoolBook {
    total: Amount,
    entries: BTreeMap<ParticipantId, StakeEntry>,
}

fn invariant(msg: impl Into<String>) -> StakeError {
    let msg = msg.into();
    error!(%msg, "ledger invariant violated");
    StakeError::InvariantViolation(msg)
}

pub struct StakeLedger {
    registry: Arc<PoolRegistry>,
    // The pool set is fixed at construction, so only the books need locking.
    books: BTreeMap<PoolId, Mutex<PoolBook>>,
    store: Option<Box<dyn StakeStore>>,
}

impl StakeLedger {
    /// In-memory ledger with every pool empty.
    pub fn new(registry: Arc<PoolRegistry>) -> Self {
        let books = registry
            .list_pools()
            .iter()
            .map(|p| (p.id.clone(), Mutex::new(PoolBook::default())))
            .collect();
        Self {
            registry,
            books,
            store: None,
        }
    }

    /// Ledger backed by `store`, reloading and re-verifying everything it holds.
    pub fn open(
        registry: Arc<PoolRegistry>,
        store: impl StakeStore + 'static,
    ) -> Result<Self, StakeError> {
        let snap = store.load()?;

        for pool_id in snap.entries.keys().chain(snap.totals.keys()) {
            if registry.get_pool(pool_id).is_none() {
                return Err(invariant(format!("stored data for unknown pool {pool_id}")));
            }
        }

        let mut books = BTreeMap::new();
        for pool in registry.list_pools() {
            let mut book = PoolBook::default();
            if let Some(stored) = snap.entries.get(&pool.id) {
                for (participant, e) in stored {
                    if e.amount == 0 {
                        return Err(invariant(format!(
                            "zero entry for {participant} in pool {}",
                            pool.id
                        )));
                    }
                    let amount = Amount::from_base_units(e.amount);
                    book.total = book
                        .total
                        .checked_add(amount)
                        .ok_or_else(|| invariant(format!("pool {} total overflows", pool.id)))?;
                    book.entries.insert(
                        *participant,
                        StakeEntry {
                            amount,
                            created_at_ms: e.created_at_ms,
                            updated_at_ms: e.updated_at_ms,
                        },
                    );
                }
            }

            let stored_total = snap.totals.get(&pool.id).copied().unwrap_or(Amount::ZERO);
            if stored_total != book.total {
                return Err(invariant(format!(
                    "pool {} stored total {stored_total} != sum of entries {}",
                    pool.id, book.total
                )));
            }
            if book.total > pool.max_capacity {
                return Err(invariant(format!(
                    "pool {} total {} exceeds capacity {}",
                    pool.id, book.total, pool.max_capacity
                )));
            }
            books.insert(pool.id.clone(), Mutex::new(book));
        }

        Ok(Self {
            registry,
            books,
            store: Some(Box::new(store)),
        })
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    fn book(&self, pool_id: &PoolId) -> Result<&Mutex<PoolBook>, StakeError> {
        self.books
            .get(pool_id)
            .ok_or_else(|| StakeError::NotFound(pool_id.clone()))
    }

    /// The caller's own committed amount (zero if they never staked here).
    pub fn get_own_stake(
        &self,
        pool_id: &PoolId,
        participant: &ParticipantId,
    ) -> Result<Amount, StakeError> {
        Ok(self
            .own_entry(pool_id, participant)?
            .map(|e| e.amount)
            .unwrap_or(Amount::ZERO))
    }

    /// The caller's own entry, including timestamps.
    pub fn own_entry(
        &self,
        pool_id: &PoolId,
        participant: &ParticipantId,
    ) -> Result<Option<StakeEntry>, StakeError> {
        let book = self.book(pool_id)?.lock();
        Ok(book.entries.get(participant).copied())
    }

    /// Aggregate-only view of a pool.
    pub fn pool_totals(&self, pool_id: &PoolId) -> Result<PoolTotals, StakeError> {
        let book = self.book(pool_id)?.lock();
        Ok(PoolTotals {
            total_staked: book.total,
            participant_count: book.entries.len(),
        })
    }

    /// Validate, reserve capacity and commit in one step under the pool lock.
    ///
    /// Returns the participant's new cumulative stake. A rejected call leaves
    /// the ledger untouched.
    pub fn reserve_and_commit(
        &self,
        pool_id: &PoolId,
        participant: &ParticipantId,
        amount: Amount,
    ) -> Result<Amount, StakeError> {
        let pool = self
            .registry
            .get_pool(pool_id)
            .ok_or_else(|| StakeError::NotFound(pool_id.clone()))?;
        if amount.is_zero() {
            return Err(StakeError::InvalidAmount);
        }
        if amount < pool.min_stake {
            return Err(StakeError::BelowMinimum {
                min: pool.min_stake,
                amount,
            });
        }

        let mut book = self.book(pool_id)?.lock();

        let remaining = pool.max_capacity.checked_sub(book.total).ok_or_else(|| {
            invariant(format!(
                "pool {pool_id} total {} above capacity {}",
                book.total, pool.max_capacity
            ))
        })?;
        let new_total = match book.total.checked_add(amount) {
            Some(t) if t <= pool.max_capacity => t,
            _ => return Err(StakeError::CapacityExceeded { remaining }),
        };

        let now = unix_now_ms();
        let (prev, created_at_ms) = match book.entries.get(participant) {
            Some(e) => (e.amount, e.created_at_ms),
            None => (Amount::ZERO, now),
        };
        if prev > book.total {
            return Err(invariant(format!(
                "entry for {participant} exceeds pool {pool_id} total"
            )));
        }
        let own = prev
            .checked_add(amount)
            .ok_or_else(|| invariant(format!("entry for {participant} overflows")))?;
        let entry = StakeEntry {
            amount: own,
            created_at_ms,
            updated_at_ms: now,
        };

        // Store first; memory only moves once the store applied the write.
        if let Some(store) = &self.store {
            let durability = store.commit_stake(
                pool_id,
                participant,
                &StoredEntry {
                    amount: own.base_units(),
                    created_at_ms,
                    updated_at_ms: now,
                },
                new_total,
            )?;
            if durability == Durability::Pending {
                warn!(pool = %pool_id, "stake applied but not yet flushed");
            }
        }

        book.entries.insert(*participant, entry);
        book.total = new_total;
        Ok(own)
    }
}

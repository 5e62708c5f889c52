// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Persistent stake ledger storage using sled.
//!
//! Layout (one sled tree):
//!
//! ```text
//! entry/<pool_id>/<participant hex>  -> bincode(StoredEntry)
//! total/<pool_id>                    -> bincode(u128 base units)
//! ```
//!
//! An entry and its pool total are always written in the same transaction.
//! Once that transaction has applied, the write counts as committed; a failed
//! flush only means it has not reached disk yet.

use crate::core::types::{
    decode_canonical_limited, encode_canonical, Amount, ParticipantId, PoolId,
};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionResult, TransactionError};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

const ENTRY_PREFIX: &[u8] = b"entry/";
const TOTAL_PREFIX: &[u8] = b"total/";
const MAX_VALUE_BYTES: usize = 64;

/// State errors.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("db open")]
    DbOpen,
    #[error("db io")]
    DbIo,
    #[error("codec")]
    Codec,
    #[error("corrupt key {0}")]
    CorruptKey(String),
}

/// State operation.
#[derive(Clone, Debug)]
pub enum KvOp {
    /// Put key/value.
    Put { key: Vec<u8>, value: Vec<u8> },
}

/// Whether an applied write has been flushed to disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Durability {
    /// Flushed.
    Flushed,
    /// Applied, flush failed; sled retries on its next flush.
    Pending,
}

/// A participant's entry as persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Committed amount in base units.
    pub amount: u128,
    /// First commit time (ms since UNIX epoch).
    pub created_at_ms: u64,
    /// Last commit time (ms since UNIX epoch).
    pub updated_at_ms: u64,
}

/// Everything read back from disk on open.
#[derive(Debug, Default)]
pub struct LedgerSnapshot {
    /// Entries grouped by pool.
    pub entries: BTreeMap<PoolId, BTreeMap<ParticipantId, StoredEntry>>,
    /// Stored running totals.
    pub totals: BTreeMap<PoolId, Amount>,
}

/// Backend the stake ledger persists through.
pub trait StakeStore: Send + Sync {
    /// Read every entry and stored total.
    fn load(&self) -> Result<LedgerSnapshot, StateError>;

    /// Persist one participant entry together with the pool's new running
    /// total. `Err` means nothing was applied.
    fn commit_stake(
        &self,
        pool: &PoolId,
        participant: &ParticipantId,
        entry: &StoredEntry,
        new_total: Amount,
    ) -> Result<Durability, StateError>;
}

impl<S: StakeStore + ?Sized> StakeStore for Box<S> {
    fn load(&self) -> Result<LedgerSnapshot, StateError> {
        (**self).load()
    }

    fn commit_stake(
        &self,
        pool: &PoolId,
        participant: &ParticipantId,
        entry: &StoredEntry,
        new_total: Amount,
    ) -> Result<Durability, StateError> {
        (**self).commit_stake(pool, participant, entry, new_total)
    }
}

/// Persistent ledger store.
#[derive(Clone)]
pub struct LedgerStore {
    db: sled::Db,
}

fn entry_key(pool: &PoolId, participant: &ParticipantId) -> Vec<u8> {
    let mut k = ENTRY_PREFIX.to_vec();
    k.extend_from_slice(pool.as_str().as_bytes());
    k.push(b'/');
    k.extend_from_slice(hex::encode(participant.as_bytes()).as_bytes());
    k
}

fn total_key(pool: &PoolId) -> Vec<u8> {
    let mut k = TOTAL_PREFIX.to_vec();
    k.extend_from_slice(pool.as_str().as_bytes());
    k
}

fn corrupt(key: &[u8]) -> StateError {
    StateError::CorruptKey(String::from_utf8_lossy(key).into_owned())
}

fn parse_entry_key(key: &[u8]) -> Result<(PoolId, ParticipantId), StateError> {
    let rest = key.strip_prefix(ENTRY_PREFIX).ok_or_else(|| corrupt(key))?;
    let rest = std::str::from_utf8(rest).map_err(|_| corrupt(key))?;
    let (pool, participant) = rest.rsplit_once('/').ok_or_else(|| corrupt(key))?;
    let pool = PoolId::new(pool).map_err(|_| corrupt(key))?;
    let participant =
        ParticipantId::parse(&format!("0x{participant}")).map_err(|_| corrupt(key))?;
    Ok((pool, participant))
}

impl LedgerStore {
    /// Open sled DB at path (directory).
    pub fn open(path: &str) -> Result<Self, StateError> {
        let db = sled::open(path).map_err(|_| StateError::DbOpen)?;
        Ok(Self { db })
    }

    /// Atomic commit using sled transactions.
    pub fn commit_atomic(&self, ops: &[KvOp]) -> Result<Durability, StateError> {
        let res: Result<(), TransactionError<StateError>> =
            self.db
                .transaction(|t| -> ConflictableTransactionResult<(), StateError> {
                    for op in ops {
                        match op {
                            KvOp::Put { key, value } => {
                                t.insert(key.as_slice(), value.as_slice())?;
                            }
                        }
                    }
                    Ok(())
                });

        match res {
            Ok(()) => {}
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(_)) => return Err(StateError::DbIo),
        }
        // The transaction is applied; a flush failure must not report it as undone.
        match self.db.flush() {
            Ok(_) => Ok(Durability::Flushed),
            Err(e) => {
                warn!(error = %e, "ledger flush failed; write applied, not yet on disk");
                Ok(Durability::Pending)
            }
        }
    }
}

impl StakeStore for LedgerStore {
    fn commit_stake(
        &self,
        pool: &PoolId,
        participant: &ParticipantId,
        entry: &StoredEntry,
        new_total: Amount,
    ) -> Result<Durability, StateError> {
        let entry_bytes = encode_canonical(entry).map_err(|_| StateError::Codec)?;
        let total_bytes =
            encode_canonical(&new_total.base_units()).map_err(|_| StateError::Codec)?;
        self.commit_atomic(&[
            KvOp::Put {
                key: entry_key(pool, participant),
                value: entry_bytes,
            },
            KvOp::Put {
                key: total_key(pool),
                value: total_bytes,
            },
        ])
    }

    fn load(&self) -> Result<LedgerSnapshot, StateError> {
        let mut snap = LedgerSnapshot::default();

        for item in self.db.scan_prefix(ENTRY_PREFIX) {
            let (k, v) = item.map_err(|_| StateError::DbIo)?;
            let (pool, participant) = parse_entry_key(&k)?;
            let entry: StoredEntry =
                decode_canonical_limited(&v, MAX_VALUE_BYTES).map_err(|_| StateError::Codec)?;
            snap.entries.entry(pool).or_default().insert(participant, entry);
        }

        for item in self.db.scan_prefix(TOTAL_PREFIX) {
            let (k, v) = item.map_err(|_| StateError::DbIo)?;
            let rest = k.strip_prefix(TOTAL_PREFIX).ok_or_else(|| corrupt(&k))?;
            let pool = std::str::from_utf8(rest)
                .ok()
                .and_then(|s| PoolId::new(s).ok())
                .ok_or_else(|| corrupt(&k))?;
            let units: u128 =
                decode_canonical_limited(&v, MAX_VALUE_BYTES).map_err(|_| StateError::Codec)?;
            snap.totals.insert(pool, Amount::from_base_units(units));
        }

        Ok(snap)
    }
}

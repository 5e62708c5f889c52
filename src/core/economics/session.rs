#![allow(missing_docs)]
// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

//! Stake session: one user-facing stake request, `Pending -> Committed | Rejected`.

#![forbid(unsafe_code)]

use crate::core::economics::aggregator::Aggregator;
use crate::core::economics::ledger::{StakeError, StakeLedger};
use crate::core::types::{Amount, ParticipantId, PoolId};
use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeRequest {
    pub pool_id: PoolId,
    pub participant: ParticipantId,
    pub amount: Amount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotFound,
    InvalidAmount,
    BelowMinimum,
    CapacityExceeded,
    /// Storage failure or invariant violation; the ledger is unchanged.
    Internal,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotFound => "not_found",
            RejectReason::InvalidAmount => "invalid_amount",
            RejectReason::BelowMinimum => "below_minimum",
            RejectReason::CapacityExceeded => "capacity_exceeded",
            RejectReason::Internal => "internal",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&StakeError> for RejectReason {
    fn from(e: &StakeError) -> Self {
        match e {
            StakeError::NotFound(_) => RejectReason::NotFound,
            StakeError::InvalidAmount => RejectReason::InvalidAmount,
            StakeError::BelowMinimum { .. } => RejectReason::BelowMinimum,
            StakeError::CapacityExceeded { .. } => RejectReason::CapacityExceeded,
            StakeError::InvariantViolation(_) | StakeError::Storage(_) => RejectReason::Internal,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Committed { own_stake: Amount },
    Rejected(RejectReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Committed,
    Rejected,
}

/// Outcome returned to the requesting participant only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StakeReceipt {
    pub status: ReceiptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

impl StakeReceipt {
    pub fn committed(own_stake: Amount) -> Self {
        Self {
            status: ReceiptStatus::Committed,
            new_total: Some(own_stake.to_string()),
            reason: None,
        }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            status: ReceiptStatus::Rejected,
            new_total: None,
            reason: Some(reason),
        }
    }
}

pub struct StakeSession {
    request: StakeRequest,
    state: SessionState,
}

impl StakeSession {
    pub fn new(request: StakeRequest) -> Self {
        Self {
            request,
            state: SessionState::Pending,
        }
    }

    pub fn request(&self) -> &StakeRequest {
        &self.request
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Drive the session to a settled state. Settled sessions are never re-run;
    /// a resubmission needs a new session.
    pub fn run(&mut self, ledger: &StakeLedger, aggregator: &Aggregator) -> &SessionState {
        if self.state != SessionState::Pending {
            return &self.state;
        }
        let req = &self.request;

        if ledger.registry().get_pool(&req.pool_id).is_none() {
            warn!(pool = %req.pool_id, participant = %req.participant, "stake rejected: unknown pool");
            self.state = SessionState::Rejected(RejectReason::NotFound);
            return &self.state;
        }

        self.state = match ledger.reserve_and_commit(&req.pool_id, &req.participant, req.amount) {
            Ok(own_stake) => {
                info!(pool = %req.pool_id, participant = %req.participant, %own_stake, "stake committed");
                if let Err(e) = aggregator.refresh(&req.pool_id) {
                    warn!(pool = %req.pool_id, error = %e, "aggregate refresh failed");
                }
                SessionState::Committed { own_stake }
            }
            Err(e) => {
                let reason = RejectReason::from(&e);
                if reason == RejectReason::Internal {
                    error!(pool = %req.pool_id, participant = %req.participant, error = %e, "stake aborted");
                } else {
                    warn!(pool = %req.pool_id, participant = %req.participant, %reason, "stake rejected");
                }
                SessionState::Rejected(reason)
            }
        };
        &self.state
    }

    /// `None` while still pending.
    pub fn receipt(&self) -> Option<StakeReceipt> {
        match self.state {
            SessionState::Pending => None,
            SessionState::Committed { own_stake } => Some(StakeReceipt::committed(own_stake)),
            SessionState::Rejected(reason) => Some(StakeReceipt::rejected(reason)),
        }
    }
}

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

//! HTTP request and read surfaces.
//!
//! Caller identity arrives in the `x-participant-id` header, set by the wallet
//! gateway in front of this service. Reads expose pool parameters, aggregates
//! and the caller's own stake; nothing returns another participant's entry.

use crate::core::economics::aggregator::{PoolAggregate, SystemAggregate};
use crate::core::economics::ledger::StakeError;
use crate::core::economics::registry::Pool;
use crate::core::economics::service::StakingService;
use crate::core::economics::session::{ReceiptStatus, RejectReason, StakeReceipt};
use crate::core::types::{ParticipantId, PoolId};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Header carrying the resolved caller address.
pub const PARTICIPANT_HEADER: &str = "x-participant-id";

/// Shared handler state.
pub type SharedService = Arc<StakingService>;

/// API error: status plus a short message.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Message for the body.
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<StakeError> for ApiError {
    fn from(e: StakeError) -> Self {
        match e {
            StakeError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, e.to_string()),
            StakeError::InvalidAmount | StakeError::BelowMinimum { .. } => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            StakeError::CapacityExceeded { .. } => ApiError::new(StatusCode::CONFLICT, e.to_string()),
            StakeError::InvariantViolation(_) | StakeError::Storage(_) => {
                error!(error = %e, "internal ledger error");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// Pool parameters with their public aggregate.
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolView {
    /// Pool id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Minimum stake per contribution.
    pub min_stake: String,
    /// Capacity.
    pub max_capacity: String,
    /// Reward rate, percent.
    pub reward_rate_pct: f64,
    /// Sum of committed stakes.
    pub total_staked: String,
    /// Participants with a positive stake.
    pub participant_count: usize,
    /// total / capacity.
    pub capacity_used_ratio: f64,
}

impl PoolView {
    fn new(pool: &Pool, agg: &PoolAggregate) -> Self {
        Self {
            id: pool.id.to_string(),
            name: pool.name.clone(),
            min_stake: pool.min_stake.to_string(),
            max_capacity: pool.max_capacity.to_string(),
            reward_rate_pct: pool.reward_rate_pct(),
            total_staked: agg.total_staked.to_string(),
            participant_count: agg.participant_count,
            capacity_used_ratio: agg.capacity_used_ratio,
        }
    }
}

/// System-wide aggregate.
#[derive(Debug, Serialize, Deserialize)]
pub struct SystemView {
    /// Total value locked.
    pub total_value_locked: String,
    /// Mean reward rate of pools with participants, percent.
    pub average_yield: f64,
    /// Sum of pool participant counts.
    pub total_stakers: usize,
    /// Pools with participants.
    pub active_pool_count: usize,
    /// All pools.
    pub pool_count: usize,
}

impl From<SystemAggregate> for SystemView {
    fn from(a: SystemAggregate) -> Self {
        Self {
            total_value_locked: a.total_value_locked.to_string(),
            average_yield: a.average_yield,
            total_stakers: a.total_stakers,
            active_pool_count: a.active_pool_count,
            pool_count: a.pool_count,
        }
    }
}

/// The caller's own position in one pool.
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnStakeView {
    /// Pool id.
    pub pool_id: String,
    /// Caller address.
    pub participant: String,
    /// Committed amount.
    pub amount: String,
}

/// `POST /pools/:id/stake` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct StakeBody {
    /// Decimal amount, e.g. `"0.5"`.
    pub amount: String,
}

fn caller(headers: &HeaderMap) -> Result<ParticipantId, ApiError> {
    let raw = headers
        .get(PARTICIPANT_HEADER)
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "missing x-participant-id"))?
        .to_str()
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "bad x-participant-id"))?;
    ParticipantId::parse(raw).map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))
}

fn pool_id(raw: String) -> Result<PoolId, ApiError> {
    PoolId::new(raw).map_err(|_| ApiError::new(StatusCode::NOT_FOUND, "unknown pool"))
}

/// Run ledger work on the blocking pool; the store may fsync under a pool lock.
async fn blocking<T, F>(svc: SharedService, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&StakingService) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&svc))
        .await
        .map_err(|e| {
            error!(error = %e, "ledger task failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        })
}

fn receipt_status(receipt: &StakeReceipt) -> StatusCode {
    match (receipt.status, receipt.reason) {
        (ReceiptStatus::Committed, _) => StatusCode::OK,
        (_, Some(RejectReason::NotFound)) => StatusCode::NOT_FOUND,
        (_, Some(RejectReason::InvalidAmount)) | (_, Some(RejectReason::BelowMinimum)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        (_, Some(RejectReason::CapacityExceeded)) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Liveness.
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /pools`
pub async fn list_pools(State(svc): State<SharedService>) -> Result<Json<Vec<PoolView>>, ApiError> {
    let mut out = Vec::with_capacity(svc.list_pools().len());
    for pool in svc.list_pools() {
        let agg = svc.pool_aggregate(&pool.id)?;
        out.push(PoolView::new(pool, &agg));
    }
    Ok(Json(out))
}

/// `GET /pools/:id`
pub async fn get_pool(
    State(svc): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<PoolView>, ApiError> {
    let id = pool_id(id)?;
    let pool = svc.get_pool(&id)?;
    let agg = svc.pool_aggregate(&id)?;
    Ok(Json(PoolView::new(pool, &agg)))
}

/// `GET /aggregate`
pub async fn system_aggregate(State(svc): State<SharedService>) -> Result<Json<SystemView>, ApiError> {
    Ok(Json(svc.system_aggregate()?.into()))
}

/// `GET /pools/:id/stake`
pub async fn own_stake(
    State(svc): State<SharedService>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OwnStakeView>, ApiError> {
    let participant = caller(&headers)?;
    let id = pool_id(id)?;
    let amount = {
        let id = id.clone();
        blocking(svc, move |svc| svc.own_stake(&id, &participant)).await??
    };
    Ok(Json(OwnStakeView {
        pool_id: id.to_string(),
        participant: participant.to_string(),
        amount: amount.to_string(),
    }))
}

/// `POST /pools/:id/stake`
pub async fn stake(
    State(svc): State<SharedService>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<StakeBody>,
) -> Result<(StatusCode, Json<StakeReceipt>), ApiError> {
    let participant = caller(&headers)?;
    let receipt = blocking(svc, move |svc| svc.stake_raw(&id, participant, &body.amount)).await?;
    Ok((receipt_status(&receipt), Json(receipt)))
}

/// `GET /metrics`
///
/// Gauges are recomputed first, so a scrape never sees figures older than the
/// ledger.
pub async fn metrics(State(svc): State<SharedService>) -> Result<String, ApiError> {
    svc.publish_system_metrics()?;
    svc.metrics()
        .encode_text()
        .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding"))
}

/// All routes.
pub fn router(svc: SharedService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/pools", get(list_pools))
        .route("/pools/:id", get(get_pool))
        .route("/pools/:id/stake", get(own_stake).post(stake))
        .route("/aggregate", get(system_aggregate))
        .route("/metrics", get(metrics))
        .with_state(svc)
}

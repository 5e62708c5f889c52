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

use crate::core::economics::aggregator::SystemAggregate;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus")]
    Prom,
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Committed stake requests.
    pub commits_total: IntCounter,
    /// Rejected stake requests by reason.
    pub rejections_total: IntCounterVec,
    /// Sum of all pool totals, in whole units.
    pub total_value_locked: Gauge,
    /// Sum of per-pool participant counts.
    pub total_stakers: IntGauge,
    /// Pools with at least one participant.
    pub active_pools: IntGauge,
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let commits_total =
            IntCounter::new("veilstake_commits_total", "Committed stake requests")
                .map_err(|_| MetricsError::Prom)?;
        let rejections_total = IntCounterVec::new(
            Opts::new("veilstake_rejections_total", "Rejected stake requests"),
            &["reason"],
        )
        .map_err(|_| MetricsError::Prom)?;
        let total_value_locked =
            Gauge::new("veilstake_total_value_locked", "Total value locked across pools")
                .map_err(|_| MetricsError::Prom)?;
        let total_stakers = IntGauge::new("veilstake_total_stakers", "Sum of pool participants")
            .map_err(|_| MetricsError::Prom)?;
        let active_pools =
            IntGauge::new("veilstake_active_pools", "Pools with at least one participant")
                .map_err(|_| MetricsError::Prom)?;

        registry
            .register(Box::new(commits_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(rejections_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(total_value_locked.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(total_stakers.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(active_pools.clone()))
            .map_err(|_| MetricsError::Prom)?;

        Ok(Self {
            registry,
            commits_total,
            rejections_total,
            total_value_locked,
            total_stakers,
            active_pools,
        })
    }

    /// Count a committed request.
    pub fn record_commit(&self) {
        self.commits_total.inc();
    }

    /// Count a rejected request.
    pub fn record_rejection(&self, reason: &str) {
        self.rejections_total.with_label_values(&[reason]).inc();
    }

    /// Publish system-wide aggregates.
    pub fn observe_system(&self, agg: &SystemAggregate) {
        self.total_value_locked.set(agg.total_value_locked.to_f64());
        self.total_stakers.set(agg.total_stakers as i64);
        self.active_pools.set(agg.active_pool_count as i64);
    }

    /// Prometheus text exposition.
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|_| MetricsError::Prom)?;
        String::from_utf8(buf).map_err(|_| MetricsError::Prom)
    }
}

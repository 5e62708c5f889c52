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

//! Veilstake - confidential staking pool accounting.
//!
//! This crate provides:
//! - A pool registry with immutable public parameters
//! - A stake ledger with per-pool capacity reservation (check-then-commit under a pool lock)
//! - Stake sessions with an explicit `Pending -> Committed | Rejected` lifecycle
//! - Public aggregates (pool totals, TVL, average yield) that never expose individual stakes
//! - Optional sled-backed persistence, Prometheus metrics and an axum HTTP surface

/// HTTP request and read surfaces.
pub mod api;
/// Core staking primitives (types, config, economics, state).
pub mod core;
/// Observability (metrics, structured logging helpers).
pub mod monitoring;

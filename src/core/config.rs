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

//! Service configuration (TOML).

use crate::core::economics::registry::Pool;
use crate::core::types::{Amount, PoolId};
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Cannot read config file.
    #[error("read config: {0}")]
    Read(String),
    /// Cannot parse TOML.
    #[error("parse config: {0}")]
    Parse(String),
    /// A value failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service settings.
    pub service: ServiceSettings,
    /// HTTP endpoint.
    pub http: HttpConfig,
    /// Pools, in listing order.
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
}

/// Service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Human-readable name.
    pub name: String,
    /// Ledger data directory. `None` keeps the ledger in memory only.
    #[serde(default)]
    pub data_dir: Option<String>,
}

/// HTTP config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Listen address, e.g. 127.0.0.1:8080.
    pub listen_addr: String,
}

/// One pool as written in the config file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Pool id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Minimum stake per contribution (decimal string).
    pub min_stake: String,
    /// Maximum pool capacity (decimal string).
    pub max_capacity: String,
    /// Reward rate in basis points.
    pub reward_rate_bps: u32,
}

impl PoolConfig {
    /// Convert into a typed [`Pool`]. Registry-level checks happen in `PoolRegistry::new`.
    pub fn to_pool(&self) -> Result<Pool, ConfigError> {
        let id = PoolId::new(self.id.clone())
            .map_err(|e| ConfigError::Invalid(format!("pool {:?}: {e}", self.id)))?;
        let min_stake = Amount::parse_decimal(&self.min_stake)
            .map_err(|e| ConfigError::Invalid(format!("pool {id} min_stake: {e}")))?;
        let max_capacity = Amount::parse_decimal(&self.max_capacity)
            .map_err(|e| ConfigError::Invalid(format!("pool {id} max_capacity: {e}")))?;
        Ok(Pool {
            id,
            name: self.name.clone(),
            min_stake,
            max_capacity,
            reward_rate_bps: self.reward_rate_bps,
        })
    }
}

impl ServiceConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from a file path.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Read(format!("{path}: {e}")))?;
        Self::from_toml_str(&raw)
    }

    /// Typed pools in file order.
    pub fn pools(&self) -> Result<Vec<Pool>, ConfigError> {
        self.pools.iter().map(PoolConfig::to_pool).collect()
    }
}

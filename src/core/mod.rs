#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Core staking primitives (types, config, economics, state).

pub mod config;
pub mod economics;
pub mod state;
pub mod types;

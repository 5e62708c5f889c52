#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Pool registry, stake ledger, sessions and aggregates.

pub mod aggregator;
pub mod ledger;
pub mod registry;
pub mod service;
pub mod session;

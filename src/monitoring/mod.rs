#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Observability: Prometheus metrics and log setup.

pub mod logging;
pub mod metrics;

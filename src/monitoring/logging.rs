// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

//! Structured log setup for the node binary.

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output.
    Compact,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// `VEILSTAKE_LOG_JSON=1` (or `true`) selects JSON.
    pub fn from_env() -> Self {
        match std::env::var("VEILSTAKE_LOG_JSON").as_deref() {
            Ok("1") | Ok("true") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing(format: LogFormat) {
    let _ = match format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .compact()
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .json()
            .try_init(),
    };
}

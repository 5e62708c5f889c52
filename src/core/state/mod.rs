#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Durable ledger storage.

pub mod persistent_state;

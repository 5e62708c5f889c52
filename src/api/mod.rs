#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! External surfaces (HTTP).

pub mod http;

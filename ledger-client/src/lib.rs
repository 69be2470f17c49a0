//! Stateful client to the external append-only ledger.
//!
//! The ledger's own storage engine is out of scope for this core; this
//! crate owns the contract (`LedgerClient`), the retry/timeout/batching
//! policy around it, and an in-process actor-backed implementation used by
//! tests and the load-generation demo.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod config;
pub mod error;
pub mod in_process;

pub use client::LedgerClient;
pub use config::LedgerClientConfig;
pub use error::{Error, Result};
pub use in_process::InProcessLedger;

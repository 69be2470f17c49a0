//! Canonical types for the payment gateway core.
//!
//! This crate has no I/O and no async: it is the shared vocabulary
//! (`Payment`, `LedgerEvent`, validation result shapes) that every other
//! crate in the workspace builds on.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod bic;
pub mod error;
pub mod event;
pub mod payment;
pub mod validation;

pub use bic::Bic;
pub use error::{Error, Result};
pub use event::{hash_payment_snapshot, EventType, LedgerEvent};
pub use payment::{AccountId, Currency, Payment, PaymentStatus};
pub use validation::{Party, RiskAssessment, RiskLevel, SanctionsCheck, SanctionsMatch, ValidationResult};

//! Errors produced by the validator crate itself (as opposed to diagnostics
//! collected into a [`gateway_types::ValidationResult`], which are not
//! fatal).

use thiserror::Error;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that prevent a check from running at all.
#[derive(Debug, Error)]
pub enum Error {
    /// The sanctions list could not be loaded.
    #[error("sanctions list unavailable: {0}")]
    SanctionsListUnavailable(String),
}

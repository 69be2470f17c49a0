//! Error types for canonical payment types

use thiserror::Error;

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or validating canonical types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// BIC does not match the ISO 9362 pattern
    #[error("invalid BIC: {0}")]
    InvalidBic(String),

    /// Account identifier was empty
    #[error("account identifier must not be empty")]
    EmptyAccount,

    /// Attempted to move a payment out of a terminal status
    #[error("payment {payment_id} is in terminal status {from:?}, cannot transition to {to:?}")]
    TerminalStatus {
        /// Payment under transition
        payment_id: uuid::Uuid,
        /// Status the payment was already in
        from: crate::payment::PaymentStatus,
        /// Status the transition attempted to reach
        to: crate::payment::PaymentStatus,
    },
}

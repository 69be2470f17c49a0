//! Errors surfaced by the ledger client.

use thiserror::Error;
use uuid::Uuid;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures the ledger client can return to a caller.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Retries against the backing ledger were exhausted.
    #[error("ledger unavailable after retries: {0}")]
    Unavailable(String),

    /// The ledger rejected the request as structurally invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The payment is already in a terminal state; the append cannot apply.
    #[error("payment {0} is already terminal")]
    AlreadyTerminal(Uuid),

    /// No events exist for the requested payment.
    #[error("payment {0} not found")]
    NotFound(Uuid),

    /// The call did not complete within its deadline.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(std::time::Duration),

    /// The actor mailbox was closed; the client can no longer be used.
    #[error("ledger client shut down")]
    Closed,
}

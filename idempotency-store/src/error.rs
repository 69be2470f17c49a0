//! Errors surfaced by the idempotency store.

use thiserror::Error;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures `execute` can return without running the caller's operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The caller omitted a key where one was required.
    #[error("idempotency key is required")]
    MissingKey,

    /// A call is already in flight for this key and the policy rejects
    /// concurrent duplicates rather than waiting.
    #[error("a request with this idempotency key is already in flight")]
    Conflict,

    /// A blocking wait for an in-flight call exceeded its configured cap.
    #[error("timed out waiting for in-flight request to complete")]
    WaitTimeout,
}

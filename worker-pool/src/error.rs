//! Errors surfaced by the worker pool's queue.

use thiserror::Error;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures `enqueue` can return.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The caller's deadline elapsed while waiting for queue capacity.
    #[error("enqueue canceled: deadline elapsed while waiting for queue capacity")]
    Canceled,

    /// The pool is draining or has already shut down.
    #[error("worker pool is shutting down")]
    ShuttingDown,
}

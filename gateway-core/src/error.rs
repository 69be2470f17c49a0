//! The orchestrator's public error taxonomy. Wraps stage-specific
//! errors with the stage name and payment id; internal detail stays in
//! `tracing` logs, never the public surface.

use std::time::Duration;
use uuid::Uuid;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The small, stable set of public error kinds.
#[derive(Debug, thiserror::Error, Clone)]
pub enum Error {
    /// No `Idempotency-Key` supplied with the submission.
    #[error("missing idempotency key")]
    MissingIdempotencyKey,

    /// The request body itself is malformed (not a schema-validity
    /// question — that is a processing rejection, not a request error).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limiter denied admission; retry after the given duration.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Caller-facing retry hint.
        retry_after: Duration,
    },

    /// Adaptive load shedding rejected the submission outright.
    #[error("system overloaded")]
    SystemOverload,

    /// An idempotent retry found another execution already in flight and
    /// the configured policy rejects rather than waits.
    #[error("duplicate request already in flight")]
    DuplicateInFlight,

    /// The queue did not accept the payment before the submission deadline.
    #[error("submission deadline exceeded enqueuing payment")]
    QueueTimeout,

    /// The orchestrator is shutting down and accepts no new submissions.
    #[error("gateway is shutting down")]
    ShuttingDown,

    /// `get_payment_status` found no events for the given id.
    #[error("payment {0} not found")]
    NotFound(Uuid),

    /// A lower component failed unexpectedly; stage name and payment id
    /// (when known) are retained for logs, never for the client response.
    #[error("internal error in stage '{stage}'")]
    Internal {
        /// The pipeline/component stage that failed.
        stage: &'static str,
    },
}

impl Error {
    /// Map to the HTTP status code this error kind is surfaced as.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingIdempotencyKey | Error::InvalidRequest(_) => 400,
            Error::RateLimited { .. } => 429,
            Error::SystemOverload => 503,
            Error::DuplicateInFlight => 409,
            Error::QueueTimeout => 504,
            Error::ShuttingDown => 503,
            Error::NotFound(_) => 404,
            Error::Internal { .. } => 500,
        }
    }

    /// `Retry-After` seconds to surface alongside 429/503 responses, if any.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Error::RateLimited { retry_after } => Some(retry_after.as_secs().max(1)),
            Error::SystemOverload | Error::ShuttingDown => Some(1),
            _ => None,
        }
    }
}

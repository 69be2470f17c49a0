//! The `LedgerClient` contract. Production deployments would implement
//! this against a networked ledger service; this workspace ships only
//! the in-process actor-backed implementation in [`crate::in_process`],
//! since the ledger's own storage engine is out of scope here.

use crate::error::Result;
use async_trait::async_trait;
use gateway_types::{EventType, LedgerEvent, Payment};
use uuid::Uuid;

/// Stateful client to an external append-only ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Append one event for `payment`, returning the assigned event id.
    /// Idempotent with respect to `(payment_id, event_type, snapshot_hash)`:
    /// a retried append with the same tuple returns the original event id.
    async fn append_event(&self, payment: &Payment, event_type: EventType) -> Result<Uuid>;

    /// Return the current reconstructed state for `payment_id`.
    async fn get_payment_state(&self, payment_id: Uuid) -> Result<Payment>;

    /// Return the full event history for `payment_id`, oldest first.
    async fn get_payment_events(&self, payment_id: Uuid) -> Result<Vec<LedgerEvent>>;

    /// Release any resources held by this client (background tasks,
    /// connections). Default no-op; implementations that own a task
    /// override it. Closed last, after the worker pool has drained.
    async fn shutdown(&self) {}
}

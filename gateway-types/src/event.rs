//! Ledger event types — the append-only record of payment state transitions.

use crate::payment::Payment;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Typed state transition recorded by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Schema validation passed.
    ValidationPassed,
    /// Schema validation failed.
    ValidationFailed,
    /// Sanctions screening cleared.
    SanctionsCleared,
    /// Sanctions screening produced a hit.
    SanctionsHit,
    /// Risk assessment approved the payment.
    RiskApproved,
    /// Risk assessment rejected the payment.
    RiskRejected,
    /// Payment queued for downstream settlement.
    QueuedForSettlement,
    /// Payment settled (observed from a replayed stream, not produced by this core).
    Settled,
    /// Payment failed due to an infrastructure error.
    Failed,
}

/// Append-only ledger record. Immutable once appended; total order is
/// defined by `sequence`, assigned by the ledger, not the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Unique event id.
    pub event_id: Uuid,
    /// Payment this event belongs to.
    pub payment_id: Uuid,
    /// The recorded transition.
    pub event_type: EventType,
    /// Content-addressed digest of the payment snapshot at event time.
    pub payload_hash: [u8; 32],
    /// Merkle-chain link to the previous event for this payment (`None` for the first).
    pub prev_hash: Option<[u8; 32]>,
    /// Event timestamp, nanoseconds since the Unix epoch.
    pub timestamp_nanos: i64,
    /// Monotonic per-ledger sequence number, assigned on append.
    pub sequence: u64,
}

/// Compute the content-addressed digest of a payment snapshot, used both
/// to build `payload_hash` and to dedupe appends for the idempotent
/// `(payment_id, event_type, snapshot_hash)` tuple.
pub fn hash_payment_snapshot(payment: &Payment, event_type: EventType) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payment.payment_id.as_bytes());
    hasher.update(payment.amount.to_string().as_bytes());
    hasher.update(payment.currency.code().as_bytes());
    hasher.update(payment.debtor_bank.as_str().as_bytes());
    hasher.update(payment.creditor_bank.as_str().as_bytes());
    hasher.update(format!("{:?}", event_type).as_bytes());
    hasher.finalize().into()
}

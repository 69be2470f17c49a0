//! The canonical payment record and its state machine.

use crate::bic::Bic;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque account identifier (IBAN, account number, or similar).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Construct a non-empty account identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, crate::error::Error> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(crate::error::Error::EmptyAccount);
        }
        Ok(Self(id))
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO-4217 currency code, upper-cased on construction. The whitelist of
/// accepted codes is configuration, not a closed Rust enum, so that an
/// operator can add corridors without a recompile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Normalize and wrap a currency code. Does not check the whitelist;
    /// whitelist membership is a validator concern (`gateway_validator::validate`).
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// The three-letter code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment status, per the core's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Initial state, assigned on admission.
    Initiated,
    /// Schema validation passed.
    Validated,
    /// Sanctions screening cleared.
    Screened,
    /// Risk assessment approved.
    Approved,
    /// Queued for settlement — terminal for this core.
    Queued,
    /// Rejected at some stage — terminal.
    Rejected,
    /// Settled downstream — terminal, observed via replayed ledger events.
    Settled,
    /// Failed due to an infrastructure error — terminal.
    Failed,
}

impl PaymentStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentStatus::Rejected | PaymentStatus::Settled | PaymentStatus::Failed
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Initiated => "initiated",
            PaymentStatus::Validated => "validated",
            PaymentStatus::Screened => "screened",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Queued => "queued",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Settled => "settled",
            PaymentStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// The central entity: a single cross-border payment instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Globally unique identifier, assigned by the core if the caller omits it.
    pub payment_id: Uuid,
    /// Fixed-point amount; never a binary float.
    pub amount: Decimal,
    /// ISO-4217 currency code.
    pub currency: Currency,
    /// Sending bank's BIC.
    pub debtor_bank: Bic,
    /// Receiving bank's BIC.
    pub creditor_bank: Bic,
    /// Sender's account.
    pub debtor_account: AccountId,
    /// Receiver's account.
    pub creditor_account: AccountId,
    /// Sender's display name.
    pub debtor_name: String,
    /// Receiver's display name.
    pub creditor_name: String,
    /// Free-form reference; empty is allowed (generates a warning).
    pub reference: String,
    /// Current status.
    pub status: PaymentStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status-transition timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Attempt a status transition, enforcing invariant (i): no transition
    /// out of a terminal status, and invariant (ii): `updated_at >= created_at`.
    pub fn transition(&mut self, to: PaymentStatus, at: DateTime<Utc>) -> Result<(), crate::error::Error> {
        if self.status.is_terminal() {
            return Err(crate::error::Error::TerminalStatus {
                payment_id: self.payment_id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = at.max(self.created_at);
        Ok(())
    }
}

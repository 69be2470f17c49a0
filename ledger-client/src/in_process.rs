//! Actor-backed in-memory [`LedgerClient`] implementation. Mirrors the
//! single-writer mailbox pattern: one task owns all mutable ledger state,
//! callers talk to it through a bounded mpsc channel and a oneshot reply.

use crate::client::LedgerClient;
use crate::config::LedgerClientConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;
use dashmap::DashMap;
use gateway_types::{hash_payment_snapshot, EventType, LedgerEvent, Payment, PaymentStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use uuid::Uuid;

enum Message {
    Append { payment: Payment, event_type: EventType, reply: oneshot::Sender<Result<Uuid>> },
    GetState { payment_id: Uuid, reply: oneshot::Sender<Result<Payment>> },
    GetEvents { payment_id: Uuid, reply: oneshot::Sender<Result<Vec<LedgerEvent>>> },
    Shutdown,
}

struct Ledger {
    states: HashMap<Uuid, Payment>,
    events: HashMap<Uuid, Vec<LedgerEvent>>,
    dedupe: HashMap<(Uuid, EventTypeKey, [u8; 32]), Uuid>,
    sequence: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct EventTypeKey(&'static str);

fn event_type_key(event_type: EventType) -> EventTypeKey {
    EventTypeKey(match event_type {
        EventType::ValidationPassed => "validation_passed",
        EventType::ValidationFailed => "validation_failed",
        EventType::SanctionsCleared => "sanctions_cleared",
        EventType::SanctionsHit => "sanctions_hit",
        EventType::RiskApproved => "risk_approved",
        EventType::RiskRejected => "risk_rejected",
        EventType::QueuedForSettlement => "queued_for_settlement",
        EventType::Settled => "settled",
        EventType::Failed => "failed",
    })
}

fn status_for(event_type: EventType) -> PaymentStatus {
    match event_type {
        EventType::ValidationPassed => PaymentStatus::Validated,
        EventType::ValidationFailed => PaymentStatus::Rejected,
        EventType::SanctionsCleared => PaymentStatus::Screened,
        EventType::SanctionsHit => PaymentStatus::Rejected,
        EventType::RiskApproved => PaymentStatus::Approved,
        EventType::RiskRejected => PaymentStatus::Rejected,
        EventType::QueuedForSettlement => PaymentStatus::Queued,
        EventType::Settled => PaymentStatus::Settled,
        EventType::Failed => PaymentStatus::Failed,
    }
}

impl Ledger {
    fn new() -> Self {
        Self { states: HashMap::new(), events: HashMap::new(), dedupe: HashMap::new(), sequence: 0 }
    }

    fn append(&mut self, mut payment: Payment, event_type: EventType) -> Result<Uuid> {
        let current = self.states.get(&payment.payment_id).cloned().unwrap_or_else(|| payment.clone());
        if current.status.is_terminal() {
            return Err(Error::AlreadyTerminal(payment.payment_id));
        }

        let snapshot_hash = hash_payment_snapshot(&current, event_type);
        let dedupe_key = (payment.payment_id, event_type_key(event_type), snapshot_hash);
        if let Some(existing) = self.dedupe.get(&dedupe_key) {
            return Ok(*existing);
        }

        let now = chrono::Utc::now();
        let new_status = status_for(event_type);
        payment.status = current.status;
        payment
            .transition(new_status, now)
            .map_err(|e| Error::InvalidArgument(e.to_string()))?;

        self.sequence += 1;
        let prev_hash = self.events.get(&payment.payment_id).and_then(|evs| evs.last()).map(|e| e.payload_hash);

        let event = LedgerEvent {
            event_id: Uuid::new_v4(),
            payment_id: payment.payment_id,
            event_type,
            payload_hash: snapshot_hash,
            prev_hash,
            timestamp_nanos: now.timestamp_nanos_opt().unwrap_or_default(),
            sequence: self.sequence,
        };

        let event_id = event.event_id;
        self.dedupe.insert(dedupe_key, event_id);
        self.events.entry(payment.payment_id).or_default().push(event);
        self.states.insert(payment.payment_id, payment);

        Ok(event_id)
    }

    fn get_state(&self, payment_id: Uuid) -> Result<Payment> {
        self.states.get(&payment_id).cloned().ok_or(Error::NotFound(payment_id))
    }

    fn get_events(&self, payment_id: Uuid) -> Result<Vec<LedgerEvent>> {
        self.events.get(&payment_id).cloned().ok_or(Error::NotFound(payment_id))
    }
}

struct Actor {
    mailbox: mpsc::Receiver<Message>,
    ledger: Ledger,
}

impl Actor {
    async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                Message::Append { payment, event_type, reply } => {
                    let result = self.ledger.append(payment, event_type);
                    let _ = reply.send(result);
                }
                Message::GetState { payment_id, reply } => {
                    let _ = reply.send(self.ledger.get_state(payment_id));
                }
                Message::GetEvents { payment_id, reply } => {
                    let _ = reply.send(self.ledger.get_events(payment_id));
                }
                Message::Shutdown => break,
            }
        }
    }
}

/// In-memory [`LedgerClient`] backed by a single actor task. Used by tests
/// and the load-generation demo; never by a production deployment of this
/// core, since the append-only storage engine itself is out of scope.
#[derive(Clone)]
pub struct InProcessLedger {
    sender: mpsc::Sender<Message>,
    config: LedgerClientConfig,
    attempts_observed: Arc<AtomicU64>,
}

impl InProcessLedger {
    /// Spawn the backing actor and return a handle to it.
    pub fn spawn(config: LedgerClientConfig) -> Self {
        let (sender, mailbox) = mpsc::channel(1024);
        let actor = Actor { mailbox, ledger: Ledger::new() };
        tokio::spawn(actor.run());
        Self { sender, config, attempts_observed: Arc::new(AtomicU64::new(0)) }
    }

    /// Number of request attempts made so far, including retries. Exposed
    /// for tests asserting on retry behavior.
    pub fn attempts_observed(&self) -> u64 {
        self.attempts_observed.load(Ordering::Relaxed)
    }

    /// Stop accepting new requests and let the actor task exit.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(Message::Shutdown).await;
    }

    async fn call<T>(&self, build: impl Fn(oneshot::Sender<Result<T>>) -> Message) -> Result<T> {
        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.config.base_delay)
            .with_max_interval(self.config.max_delay)
            .with_max_elapsed_time(Some(self.config.request_timeout))
            .build();

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.attempts_observed.fetch_add(1, Ordering::Relaxed);

            let (tx, rx) = oneshot::channel();
            let send_result = timeout(self.config.connect_timeout, self.sender.send(build(tx))).await;

            let outcome: Result<T> = match send_result {
                Err(_) => Err(Error::DeadlineExceeded(self.config.connect_timeout)),
                Ok(Err(_)) => Err(Error::Closed),
                Ok(Ok(())) => match timeout(self.config.request_timeout, rx).await {
                    Err(_) => Err(Error::DeadlineExceeded(self.config.request_timeout)),
                    Ok(Err(_)) => Err(Error::Closed),
                    Ok(Ok(inner)) => inner,
                },
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(Error::Closed) => return Err(Error::Closed),
                Err(Error::DeadlineExceeded(d)) if attempt <= self.config.max_retries => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(attempt, ?delay, "ledger call timed out, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(Error::Unavailable(format!("deadline exceeded after {:?}", d)));
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[async_trait]
impl LedgerClient for InProcessLedger {
    async fn append_event(&self, payment: &Payment, event_type: EventType) -> Result<Uuid> {
        let payment = payment.clone();
        self.call(move |reply| Message::Append { payment: payment.clone(), event_type, reply }).await
    }

    async fn get_payment_state(&self, payment_id: Uuid) -> Result<Payment> {
        self.call(move |reply| Message::GetState { payment_id, reply }).await
    }

    async fn get_payment_events(&self, payment_id: Uuid) -> Result<Vec<LedgerEvent>> {
        self.call(move |reply| Message::GetEvents { payment_id, reply }).await
    }

    async fn shutdown(&self) {
        InProcessLedger::shutdown(self).await;
    }
}

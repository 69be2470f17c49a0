//! End-to-end scenarios against `InProcessLedger`: the happy path, each
//! rejection stage, idempotent replay, and rate-limit admission gating.

use gateway_core::{Error, Orchestrator};
use gateway_types::{AccountId, Bic, Currency, EventType, Payment, PaymentStatus};
use gateway_validator::{SanctionsList, ValidatorConfig};
use idempotency_store::IdempotencyConfig;
use ledger_client::{InProcessLedger, LedgerClient, LedgerClientConfig};
use rate_limiter::RateLimiterConfig;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use worker_pool::WorkerPoolConfig;

fn sample_payment(amount: &str, currency: &str, debtor_bic: &str, creditor_bic: &str, debtor_name: &str) -> Payment {
    let now = chrono::Utc::now();
    Payment {
        payment_id: Uuid::nil(),
        amount: amount.parse().unwrap(),
        currency: Currency::new(currency),
        debtor_bank: Bic::parse(debtor_bic).unwrap(),
        creditor_bank: Bic::parse(creditor_bic).unwrap(),
        debtor_account: AccountId::new("GB00BANK00000000000001").unwrap(),
        creditor_account: AccountId::new("US00BANK00000000000002").unwrap(),
        debtor_name: debtor_name.to_string(),
        creditor_name: "Bob".to_string(),
        reference: "INV-2024-001".to_string(),
        status: PaymentStatus::Initiated,
        created_at: now,
        updated_at: now,
    }
}

/// Builds an orchestrator via `from_parts` so tests keep a direct handle
/// to the ledger for event-order assertions.
fn test_orchestrator(sanctions: SanctionsList, ratelimit: RateLimiterConfig) -> (Orchestrator, Arc<dyn LedgerClient>) {
    let ledger: Arc<dyn LedgerClient> = Arc::new(InProcessLedger::spawn(LedgerClientConfig::default()));
    let orchestrator = Orchestrator::from_parts(
        Arc::new(ValidatorConfig::default()),
        Arc::new(sanctions),
        ledger.clone(),
        WorkerPoolConfig { queue_size: 2048, worker_pool_size: 4, drain_deadline: Duration::from_secs(5) },
        ratelimit,
        IdempotencyConfig::default(),
        Duration::from_secs(2),
        Arc::new(gateway_core::Metrics::new().unwrap()),
    );
    (orchestrator, ledger)
}

async fn event_types(ledger: &dyn LedgerClient, payment_id: Uuid) -> Vec<EventType> {
    ledger.get_payment_events(payment_id).await.unwrap().into_iter().map(|e| e.event_type).collect()
}

#[tokio::test]
async fn s1_happy_path() {
    let (orchestrator, ledger) = test_orchestrator(SanctionsList::default(), RateLimiterConfig::default());
    let payment = sample_payment("1000.00", "USD", "BANKGB2LXXX", "BANKUS33XXX", "Alice");
    let ack = orchestrator.submit_payment(payment, Some("k-1"), &["ip-1".to_string()], None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let final_state = orchestrator.get_payment_status(ack.payment_id).await.unwrap();
    assert_eq!(final_state.status, PaymentStatus::Queued);

    let events = event_types(ledger.as_ref(), ack.payment_id).await;
    assert_eq!(
        events,
        vec![EventType::ValidationPassed, EventType::SanctionsCleared, EventType::RiskApproved, EventType::QueuedForSettlement]
    );
    orchestrator.close().await;
}

#[tokio::test]
async fn s2_validation_reject_negative_amount() {
    let (orchestrator, ledger) = test_orchestrator(SanctionsList::default(), RateLimiterConfig::default());
    let payment = sample_payment("-100.00", "USD", "BANKGB2LXXX", "BANKUS33XXX", "Alice");
    let ack = orchestrator.submit_payment(payment, Some("k-2"), &["ip-2".to_string()], None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let final_state = orchestrator.get_payment_status(ack.payment_id).await.unwrap();
    assert_eq!(final_state.status, PaymentStatus::Rejected);

    let events = event_types(ledger.as_ref(), ack.payment_id).await;
    assert_eq!(events, vec![EventType::ValidationFailed]);
    assert!(!events.contains(&EventType::SanctionsCleared));
    orchestrator.close().await;
}

#[tokio::test]
async fn s3_sanctions_hit() {
    let (orchestrator, ledger) =
        test_orchestrator(SanctionsList::new(["SANCTIONED_BANK LLC"]), RateLimiterConfig::default());
    let payment = sample_payment("1000.00", "USD", "BANKGB2LXXX", "BANKUS33XXX", "SANCTIONED_BANK LLC");
    let ack = orchestrator.submit_payment(payment, Some("k-3"), &["ip-3".to_string()], None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let final_state = orchestrator.get_payment_status(ack.payment_id).await.unwrap();
    assert_eq!(final_state.status, PaymentStatus::Rejected);

    let events = event_types(ledger.as_ref(), ack.payment_id).await;
    assert_eq!(events, vec![EventType::ValidationPassed, EventType::SanctionsHit]);
    orchestrator.close().await;
}

#[tokio::test]
async fn s4_risk_critical() {
    let (orchestrator, ledger) = test_orchestrator(SanctionsList::default(), RateLimiterConfig::default());
    let payment = sample_payment("500000.00", "INR", "BANKKPAAXXX", "BANKIRAAXXX", "Alice");
    let ack = orchestrator.submit_payment(payment, Some("k-4"), &["ip-4".to_string()], None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let final_state = orchestrator.get_payment_status(ack.payment_id).await.unwrap();
    assert_eq!(final_state.status, PaymentStatus::Rejected);

    let events = event_types(ledger.as_ref(), ack.payment_id).await;
    assert_eq!(
        events,
        vec![EventType::ValidationPassed, EventType::SanctionsCleared, EventType::RiskRejected]
    );
    orchestrator.close().await;
}

#[tokio::test]
async fn s5_idempotent_replay_returns_one_execution() {
    let (orchestrator, ledger) = test_orchestrator(SanctionsList::default(), RateLimiterConfig::default());
    let first = orchestrator
        .submit_payment(sample_payment("1000.00", "USD", "BANKGB2LXXX", "BANKUS33XXX", "Alice"), Some("k-5"), &["ip-5".to_string()], None)
        .await
        .unwrap();
    let second = orchestrator
        .submit_payment(sample_payment("1000.00", "USD", "BANKGB2LXXX", "BANKUS33XXX", "Alice"), Some("k-5"), &["ip-5".to_string()], None)
        .await
        .unwrap();

    assert_eq!(first.payment_id, second.payment_id);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let final_state = orchestrator.get_payment_status(first.payment_id).await.unwrap();
    assert_eq!(final_state.status, PaymentStatus::Queued);

    let events = event_types(ledger.as_ref(), first.payment_id).await;
    assert_eq!(
        events,
        vec![EventType::ValidationPassed, EventType::SanctionsCleared, EventType::RiskApproved, EventType::QueuedForSettlement]
    );
    orchestrator.close().await;
}

#[tokio::test]
async fn s6_rate_limit_denial_yields_positive_retry_after() {
    let (orchestrator, _ledger) = test_orchestrator(
        SanctionsList::default(),
        RateLimiterConfig { max_requests: 5, burst_size: 5, ..Default::default() },
    );

    let mut denied = 0;
    for i in 0..20 {
        let payment = sample_payment("100.00", "USD", "BANKGB2LXXX", "BANKUS33XXX", "Alice");
        let key = format!("k-6-{i}");
        let result = orchestrator.submit_payment(payment, Some(&key), &["ip-6".to_string()], None).await;
        if let Err(Error::RateLimited { retry_after }) = result {
            denied += 1;
            assert!(retry_after > Duration::from_secs(0));
        }
    }

    assert!(denied > 0, "expected at least one 429 once the bucket's burst was exhausted");
    orchestrator.close().await;
}

#[tokio::test]
async fn admission_gating_denied_submission_appends_no_event() {
    let (orchestrator, ledger) =
        test_orchestrator(SanctionsList::default(), RateLimiterConfig { max_requests: 1, burst_size: 1, ..Default::default() });

    let first = orchestrator
        .submit_payment(sample_payment("100.00", "USD", "BANKGB2LXXX", "BANKUS33XXX", "Alice"), Some("gate-1"), &["ip-gate".to_string()], None)
        .await
        .unwrap();
    let denied = orchestrator
        .submit_payment(sample_payment("100.00", "USD", "BANKGB2LXXX", "BANKUS33XXX", "Alice"), Some("gate-2"), &["ip-gate".to_string()], None)
        .await;
    assert!(matches!(denied, Err(Error::RateLimited { .. })));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let final_state = orchestrator.get_payment_status(first.payment_id).await.unwrap();
    assert_eq!(final_state.status, PaymentStatus::Queued);
    // the denied submission never reached payment_id assignment, so there is
    // no second set of events to assert "absent" against directly; the
    // ledger contains only the first payment's events.
    let events = event_types(ledger.as_ref(), first.payment_id).await;
    assert_eq!(events.len(), 4);
    orchestrator.close().await;
}

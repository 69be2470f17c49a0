//! The four-stage validate → sanctions → risk → enqueue pipeline. One
//! payment runs this to completion, or aborts after the first ledger
//! append failure.

use crate::observer::{PipelineEvent, PipelineObserver};
use gateway_types::{EventType, Payment};
use gateway_validator::{SanctionsList, ValidatorConfig};
use ledger_client::LedgerClient;
use std::time::Instant;
use tracing::Instrument;

/// Shared, read-only collaborators every pipeline run consults.
pub struct PipelineContext<'a> {
    /// Schema validation limits and whitelists.
    pub validator_config: &'a ValidatorConfig,
    /// Normalized sanctions watchlist.
    pub sanctions_list: &'a SanctionsList,
    /// Ledger to append typed events to.
    pub ledger: &'a dyn LedgerClient,
    /// Metrics/tracing hook.
    pub observer: &'a dyn PipelineObserver,
}

/// Times `ctx.observer.record_worker_duration` on drop, so every exit path
/// out of `run` (rejection at any stage, queued, or a ledger failure)
/// reports the same end-to-end duration without repeating the call at
/// each early return.
struct WorkerTimer<'a> {
    observer: &'a dyn PipelineObserver,
    started: Instant,
}

impl Drop for WorkerTimer<'_> {
    fn drop(&mut self) {
        self.observer.record_worker_duration(self.started.elapsed().as_secs_f64());
    }
}

/// Run the full pipeline for `payment`. Returns once the payment reaches a
/// terminal outcome (rejected at some stage, queued, or abandoned after a
/// ledger failure); does not retry the pipeline itself.
#[tracing::instrument(name = "submission", skip(payment, ctx), fields(payment_id = %payment.payment_id))]
pub async fn run(payment: Payment, ctx: &PipelineContext<'_>) {
    let _timer = WorkerTimer { observer: ctx.observer, started: Instant::now() };

    let validation = gateway_validator::validate(&payment, ctx.validator_config);
    let validation_event = if validation.valid { EventType::ValidationPassed } else { EventType::ValidationFailed };
    if !append_timed(ctx, "validate", &payment, validation_event).await {
        return;
    }
    if !validation.valid {
        ctx.observer.observe(PipelineEvent::ValidationFailed);
        return;
    }
    ctx.observer.observe(PipelineEvent::ValidationPassed);

    let sanctions = gateway_validator::check_sanctions(&payment.debtor_name, &payment.creditor_name, ctx.sanctions_list);
    let sanctions_event = if sanctions.cleared { EventType::SanctionsCleared } else { EventType::SanctionsHit };
    if !append_timed(ctx, "sanctions", &payment, sanctions_event).await {
        return;
    }
    if !sanctions.cleared {
        ctx.observer.observe(PipelineEvent::SanctionsHit);
        return;
    }
    ctx.observer.observe(PipelineEvent::SanctionsCleared);

    let risk = gateway_validator::assess_risk(&payment, ctx.validator_config);
    let risk_event = if risk.approved { EventType::RiskApproved } else { EventType::RiskRejected };
    if !append_timed(ctx, "risk", &payment, risk_event).await {
        return;
    }
    if !risk.approved {
        ctx.observer.observe(PipelineEvent::RiskRejected);
        return;
    }
    ctx.observer.observe(PipelineEvent::RiskApproved);

    if !append_timed(ctx, "enqueue", &payment, EventType::QueuedForSettlement).await {
        return;
    }
    ctx.observer.observe(PipelineEvent::QueuedForSettlement);
}

/// Run one named stage's ledger append inside its own child span, and
/// report the stage's wall-clock time regardless of outcome.
async fn append_timed(ctx: &PipelineContext<'_>, stage: &'static str, payment: &Payment, event_type: EventType) -> bool {
    let started = Instant::now();
    let appended = append(ctx, payment, event_type).instrument(tracing::info_span!("pipeline_stage", stage)).await;
    ctx.observer.record_stage_duration(stage, started.elapsed().as_secs_f64());
    appended
}

/// Append one event; on failure, record it and signal the caller to abort.
/// Returns `true` if the append succeeded.
async fn append(ctx: &PipelineContext<'_>, payment: &Payment, event_type: EventType) -> bool {
    match ctx.ledger.append_event(payment, event_type).await {
        Ok(_) => true,
        Err(error) => {
            tracing::error!(payment_id = %payment.payment_id, %error, ?event_type, "ledger append failed, abandoning payment in last-known status");
            ctx.observer.observe(PipelineEvent::LedgerAppendError);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use gateway_types::{AccountId, Bic, Currency, PaymentStatus};
    use ledger_client::{InProcessLedger, LedgerClientConfig};
    use chrono::Utc;
    use std::sync::Mutex as StdMutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingObserver {
        stages: StdMutex<Vec<String>>,
        worker_durations: StdMutex<Vec<f64>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn observe(&self, _event: PipelineEvent) {}

        fn record_stage_duration(&self, stage: &str, _seconds: f64) {
            self.stages.lock().unwrap().push(stage.to_string());
        }

        fn record_worker_duration(&self, seconds: f64) {
            self.worker_durations.lock().unwrap().push(seconds);
        }
    }

    fn sample_payment(amount: &str, currency: &str, debtor_bic: &str, creditor_bic: &str) -> Payment {
        let now = Utc::now();
        Payment {
            payment_id: Uuid::new_v4(),
            amount: amount.parse().unwrap(),
            currency: Currency::new(currency),
            debtor_bank: Bic::parse(debtor_bic).unwrap(),
            creditor_bank: Bic::parse(creditor_bic).unwrap(),
            debtor_account: AccountId::new("A1").unwrap(),
            creditor_account: AccountId::new("A2").unwrap(),
            debtor_name: "Alice".into(),
            creditor_name: "Bob".into(),
            reference: "INV-2024-001".into(),
            status: PaymentStatus::Initiated,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn happy_path_reaches_queued() {
        let ledger = InProcessLedger::spawn(LedgerClientConfig::default());
        let validator_config = ValidatorConfig::default();
        let sanctions_list = SanctionsList::default();
        let observer = NoopObserver;
        let ctx = PipelineContext {
            validator_config: &validator_config,
            sanctions_list: &sanctions_list,
            ledger: &ledger,
            observer: &observer,
        };

        let payment = sample_payment("1000.00", "USD", "BANKGB2LXXX", "BANKUS33XXX");
        let payment_id = payment.payment_id;
        run(payment, &ctx).await;

        let state = ledger.get_payment_state(payment_id).await.unwrap();
        assert_eq!(state.status, PaymentStatus::Queued);

        let events = ledger.get_payment_events(payment_id).await.unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            kinds,
            vec![
                EventType::ValidationPassed,
                EventType::SanctionsCleared,
                EventType::RiskApproved,
                EventType::QueuedForSettlement,
            ]
        );
    }

    #[tokio::test]
    async fn stage_and_worker_durations_are_recorded() {
        let ledger = InProcessLedger::spawn(LedgerClientConfig::default());
        let validator_config = ValidatorConfig::default();
        let sanctions_list = SanctionsList::default();
        let observer = RecordingObserver::default();
        let ctx = PipelineContext {
            validator_config: &validator_config,
            sanctions_list: &sanctions_list,
            ledger: &ledger,
            observer: &observer,
        };

        let payment = sample_payment("1000.00", "USD", "BANKGB2LXXX", "BANKUS33XXX");
        run(payment, &ctx).await;

        let stages = observer.stages.lock().unwrap().clone();
        assert_eq!(stages, vec!["validate", "sanctions", "risk", "enqueue"]);

        let worker_durations = observer.worker_durations.lock().unwrap().clone();
        assert_eq!(worker_durations.len(), 1);
        assert!(worker_durations[0] >= 0.0);
    }

    #[tokio::test]
    async fn sanctions_hit_stops_before_risk() {
        let ledger = InProcessLedger::spawn(LedgerClientConfig::default());
        let validator_config = ValidatorConfig::default();
        let sanctions_list = SanctionsList::new(["alice"]);
        let observer = NoopObserver;
        let ctx = PipelineContext {
            validator_config: &validator_config,
            sanctions_list: &sanctions_list,
            ledger: &ledger,
            observer: &observer,
        };

        let payment = sample_payment("1000.00", "USD", "BANKGB2LXXX", "BANKUS33XXX");
        let payment_id = payment.payment_id;
        run(payment, &ctx).await;

        let state = ledger.get_payment_state(payment_id).await.unwrap();
        assert_eq!(state.status, PaymentStatus::Rejected);

        let events = ledger.get_payment_events(payment_id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type, EventType::SanctionsHit);
    }

    #[tokio::test]
    async fn critical_risk_rejects_after_sanctions_clear() {
        let ledger = InProcessLedger::spawn(LedgerClientConfig::default());
        let validator_config = ValidatorConfig::default();
        let sanctions_list = SanctionsList::default();
        let observer = NoopObserver;
        let ctx = PipelineContext {
            validator_config: &validator_config,
            sanctions_list: &sanctions_list,
            ledger: &ledger,
            observer: &observer,
        };

        let payment = sample_payment("500000.00", "INR", "BANKKPAAXXX", "BANKIRAAXXX");
        let payment_id = payment.payment_id;
        run(payment, &ctx).await;

        let state = ledger.get_payment_state(payment_id).await.unwrap();
        assert_eq!(state.status, PaymentStatus::Rejected);

        let events = ledger.get_payment_events(payment_id).await.unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].event_type, EventType::RiskRejected);
    }
}

//! The stateful façade composing every collaborator crate.

use crate::error::{Error, Result};
use crate::metrics::Metrics;
use gateway_types::{Payment, PaymentStatus};
use gateway_validator::{SanctionsList, ValidatorConfig};
use idempotency_store::{IdempotencyConfig, IdempotencyStore, Outcome};
use ledger_client::{InProcessLedger, LedgerClient, LedgerClientConfig};
use rate_limiter::{AdmitResult, RateLimiter, RateLimiterConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;
use worker_pool::{WorkerPool, WorkerPoolConfig};

/// The synchronous acknowledgement `submit_payment` returns: acceptance,
/// not settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAck {
    /// The assigned (or caller-supplied) payment id.
    pub payment_id: Uuid,
    /// Always `Initiated` on a fresh admission; a cached idempotent replay
    /// returns whatever status the original admission produced.
    pub status: PaymentStatus,
}

type SubmitOutcome = std::result::Result<SubmitAck, Error>;

/// Composes the validator, ledger client, idempotency store, rate
/// limiter, and worker pool behind one façade.
pub struct Orchestrator {
    validator_config: Arc<ValidatorConfig>,
    ledger: Arc<dyn LedgerClient>,
    idempotency_store: IdempotencyStore<SubmitOutcome>,
    rate_limiter: Arc<RateLimiter>,
    worker_pool: WorkerPool,
    metrics: Arc<Metrics>,
    submission_deadline: Duration,
}

impl Orchestrator {
    /// Initialize the worker pool and an in-process ledger client, and
    /// wire `metrics` as the pipeline observer.
    ///
    /// `InProcessLedger` is the only `LedgerClient` this core ships; a
    /// networked implementation is out of scope.
    pub fn start(
        validator_config: ValidatorConfig,
        sanctions_list: SanctionsList,
        ledger_config: LedgerClientConfig,
        worker_pool_config: WorkerPoolConfig,
        rate_limiter_config: RateLimiterConfig,
        idempotency_config: IdempotencyConfig,
        submission_deadline: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        let validator_config = Arc::new(validator_config);
        let sanctions_list = Arc::new(sanctions_list);
        let ledger: Arc<dyn LedgerClient> = Arc::new(InProcessLedger::spawn(ledger_config));
        let rate_limiter = Arc::new(RateLimiter::new(rate_limiter_config));

        let worker_pool = WorkerPool::spawn(
            worker_pool_config,
            validator_config.clone(),
            sanctions_list,
            ledger.clone(),
            metrics.clone() as Arc<dyn worker_pool::PipelineObserver>,
        );

        Self {
            validator_config,
            ledger,
            idempotency_store: IdempotencyStore::new(idempotency_config),
            rate_limiter,
            worker_pool,
            metrics,
            submission_deadline,
        }
    }

    /// Build an orchestrator from collaborators already constructed
    /// elsewhere (used by the demo load generator, which shares a ledger
    /// handle with its own verification code).
    pub fn from_parts(
        validator_config: Arc<ValidatorConfig>,
        sanctions_list: Arc<SanctionsList>,
        ledger: Arc<dyn LedgerClient>,
        worker_pool_config: WorkerPoolConfig,
        rate_limiter_config: RateLimiterConfig,
        idempotency_config: IdempotencyConfig,
        submission_deadline: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(rate_limiter_config));
        let worker_pool = WorkerPool::spawn(
            worker_pool_config,
            validator_config.clone(),
            sanctions_list,
            ledger.clone(),
            metrics.clone() as Arc<dyn worker_pool::PipelineObserver>,
        );

        Self {
            validator_config,
            ledger,
            idempotency_store: IdempotencyStore::new(idempotency_config),
            rate_limiter,
            worker_pool,
            metrics,
            submission_deadline,
        }
    }

    /// Amount/currency/risk limits the validator stage consults. Exposed
    /// for callers (the HTTP layer, the demo) building a `Payment` that
    /// needs to already know the accepted currency whitelist, etc.
    pub fn validator_config(&self) -> &ValidatorConfig {
        &self.validator_config
    }

    /// Accept `payment` for processing.
    ///
    /// `subjects` are the rate-limiter bucket names this submission counts
    /// against (e.g. source IP, account id, a fixed global bucket).
    /// `deadline` overrides the configured default submission deadline.
    pub async fn submit_payment(
        &self,
        mut payment: Payment,
        idempotency_key: Option<&str>,
        subjects: &[String],
        deadline: Option<Duration>,
    ) -> Result<SubmitAck> {
        let started = Instant::now();
        let deadline = deadline.unwrap_or(self.submission_deadline);

        let key = idempotency_key.ok_or(Error::MissingIdempotencyKey)?;

        match self.rate_limiter.admit(subjects) {
            AdmitResult::Allowed => {}
            AdmitResult::Denied { retry_after } => {
                let bucket = subjects.first().map(String::as_str).unwrap_or("global");
                self.metrics.record_rate_limit_denied(bucket);
                return Err(Error::RateLimited { retry_after });
            }
            AdmitResult::SystemOverload => {
                self.metrics.record_rate_limit_denied("system");
                return Err(Error::SystemOverload);
            }
        }

        if payment.payment_id.is_nil() {
            payment.payment_id = Uuid::new_v4();
        }

        let worker_pool = &self.worker_pool;
        let executed = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let executed_flag = executed.clone();
        let outcome: Outcome<SubmitOutcome> = match self
            .idempotency_store
            .execute(key, || async move {
                executed_flag.store(true, std::sync::atomic::Ordering::SeqCst);
                let result = Self::admit_into_queue(worker_pool, payment, deadline).await;
                let status_code = match &result {
                    Ok(_) => 201,
                    Err(error) => error.status_code(),
                };
                Outcome { result, status_code }
            })
            .await
        {
            Ok(outcome) => outcome,
            Err(idempotency_store::Error::MissingKey) => return Err(Error::MissingIdempotencyKey),
            Err(idempotency_store::Error::Conflict) => return Err(Error::DuplicateInFlight),
            Err(idempotency_store::Error::WaitTimeout) => return Err(Error::QueueTimeout),
        };

        self.metrics.record_submit_duration(started.elapsed().as_secs_f64());
        if !executed.load(std::sync::atomic::Ordering::SeqCst) {
            self.metrics.record_idempotency_hit();
        }
        outcome.result
    }

    async fn admit_into_queue(worker_pool: &WorkerPool, mut payment: Payment, deadline: Duration) -> SubmitOutcome {
        let now = chrono::Utc::now();
        payment.status = PaymentStatus::Initiated;
        payment.created_at = now;
        payment.updated_at = now;
        let payment_id = payment.payment_id;

        worker_pool.enqueue(payment, deadline).await.map_err(|error| match error {
            worker_pool::Error::Canceled => Error::QueueTimeout,
            worker_pool::Error::ShuttingDown => Error::ShuttingDown,
        })?;

        Ok(SubmitAck { payment_id, status: PaymentStatus::Initiated })
    }

    /// Fetch the current materialized state for `payment_id`. Fails with
    /// `NotFound` if no events exist.
    pub async fn get_payment_status(&self, payment_id: Uuid) -> Result<Payment> {
        self.ledger.get_payment_state(payment_id).await.map_err(|error| match error {
            ledger_client::Error::NotFound(id) => Error::NotFound(id),
            _ => Error::Internal { stage: "ledger" },
        })
    }

    /// Close the ingress queue, wait for workers to drain up to the
    /// configured deadline, then close the ledger client.
    pub async fn close(&self) {
        self.worker_pool.close().await;
        self.ledger.shutdown().await;
    }
}

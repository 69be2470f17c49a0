//! Bounded ingress queue and fixed worker fleet. Generalizes the
//! single-writer actor mailbox pattern to N independent workers pulling
//! from one shared, bounded channel.

use crate::config::WorkerPoolConfig;
use crate::error::{Error, Result};
use crate::observer::PipelineObserver;
use crate::pipeline::{self, PipelineContext};
use gateway_types::Payment;
use gateway_validator::{SanctionsList, ValidatorConfig};
use ledger_client::LedgerClient;
use parking_lot::Mutex as SyncMutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

/// Bounded queue of pending payments plus the worker tasks draining it.
///
/// Closing is idempotent and does not consume the pool: `close` drops the
/// send side so workers observe the queue closing once it drains, then
/// waits for them up to the configured drain deadline.
pub struct WorkerPool {
    sender: SyncMutex<Option<tokio::sync::mpsc::Sender<Payment>>>,
    workers: AsyncMutex<Vec<JoinHandle<()>>>,
    drain_deadline: std::time::Duration,
    observer: Arc<dyn PipelineObserver>,
    queue_depth: Arc<AtomicI64>,
}

impl WorkerPool {
    /// Spawn `config.worker_pool_size` workers sharing one bounded queue of
    /// capacity `config.queue_size`. Each worker runs the full pipeline for
    /// one payment at a time, to completion, before taking the next.
    pub fn spawn(
        config: WorkerPoolConfig,
        validator_config: Arc<ValidatorConfig>,
        sanctions_list: Arc<SanctionsList>,
        ledger: Arc<dyn LedgerClient>,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        let (sender, receiver) = tokio::sync::mpsc::channel(config.queue_size);
        let receiver = Arc::new(AsyncMutex::new(receiver));
        let queue_depth = Arc::new(AtomicI64::new(0));

        let workers = (0..config.worker_pool_size)
            .map(|worker_id| {
                let receiver = receiver.clone();
                let validator_config = validator_config.clone();
                let sanctions_list = sanctions_list.clone();
                let ledger = ledger.clone();
                let observer = observer.clone();
                let queue_depth = queue_depth.clone();

                tokio::spawn(async move {
                    loop {
                        let payment = {
                            let mut receiver = receiver.lock().await;
                            receiver.recv().await
                        };
                        let Some(payment) = payment else {
                            tracing::debug!(worker_id, "queue closed, worker exiting");
                            break;
                        };

                        let depth = queue_depth.fetch_sub(1, Ordering::SeqCst) - 1;
                        observer.set_queue_depth(depth);

                        let ctx = PipelineContext {
                            validator_config: &validator_config,
                            sanctions_list: &sanctions_list,
                            ledger: ledger.as_ref(),
                            observer: observer.as_ref(),
                        };
                        pipeline::run(payment, &ctx).await;
                    }
                })
            })
            .collect();

        Self {
            sender: SyncMutex::new(Some(sender)),
            workers: AsyncMutex::new(workers),
            drain_deadline: config.drain_deadline,
            observer,
            queue_depth,
        }
    }

    /// Enqueue `payment`, waiting up to `deadline` for queue capacity.
    /// Fails with `ShuttingDown` once `close` has been called, or `Canceled`
    /// if `deadline` elapses first.
    pub async fn enqueue(&self, payment: Payment, deadline: std::time::Duration) -> Result<()> {
        let sender = self.sender.lock().clone();
        let Some(sender) = sender else { return Err(Error::ShuttingDown) };

        match tokio::time::timeout(deadline, sender.send(payment)).await {
            Ok(Ok(())) => {
                let depth = self.queue_depth.fetch_add(1, Ordering::SeqCst) + 1;
                self.observer.set_queue_depth(depth);
                Ok(())
            }
            Ok(Err(_)) => Err(Error::ShuttingDown),
            Err(_) => Err(Error::Canceled),
        }
    }

    /// True once `close` has been called, even if workers are still draining.
    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Close the queue to further `enqueue` calls and wait for all workers
    /// to drain remaining items, up to the configured drain deadline.
    /// Calling this more than once is safe; later calls just wait again.
    pub async fn close(&self) {
        self.sender.lock().take();

        let mut workers = self.workers.lock().await;
        let drain = async {
            for worker in workers.drain(..) {
                let _ = worker.await;
            }
        };

        if tokio::time::timeout(self.drain_deadline, drain).await.is_err() {
            tracing::warn!("worker pool drain deadline elapsed; some workers may still be running");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{NoopObserver, PipelineEvent};
    use gateway_types::{AccountId, Bic, Currency, PaymentStatus};
    use ledger_client::{InProcessLedger, LedgerClientConfig};
    use chrono::Utc;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingObserver {
        depths: StdMutex<Vec<i64>>,
        worker_durations: StdMutex<Vec<f64>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn observe(&self, _event: PipelineEvent) {}

        fn set_queue_depth(&self, depth: i64) {
            self.depths.lock().unwrap().push(depth);
        }

        fn record_worker_duration(&self, seconds: f64) {
            self.worker_durations.lock().unwrap().push(seconds);
        }
    }

    fn sample_payment() -> Payment {
        let now = Utc::now();
        Payment {
            payment_id: Uuid::new_v4(),
            amount: "1000.00".parse().unwrap(),
            currency: Currency::new("USD"),
            debtor_bank: Bic::parse("BANKGB2LXXX").unwrap(),
            creditor_bank: Bic::parse("BANKUS33XXX").unwrap(),
            debtor_account: AccountId::new("A1").unwrap(),
            creditor_account: AccountId::new("A2").unwrap(),
            debtor_name: "Alice".into(),
            creditor_name: "Bob".into(),
            reference: "ref".into(),
            status: PaymentStatus::Initiated,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_pool(queue_size: usize, worker_pool_size: usize, ledger: Arc<dyn LedgerClient>) -> WorkerPool {
        WorkerPool::spawn(
            WorkerPoolConfig { queue_size, worker_pool_size, drain_deadline: Duration::from_secs(5) },
            Arc::new(ValidatorConfig::default()),
            Arc::new(SanctionsList::default()),
            ledger,
            Arc::new(NoopObserver),
        )
    }

    #[tokio::test]
    async fn enqueued_payment_reaches_queued_status() {
        let ledger: Arc<dyn LedgerClient> = Arc::new(InProcessLedger::spawn(LedgerClientConfig::default()));
        let pool = test_pool(4, 2, ledger.clone());

        let payment = sample_payment();
        let payment_id = payment.payment_id;
        pool.enqueue(payment, Duration::from_secs(1)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        let state = ledger.get_payment_state(payment_id).await.unwrap();
        assert_eq!(state.status, PaymentStatus::Queued);

        pool.close().await;
    }

    #[tokio::test]
    async fn enqueue_after_close_fails_with_shutting_down() {
        let ledger: Arc<dyn LedgerClient> = Arc::new(InProcessLedger::spawn(LedgerClientConfig::default()));
        let pool = test_pool(4, 1, ledger);

        pool.close().await;
        assert!(pool.is_closed());

        let result = pool.enqueue(sample_payment(), Duration::from_millis(50)).await;
        assert!(matches!(result, Err(Error::ShuttingDown)));
    }

    #[tokio::test]
    async fn enqueue_and_dequeue_update_queue_depth() {
        let ledger: Arc<dyn LedgerClient> = Arc::new(InProcessLedger::spawn(LedgerClientConfig::default()));
        let observer = Arc::new(RecordingObserver::default());
        let pool = WorkerPool::spawn(
            WorkerPoolConfig { queue_size: 4, worker_pool_size: 1, drain_deadline: Duration::from_secs(5) },
            Arc::new(ValidatorConfig::default()),
            Arc::new(SanctionsList::default()),
            ledger,
            observer.clone(),
        );

        pool.enqueue(sample_payment(), Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        let depths = observer.depths.lock().unwrap().clone();
        assert!(depths.contains(&1), "enqueue should report depth 1, got {depths:?}");
        assert!(depths.contains(&0), "dequeue should report depth back to 0, got {depths:?}");

        let worker_durations = observer.worker_durations.lock().unwrap().clone();
        assert_eq!(worker_durations.len(), 1);
        assert!(worker_durations[0] >= 0.0);

        pool.close().await;
    }

    #[tokio::test]
    async fn full_queue_respects_enqueue_deadline() {
        let ledger: Arc<dyn LedgerClient> = Arc::new(InProcessLedger::spawn(LedgerClientConfig::default()));
        let pool = test_pool(1, 0, ledger);

        pool.enqueue(sample_payment(), Duration::from_millis(100)).await.unwrap();
        let result = pool.enqueue(sample_payment(), Duration::from_millis(50)).await;
        assert!(matches!(result, Err(Error::Canceled)));

        pool.close().await;
    }
}

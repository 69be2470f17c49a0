//! Prometheus metrics.
//!
//! Every metric is registered only into a `Metrics`-owned [`Registry`],
//! never the crate-global default one: the `register_counter!` /
//! `register_int_counter!` macros register into `prometheus`'s shared
//! global registry, which panics the moment a single process constructs
//! more than one `Metrics` (as happens whenever more than one `#[test]`
//! in the same binary builds one). Building plain metric objects and
//! registering them locally keeps repeated construction safe.

use prometheus::{Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use worker_pool::{PipelineEvent, PipelineObserver};

const STAGE_BUCKETS: &[f64] = &[0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];

/// One process's worth of gateway metrics, built once at startup and
/// shared behind an `Arc` — never a global static.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    payments_total: IntCounterVec,
    validation_failed_total: IntCounter,
    sanctions_hit_total: IntCounter,
    risk_rejected_total: IntCounter,
    ledger_append_errors_total: IntCounter,
    idempotency_hits_total: IntCounter,
    rate_limit_denied_total: IntCounterVec,
    submit_duration: Histogram,
    stage_duration: HistogramVec,
    worker_duration: Histogram,
    queue_depth: IntGauge,
}

impl Metrics {
    /// Build a fresh, independently-registered metrics set.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let payments_total = IntCounterVec::new(
            Opts::new("payments_total", "Payments by terminal status"),
            &["status"],
        )?;
        registry.register(Box::new(payments_total.clone()))?;

        let validation_failed_total = IntCounter::new("validation_failed_total", "Payments failing schema validation")?;
        registry.register(Box::new(validation_failed_total.clone()))?;

        let sanctions_hit_total = IntCounter::new("sanctions_hit_total", "Payments hitting sanctions screening")?;
        registry.register(Box::new(sanctions_hit_total.clone()))?;

        let risk_rejected_total = IntCounter::new("risk_rejected_total", "Payments rejected by risk assessment")?;
        registry.register(Box::new(risk_rejected_total.clone()))?;

        let ledger_append_errors_total = IntCounter::new("ledger_append_errors_total", "Ledger append calls that exhausted retries")?;
        registry.register(Box::new(ledger_append_errors_total.clone()))?;

        let idempotency_hits_total = IntCounter::new("idempotency_hits_total", "Submissions served from a cached idempotent record")?;
        registry.register(Box::new(idempotency_hits_total.clone()))?;

        let rate_limit_denied_total = IntCounterVec::new(
            Opts::new("rate_limit_denied_total", "Admissions denied by the rate limiter"),
            &["bucket"],
        )?;
        registry.register(Box::new(rate_limit_denied_total.clone()))?;

        let submit_duration = Histogram::with_opts(HistogramOpts::new(
            "submit_duration_seconds",
            "submit_payment wall-clock time",
        ).buckets(STAGE_BUCKETS.to_vec()))?;
        registry.register(Box::new(submit_duration.clone()))?;

        let stage_duration = HistogramVec::new(
            HistogramOpts::new("stage_duration_seconds", "Per-stage pipeline duration").buckets(STAGE_BUCKETS.to_vec()),
            &["stage"],
        )?;
        registry.register(Box::new(stage_duration.clone()))?;

        let worker_duration = Histogram::with_opts(HistogramOpts::new(
            "worker_duration_seconds",
            "End-to-end worker processing time, one payment start to finish",
        ).buckets(STAGE_BUCKETS.to_vec()))?;
        registry.register(Box::new(worker_duration.clone()))?;

        let queue_depth = IntGauge::new("queue_depth", "Current ingress queue depth")?;
        registry.register(Box::new(queue_depth.clone()))?;

        Ok(Self {
            registry,
            payments_total,
            validation_failed_total,
            sanctions_hit_total,
            risk_rejected_total,
            ledger_append_errors_total,
            idempotency_hits_total,
            rate_limit_denied_total,
            submit_duration,
            stage_duration,
            worker_duration,
            queue_depth,
        })
    }

    /// Render the current metric families in Prometheus text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Record `submit_payment`'s total wall-clock time.
    pub fn record_submit_duration(&self, seconds: f64) {
        self.submit_duration.observe(seconds);
    }

    /// Record one pipeline stage's duration.
    pub fn record_stage_duration(&self, stage: &str, seconds: f64) {
        self.stage_duration.with_label_values(&[stage]).observe(seconds);
    }

    /// Record a worker's total processing time for one payment.
    pub fn record_worker_duration(&self, seconds: f64) {
        self.worker_duration.observe(seconds);
    }

    /// Replace the queue-depth gauge with a fresh reading.
    pub fn set_queue_depth(&self, depth: i64) {
        self.queue_depth.set(depth);
    }

    /// A submission was served from a cached idempotent record rather than
    /// executing again.
    pub fn record_idempotency_hit(&self) {
        self.idempotency_hits_total.inc();
    }

    /// A submission was denied by the rate limiter for the named bucket.
    pub fn record_rate_limit_denied(&self, bucket: &str) {
        self.rate_limit_denied_total.with_label_values(&[bucket]).inc();
    }
}

impl PipelineObserver for Metrics {
    fn observe(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::ValidationPassed | PipelineEvent::SanctionsCleared | PipelineEvent::RiskApproved => {}
            PipelineEvent::ValidationFailed => {
                self.validation_failed_total.inc();
                self.payments_total.with_label_values(&["rejected"]).inc();
            }
            PipelineEvent::SanctionsHit => {
                self.sanctions_hit_total.inc();
                self.payments_total.with_label_values(&["rejected"]).inc();
            }
            PipelineEvent::RiskRejected => {
                self.risk_rejected_total.inc();
                self.payments_total.with_label_values(&["rejected"]).inc();
            }
            PipelineEvent::QueuedForSettlement => {
                self.payments_total.with_label_values(&["queued"]).inc();
            }
            PipelineEvent::LedgerAppendError => {
                self.ledger_append_errors_total.inc();
            }
        }
    }

    fn record_stage_duration(&self, stage: &str, seconds: f64) {
        Metrics::record_stage_duration(self, stage, seconds);
    }

    fn record_worker_duration(&self, seconds: f64) {
        Metrics::record_worker_duration(self, seconds);
    }

    fn set_queue_depth(&self, depth: i64) {
        Metrics::set_queue_depth(self, depth);
    }
}

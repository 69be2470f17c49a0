//! Hook for metrics/tracing collaborators to observe pipeline progress
//! without the worker pool depending on a concrete metrics backend.

/// A single observable pipeline outcome, one per completed stage plus a
/// terminal infrastructure failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Schema validation passed.
    ValidationPassed,
    /// Schema validation failed.
    ValidationFailed,
    /// Sanctions screening cleared.
    SanctionsCleared,
    /// Sanctions screening hit.
    SanctionsHit,
    /// Risk assessment approved.
    RiskApproved,
    /// Risk assessment rejected.
    RiskRejected,
    /// Payment queued for settlement; pipeline complete.
    QueuedForSettlement,
    /// A ledger append exhausted its retries; the payment was abandoned
    /// in its last-known status.
    LedgerAppendError,
}

/// Implemented by collaborators (typically a metrics registry) that want
/// to observe every pipeline stage transition.
pub trait PipelineObserver: Send + Sync {
    /// Called once per stage transition or terminal failure.
    fn observe(&self, event: PipelineEvent);

    /// One pipeline stage (`"validate"`, `"sanctions"`, `"risk"`,
    /// `"enqueue"`) finished in `seconds`. Default no-op.
    fn record_stage_duration(&self, _stage: &str, _seconds: f64) {}

    /// One payment ran the full pipeline, start to finish, in `seconds`.
    /// Default no-op.
    fn record_worker_duration(&self, _seconds: f64) {}

    /// The ingress queue's current depth, after an enqueue or dequeue.
    /// Default no-op.
    fn set_queue_depth(&self, _depth: i64) {}
}

/// An observer that discards every event; the default when none is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn observe(&self, _event: PipelineEvent) {}
}

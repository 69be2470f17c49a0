//! Token-bucket + sliding-window admission primitives for a single subject.

use std::time::{Duration, Instant};

/// Token bucket with continuous refill.
#[derive(Debug)]
pub(crate) struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub(crate) fn new(capacity: f64, refill_rate: f64) -> Self {
        Self { tokens: capacity, capacity, refill_rate, last_refill: Instant::now() }
    }

    fn refilled(&self, now: Instant) -> f64 {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * self.refill_rate).min(self.capacity)
    }

    /// Would `tokens` be available against `effective_capacity` (the
    /// adaptive-scaled ceiling for this call) without mutating state?
    pub(crate) fn peek(&self, tokens: f64, effective_capacity: f64, now: Instant) -> Option<Duration> {
        let available = self.refilled(now).min(effective_capacity);
        if available >= tokens {
            None
        } else {
            let deficit = tokens - available;
            Some(Duration::from_secs_f64(deficit / self.refill_rate))
        }
    }

    /// Apply the refill and consume `tokens`. Caller must have confirmed
    /// via `peek` that this call will succeed; it re-derives the same
    /// refilled value so the two stay consistent.
    pub(crate) fn commit(&mut self, tokens: f64, now: Instant) {
        self.tokens = self.refilled(now);
        self.tokens -= tokens;
        self.last_refill = now;
    }
}

/// Sliding window of recent request timestamps, as secondary enforcement
/// alongside the token bucket.
#[derive(Debug)]
pub(crate) struct SlidingWindow {
    timestamps: Vec<Instant>,
    max_requests: usize,
    window: Duration,
}

impl SlidingWindow {
    pub(crate) fn new(max_requests: usize, window: Duration) -> Self {
        Self { timestamps: Vec::with_capacity(max_requests), max_requests, window }
    }

    fn live_count(&self, now: Instant) -> usize {
        let cutoff = now - self.window;
        self.timestamps.iter().filter(|&&ts| ts > cutoff).count()
    }

    pub(crate) fn peek(&self, effective_max: usize, now: Instant) -> Option<Duration> {
        if self.live_count(now) < effective_max {
            None
        } else {
            let cutoff = now - self.window;
            let oldest = self.timestamps.iter().filter(|&&ts| ts > cutoff).min().copied().unwrap_or(now);
            Some((oldest + self.window).saturating_duration_since(now))
        }
    }

    pub(crate) fn commit(&mut self, now: Instant) {
        let cutoff = now - self.window;
        self.timestamps.retain(|&ts| ts > cutoff);
        self.timestamps.push(now);
    }
}

pub(crate) struct BucketEntry {
    pub(crate) token_bucket: TokenBucket,
    pub(crate) sliding_window: SlidingWindow,
    pub(crate) last_access: Instant,
}

impl BucketEntry {
    pub(crate) fn new(capacity: f64, refill_rate: f64, max_requests: usize, window: Duration) -> Self {
        Self {
            token_bucket: TokenBucket::new(capacity, refill_rate),
            sliding_window: SlidingWindow::new(max_requests, window),
            last_access: Instant::now(),
        }
    }

    pub(crate) fn peek(&self, effective_scale: f64, max_requests: usize, now: Instant) -> Option<Duration> {
        let effective_capacity = self.token_bucket.capacity * effective_scale;
        let effective_max = ((max_requests as f64) * effective_scale).floor() as usize;
        self.token_bucket
            .peek(1.0, effective_capacity, now)
            .into_iter()
            .chain(self.sliding_window.peek(effective_max.max(1), now))
            .max()
    }

    pub(crate) fn commit(&mut self, now: Instant) {
        self.token_bucket.commit(1.0, now);
        self.sliding_window.commit(now);
        self.last_access = now;
    }
}

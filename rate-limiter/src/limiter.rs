//! Multi-subject token-bucket + sliding-window admission.

use crate::bucket::BucketEntry;
use crate::config::RateLimiterConfig;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a call to [`RateLimiter::admit`].
#[derive(Debug, Clone, PartialEq)]
pub enum AdmitResult {
    /// All named subjects had capacity; one token was consumed from each.
    Allowed,
    /// At least one subject denied; no bucket was mutated.
    Denied {
        /// Minimum wait across all denying buckets.
        retry_after: Duration,
    },
    /// The adaptive load signal has saturated; no bucket was consulted.
    SystemOverload,
}

/// Per-subject (IP, account, `__global__`, ...) rate limiter. Subjects are
/// opaque names; callers decide which ones to pass to `admit`.
pub struct RateLimiter {
    config: RateLimiterConfig,
    buckets: DashMap<String, Arc<Mutex<BucketEntry>>>,
    system_load: RwLock<f64>,
}

impl RateLimiter {
    /// Build a limiter from `config`. No buckets are created until first use.
    pub fn new(config: RateLimiterConfig) -> Self {
        Self { config, buckets: DashMap::new(), system_load: RwLock::new(0.0) }
    }

    /// Atomically admit against every named subject: peek all buckets first,
    /// and only commit (decrement) if every one of them would allow the
    /// request. No partial mutation on denial.
    pub fn admit(&self, subjects: &[impl AsRef<str>]) -> AdmitResult {
        let Some(scale) = self.load_scale() else { return AdmitResult::SystemOverload };
        if subjects.is_empty() {
            return AdmitResult::Allowed;
        }

        let mut names: Vec<&str> = subjects.iter().map(|s| s.as_ref()).collect();
        names.sort_unstable();
        names.dedup();

        let entries: Vec<Arc<Mutex<BucketEntry>>> = names.iter().map(|name| self.entry_for(name)).collect();
        let mut guards: Vec<_> = entries.iter().map(|e| e.lock()).collect();

        let now = Instant::now();
        let denial = guards
            .iter()
            .filter_map(|guard| guard.peek(scale, self.config.max_requests as usize, now))
            .min();

        if let Some(retry_after) = denial {
            return AdmitResult::Denied { retry_after };
        }

        for guard in guards.iter_mut() {
            guard.commit(now);
        }

        AdmitResult::Allowed
    }

    /// Report external system load in [0, 1]; out-of-range values are clamped.
    pub fn update_system_load(&self, load: f64) {
        *self.system_load.write() = load.clamp(0.0, 1.0);
    }

    /// Drop buckets untouched for longer than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        self.buckets.retain(|_, entry| entry.lock().last_access.elapsed() < max_age);
    }

    /// Spawn a periodic background cleanup task.
    pub fn start_cleanup_task(self: Arc<Self>, interval: Duration, max_age: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.cleanup(max_age);
            }
        });
    }

    /// `None` signals the adaptive load has fully saturated the throttle
    /// range (load >= 1.0 given threshold < 1.0): `SystemOverload`.
    /// Otherwise the scale factor in [0, 1] to apply to bucket capacity.
    fn load_scale(&self) -> Option<f64> {
        if !self.config.adaptive {
            return Some(1.0);
        }
        let load = *self.system_load.read();
        let threshold = self.config.adaptive_threshold;
        if load <= threshold {
            return Some(1.0);
        }
        let ratio = (load - threshold) / (1.0 - threshold).max(f64::EPSILON);
        if ratio >= 1.0 {
            None
        } else {
            Some((1.0 - ratio).clamp(0.0, 1.0))
        }
    }

    fn entry_for(&self, name: &str) -> Arc<Mutex<BucketEntry>> {
        if let Some(existing) = self.buckets.get(name) {
            return existing.clone();
        }
        self.buckets
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(BucketEntry::new(
                    self.config.burst_size as f64,
                    self.config.refill_rate,
                    self.config.max_requests as usize,
                    self.config.window_duration.into(),
                )))
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RateLimiterConfig {
        RateLimiterConfig {
            max_requests: 5,
            window_duration: crate::config::DurationMillis(Duration::from_secs(1)),
            burst_size: 5,
            refill_rate: 1.0,
            adaptive: false,
            adaptive_threshold: 0.8,
        }
    }

    #[test]
    fn allows_burst_then_denies() {
        let limiter = RateLimiter::new(test_config());
        for _ in 0..5 {
            assert_eq!(limiter.admit(&["ip:1"]), AdmitResult::Allowed);
        }
        assert!(matches!(limiter.admit(&["ip:1"]), AdmitResult::Denied { .. }));
    }

    #[test]
    fn denial_does_not_mutate_other_subjects() {
        let limiter = RateLimiter::new(test_config());
        for _ in 0..5 {
            limiter.admit(&["ip:1"]);
        }
        // ip:1 is now exhausted; a joint call with account:a must deny
        // without consuming account:a's token.
        assert!(matches!(limiter.admit(&["ip:1", "account:a"]), AdmitResult::Denied { .. }));
        // account:a should still have its full burst available.
        for _ in 0..5 {
            assert_eq!(limiter.admit(&["account:a"]), AdmitResult::Allowed);
        }
    }

    #[test]
    fn adaptive_scaling_triggers_system_overload_at_full_load() {
        let mut config = test_config();
        config.adaptive = true;
        config.adaptive_threshold = 0.8;
        let limiter = RateLimiter::new(config);
        limiter.update_system_load(1.0);
        assert_eq!(limiter.admit(&["ip:1"]), AdmitResult::SystemOverload);
    }

    #[test]
    fn adaptive_scaling_shrinks_capacity_under_elevated_load() {
        let mut config = test_config();
        config.burst_size = 10;
        config.max_requests = 10;
        config.adaptive = true;
        config.adaptive_threshold = 0.5;
        let limiter = RateLimiter::new(config);
        limiter.update_system_load(0.75);
        // scale = 1 - (0.75-0.5)/(1-0.5) = 0.5 -> effective capacity ~5
        let mut allowed = 0;
        for _ in 0..10 {
            if limiter.admit(&["ip:1"]) == AdmitResult::Allowed {
                allowed += 1;
            }
        }
        assert!(allowed < 10);
    }

    #[test]
    fn empty_subject_list_is_always_allowed() {
        let limiter = RateLimiter::new(test_config());
        assert_eq!(limiter.admit(&Vec::<&str>::new()), AdmitResult::Allowed);
    }
}

//! Rate limiter tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-subject bucket sizing plus the adaptive-scaling knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimiterConfig {
    /// Requests per window before the sliding window denies.
    pub max_requests: u32,
    /// Sliding-window duration, in milliseconds.
    #[serde(rename = "window_duration_ms")]
    pub window_duration: DurationMillis,
    /// Token-bucket burst capacity.
    pub burst_size: u32,
    /// Token refill rate, tokens per second.
    pub refill_rate: f64,
    /// Enable load-based capacity scaling.
    pub adaptive: bool,
    /// Load fraction (0.0-1.0) above which scaling kicks in.
    pub adaptive_threshold: f64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 1000,
            window_duration: DurationMillis(Duration::from_secs(60)),
            burst_size: 100,
            refill_rate: 16.67,
            adaptive: true,
            adaptive_threshold: 0.8,
        }
    }
}

/// Millisecond-precision duration, serialized as a plain integer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationMillis(#[serde(with = "millis")] pub Duration);

impl From<DurationMillis> for Duration {
    fn from(value: DurationMillis) -> Self {
        value.0
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

//! Idempotency store tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do when a second caller arrives while the first is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InFlightPolicy {
    /// Wait for the in-flight call to finish, up to `wait_cap`.
    Wait,
    /// Reject immediately with `Error::Conflict`.
    Reject,
}

/// Store-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdempotencyConfig {
    /// How long a completed record remains cached before it expires.
    #[serde(with = "millis")]
    pub ttl: Duration,
    /// Policy applied when a key is already in progress.
    pub in_flight_policy: InFlightPolicy,
    /// Maximum time a `Wait` caller blocks before `Error::WaitTimeout`.
    #[serde(with = "millis")]
    pub wait_cap: Duration,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            in_flight_policy: InFlightPolicy::Wait,
            wait_cap: Duration::from_secs(30),
        }
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

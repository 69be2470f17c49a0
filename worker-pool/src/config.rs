//! Worker pool sizing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue capacity, worker count, and shutdown drain bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerPoolConfig {
    /// Bounded FIFO queue capacity.
    pub queue_size: usize,
    /// Fixed number of worker tasks.
    pub worker_pool_size: usize,
    /// Upper bound on how long `close` waits for in-flight work to drain.
    #[serde(with = "millis")]
    pub drain_deadline: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self { queue_size: 1024, worker_pool_size: 8, drain_deadline: Duration::from_secs(30) }
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

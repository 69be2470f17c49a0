//! Connection and retry tuning for the ledger client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry and timeout policy plus the optional batching window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerClientConfig {
    /// Timeout for establishing a connection.
    #[serde(with = "humantime_millis")]
    pub connect_timeout: Duration,
    /// Timeout for a single request, including retries.
    #[serde(with = "humantime_millis")]
    pub request_timeout: Duration,
    /// Maximum number of retry attempts for connection-level errors.
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries.
    #[serde(with = "humantime_millis")]
    pub base_delay: Duration,
    /// Ceiling on backoff delay regardless of attempt count.
    #[serde(with = "humantime_millis")]
    pub max_delay: Duration,
    /// Whether appends may be coalesced into batches.
    pub batching_enabled: bool,
    /// Maximum events per batch.
    pub batch_size: usize,
    /// Maximum time an event waits in an open batch before it is flushed.
    #[serde(with = "humantime_millis")]
    pub batch_timeout: Duration,
}

impl Default for LedgerClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            max_retries: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            batching_enabled: true,
            batch_size: 100,
            batch_timeout: Duration::from_millis(10),
        }
    }
}

mod humantime_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

//! Gateway-wide configuration, immutable once loaded, no reload during
//! the process's lifecycle. Composes each collaborator crate's own
//! config type behind two loaders: `from_file` and `from_env`.

use ledger_client::LedgerClientConfig;
use rate_limiter::RateLimiterConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use worker_pool::WorkerPoolConfig;

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// Top-level configuration, enumerating every gateway-wide option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Inbound HTTP surface.
    pub server: ServerConfig,
    /// Outbound connection to the ledger.
    pub ledger: LedgerConfig,
    /// Payment amount limits and worker fleet sizing.
    pub limits: LimitsConfig,
    /// Rate-limiter tuning.
    pub ratelimit: RateLimiterConfig,
    /// Idempotency TTL and in-flight policy.
    pub idempotency: idempotency_store::IdempotencyConfig,
    /// Sanctions list source.
    pub sanctions: SanctionsConfig,
}

/// HTTP surface options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Max accepted request body size, in bytes (default 4 MiB).
    pub max_message_size: usize,
    /// Address the HTTP listener binds.
    pub bind_addr: String,
    /// Default submission deadline honored by `submit_payment` when the
    /// caller supplies none.
    #[serde(with = "millis")]
    pub submission_deadline: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_message_size: 4 * 1024 * 1024,
            bind_addr: "0.0.0.0:8080".to_string(),
            submission_deadline: Duration::from_secs(5),
        }
    }
}

/// Ledger connection options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Network address of the ledger service. Unused by
    /// [`ledger_client::InProcessLedger`]; reserved for a future networked
    /// implementation of [`ledger_client::LedgerClient`].
    pub addr: String,
    /// Retry/timeout/batching policy, passed straight through to the
    /// ledger client.
    pub client: LedgerClientConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { addr: "in-process".to_string(), client: LedgerClientConfig::default() }
    }
}

/// Amount limits and worker fleet sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Amount range, currency whitelist, and risk-scoring thresholds.
    pub validator: gateway_validator::ValidatorConfig,
    /// Queue capacity and worker fleet size.
    pub worker_pool: WorkerPoolConfig,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { validator: Default::default(), worker_pool: Default::default() }
    }
}

/// Sanctions list source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SanctionsConfig {
    /// Path to a newline-delimited list of screened names. `None` runs
    /// with an empty list (everything clears screening).
    pub list_path: Option<PathBuf>,
    /// How often the list is expected to be refreshed by an operator
    /// process; this core only reads it once at `start`.
    #[serde(with = "millis")]
    pub refresh_interval: Duration,
}

impl Default for SanctionsConfig {
    fn default() -> Self {
        Self { list_path: None, refresh_interval: Duration::from_secs(3600) }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            ledger: LedgerConfig::default(),
            limits: LimitsConfig::default(),
            ratelimit: RateLimiterConfig::default(),
            idempotency: idempotency_store::IdempotencyConfig::default(),
            sanctions: SanctionsConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load and parse a TOML file. Unknown keys at any nesting level are
    /// rejected rather than silently ignored.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| crate::Error::Internal { stage: "config" })?;
        toml::from_str(&content).map_err(|_| crate::Error::Internal { stage: "config" })
    }

    /// Start from defaults and apply a handful of environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("GATEWAY_BIND_ADDR") {
            config.server.bind_addr = addr;
        }
        if let Ok(addr) = std::env::var("GATEWAY_LEDGER_ADDR") {
            config.ledger.addr = addr;
        }
        if let Ok(path) = std::env::var("GATEWAY_SANCTIONS_LIST_PATH") {
            config.sanctions.list_path = Some(PathBuf::from(path));
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_binds_to_all_interfaces() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert!(config.sanctions.list_path.is_none());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = GatewayConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: GatewayConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.server.bind_addr, config.server.bind_addr);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut value = toml::to_string(&GatewayConfig::default()).unwrap();
        value.push_str("\n[bogus]\nx = 1\n");
        assert!(toml::from_str::<GatewayConfig>(&value).is_err());
    }
}

//! Validator configuration — immutable once loaded, no reload during
//! the running process's lifecycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Static configuration consulted by every validator call. Cheap to clone
/// and meant to be shared behind an `Arc` by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Minimum accepted amount (inclusive).
    pub min_amount: Decimal,
    /// Maximum accepted amount (inclusive).
    pub max_amount: Decimal,
    /// Currencies accepted in addition to the built-in whitelist.
    #[serde(default)]
    pub extra_currencies: Vec<String>,
    /// BIC-prefix country codes treated as high risk for scoring purposes.
    #[serde(default = "default_high_risk_countries")]
    pub high_risk_countries: Vec<String>,
    /// Currencies exempt from cross-border/"off the major three" risk add.
    #[serde(default = "default_major_currencies")]
    pub major_currencies: Vec<String>,
}

fn default_high_risk_countries() -> Vec<String> {
    vec!["KP".into(), "IR".into(), "SY".into(), "CU".into()]
}

fn default_major_currencies() -> Vec<String> {
    vec!["USD".into(), "EUR".into(), "GBP".into()]
}

const BASE_CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY", "CHF", "AED", "INR", "CNY"];

impl ValidatorConfig {
    /// Whether `code` (already upper-cased) is accepted.
    pub fn accepts_currency(&self, code: &str) -> bool {
        BASE_CURRENCIES.contains(&code) || self.extra_currencies.iter().any(|c| c == code)
    }

    /// Whether `country` is on the high-risk list.
    pub fn is_high_risk_country(&self, country: &str) -> bool {
        self.high_risk_countries.iter().any(|c| c == country)
    }

    /// Whether `code` is one of the three low-risk major currencies.
    pub fn is_major_currency(&self, code: &str) -> bool {
        self.major_currencies.iter().any(|c| c == code)
    }

    fn high_risk_set(&self) -> HashSet<&str> {
        self.high_risk_countries.iter().map(String::as_str).collect()
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_amount: Decimal::new(1, 2),
            max_amount: Decimal::from(100_000_000),
            extra_currencies: Vec::new(),
            high_risk_countries: default_high_risk_countries(),
            major_currencies: default_major_currencies(),
        }
    }
}

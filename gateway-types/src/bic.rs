//! Bank Identifier Code (ISO 9362)

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static BIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?$").expect("valid regex"));

/// Bank Identifier Code, 8 or 11 characters, per ISO 9362.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bic(String);

impl Bic {
    /// Parse and validate a BIC. Accepts lower-case input, normalizes to upper-case.
    pub fn parse(raw: &str) -> Result<Self> {
        let upper = raw.trim().to_uppercase();
        if !BIC_PATTERN.is_match(&upper) {
            return Err(Error::InvalidBic(raw.to_string()));
        }
        Ok(Self(upper))
    }

    /// The raw BIC string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Country code embedded in the BIC (characters 5-6, 0-indexed 4..6).
    pub fn country_code(&self) -> &str {
        &self.0[4..6]
    }
}

impl fmt::Display for Bic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Result types produced by the validator pipeline stages.

use serde::{Deserialize, Serialize};

/// Outcome of `gateway_validator::validate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no errors were collected.
    pub valid: bool,
    /// Blocking diagnostics.
    pub errors: Vec<String>,
    /// Non-blocking diagnostics.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Start an empty, passing result; errors push it to failing.
    pub fn new() -> Self {
        Self { valid: true, errors: Vec::new(), warnings: Vec::new() }
    }

    /// Record a blocking error.
    pub fn push_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
        self.valid = false;
    }

    /// Record a non-blocking warning.
    pub fn push_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Which party of the payment a sanctions hit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Party {
    /// The sending party.
    Debtor,
    /// The receiving party.
    Creditor,
}

/// A single sanctions match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanctionsMatch {
    /// Which party matched.
    pub party: Party,
    /// The normalized sanctioned-entity entry that matched.
    pub matched_entry: String,
}

/// Outcome of `gateway_validator::check_sanctions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SanctionsCheck {
    /// True iff no hits were found.
    pub cleared: bool,
    /// All hits found (debtor and creditor, potentially several entries each).
    pub hits: Vec<SanctionsMatch>,
}

/// Discrete risk level derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// score < 0.3
    Low,
    /// 0.3 <= score < 0.6
    Medium,
    /// 0.6 <= score < 0.8
    High,
    /// score >= 0.8
    Critical,
}

impl RiskLevel {
    /// Classify a clamped [0,1] score per the thresholds above.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::Critical
        } else if score >= 0.6 {
            RiskLevel::High
        } else if score >= 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Outcome of `gateway_validator::assess_risk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Approved iff level <= High.
    pub approved: bool,
    /// Numeric score, clamped to [0, 1].
    pub score: f64,
    /// Discrete level derived from the score.
    pub level: RiskLevel,
    /// Human-readable contributing signals.
    pub reasons: Vec<String>,
    /// Suggested mitigations (non-empty for High/Critical).
    pub mitigations: Vec<String>,
}

//! Risk scoring. Deterministic and side-effect free: the same payment
//! and config always produce the same `RiskAssessment`.

use crate::config::ValidatorConfig;
use gateway_types::{Payment, RiskAssessment, RiskLevel};
use rust_decimal::Decimal;

const HIGH_AMOUNT_THRESHOLD: i64 = 100_000;
const ELEVATED_AMOUNT_THRESHOLD: i64 = 10_000;

/// Score a payment against the contributing signals, clamp to [0, 1], and
/// classify the result.
pub fn assess_risk(payment: &Payment, config: &ValidatorConfig) -> RiskAssessment {
    let mut score = 0.0_f64;
    let mut reasons = Vec::new();

    let high_amount = Decimal::from(HIGH_AMOUNT_THRESHOLD);
    let elevated_amount = Decimal::from(ELEVATED_AMOUNT_THRESHOLD);

    if payment.amount > high_amount {
        score += 0.3;
        reasons.push(format!("amount {} exceeds {}", payment.amount, high_amount));
    } else if payment.amount > elevated_amount {
        score += 0.1;
        reasons.push(format!("amount {} exceeds {}", payment.amount, elevated_amount));
    }

    let debtor_country = payment.debtor_bank.country_code();
    let creditor_country = payment.creditor_bank.country_code();

    if config.is_high_risk_country(debtor_country) || config.is_high_risk_country(creditor_country) {
        score += 0.4;
        reasons.push("counterparty bank in high-risk jurisdiction".to_string());
    }

    if debtor_country != creditor_country {
        score += 0.1;
        reasons.push("cross-border transfer".to_string());
    }

    if !config.is_major_currency(payment.currency.code()) {
        score += 0.2;
        reasons.push(format!("currency {} outside major set", payment.currency.code()));
    }

    let score = score.clamp(0.0, 1.0);
    let level = RiskLevel::from_score(score);
    let approved = !matches!(level, RiskLevel::Critical);

    let mitigations = match level {
        RiskLevel::High => vec!["manual review".to_string(), "enhanced due diligence".to_string()],
        RiskLevel::Critical => {
            vec!["manual review".to_string(), "enhanced due diligence".to_string(), "block".to_string()]
        }
        RiskLevel::Low | RiskLevel::Medium => Vec::new(),
    };

    RiskAssessment { approved, score, level, reasons, mitigations }
}

//! Schema validation. All checks run regardless of earlier failures so
//! callers see every diagnostic in one pass.

use crate::config::ValidatorConfig;
use gateway_types::{Payment, ValidationResult};
use rust_decimal::Decimal;

/// Run all schema checks against `payment`, collecting every diagnostic.
pub fn validate(payment: &Payment, config: &ValidatorConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    check_amount(payment, config, &mut result);
    check_currency(payment, config, &mut result);
    check_bics(payment, &mut result);
    check_required_fields(payment, &mut result);
    check_reference(payment, &mut result);
    check_same_bank(payment, &mut result);

    result
}

fn check_amount(payment: &Payment, config: &ValidatorConfig, result: &mut ValidationResult) {
    if payment.amount <= Decimal::ZERO {
        result.push_error("amount must be strictly positive");
        return;
    }
    if payment.amount < config.min_amount || payment.amount > config.max_amount {
        result.push_error(format!(
            "amount {} outside allowed range [{}, {}]",
            payment.amount, config.min_amount, config.max_amount
        ));
    }
    if payment.amount.scale() > 2 {
        result.push_error("amount has more than 2 fractional digits");
    }
}

fn check_currency(payment: &Payment, config: &ValidatorConfig, result: &mut ValidationResult) {
    if !config.accepts_currency(payment.currency.code()) {
        result.push_error(format!("currency {} not in whitelist", payment.currency.code()));
    }
}

fn check_bics(_payment: &Payment, _result: &mut ValidationResult) {
    // Bic::parse already rejects malformed input at construction time; a
    // stored Payment always carries a structurally valid Bic.
}

fn check_required_fields(payment: &Payment, result: &mut ValidationResult) {
    if payment.debtor_account.as_str().is_empty() {
        result.push_error("debtor_account must not be empty");
    }
    if payment.creditor_account.as_str().is_empty() {
        result.push_error("creditor_account must not be empty");
    }
    if payment.debtor_name.trim().is_empty() {
        result.push_error("debtor_name must not be empty");
    }
    if payment.creditor_name.trim().is_empty() {
        result.push_error("creditor_name must not be empty");
    }
}

fn check_reference(payment: &Payment, result: &mut ValidationResult) {
    if payment.reference.trim().is_empty() {
        result.push_warning("reference is empty");
    }
}

fn check_same_bank(payment: &Payment, result: &mut ValidationResult) {
    if payment.debtor_bank.as_str() == payment.creditor_bank.as_str() {
        result.push_warning("same bank transfer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_types::{AccountId, Bic, Currency, PaymentStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn base_payment() -> Payment {
        let now = Utc::now();
        Payment {
            payment_id: Uuid::new_v4(),
            amount: Decimal::new(100000, 2),
            currency: Currency::new("USD"),
            debtor_bank: Bic::parse("BANKGB2LXXX").unwrap(),
            creditor_bank: Bic::parse("BANKUS33XXX").unwrap(),
            debtor_account: AccountId::new("A1").unwrap(),
            creditor_account: AccountId::new("A2").unwrap(),
            debtor_name: "Alice".into(),
            creditor_name: "Bob".into(),
            reference: "INV-2024-001".into(),
            status: PaymentStatus::Initiated,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn happy_path_is_valid_with_no_diagnostics() {
        let config = ValidatorConfig::default();
        let result = validate(&base_payment(), &config);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn negative_amount_is_an_error() {
        let mut payment = base_payment();
        payment.amount = Decimal::new(-100, 2);
        let result = validate(&payment, &ValidatorConfig::default());
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("strictly positive")));
    }

    #[test]
    fn unknown_currency_is_an_error() {
        let mut payment = base_payment();
        payment.currency = Currency::new("ZZZ");
        let result = validate(&payment, &ValidatorConfig::default());
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("whitelist")));
    }

    #[test]
    fn empty_reference_is_a_warning_not_an_error() {
        let mut payment = base_payment();
        payment.reference = "".into();
        let result = validate(&payment, &ValidatorConfig::default());
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("reference")));
    }

    #[test]
    fn same_bank_transfer_is_a_warning() {
        let mut payment = base_payment();
        payment.creditor_bank = payment.debtor_bank.clone();
        let result = validate(&payment, &ValidatorConfig::default());
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("same bank")));
    }

    #[test]
    fn all_diagnostics_collected_in_one_pass() {
        let mut payment = base_payment();
        payment.amount = Decimal::new(-100, 2);
        payment.currency = Currency::new("ZZZ");
        payment.reference = "".into();
        let result = validate(&payment, &ValidatorConfig::default());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.warnings.len(), 1);
    }
}

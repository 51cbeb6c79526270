//! Tests for module settings validation

use rust_decimal::Decimal;

use shared::QuantitySurveySettings;

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn settings() -> QuantitySurveySettings {
    QuantitySurveySettings::default()
}

#[test]
fn defaults_are_valid() {
    assert!(settings().validate().is_ok());
}

#[test]
fn retention_default_must_stay_within_bounds() {
    let mut s = settings();
    s.default_retention_percentage = dec("50");
    assert!(s.validate().is_ok());

    s.default_retention_percentage = dec("51");
    assert!(s.validate().is_err());

    s.default_retention_percentage = dec("-1");
    assert!(s.validate().is_err());
}

#[test]
fn budget_alert_threshold_must_stay_within_bounds() {
    let mut s = settings();
    s.budget_alert_threshold = dec("100");
    assert!(s.validate().is_ok());

    s.budget_alert_threshold = dec("101");
    assert!(s.validate().is_err());
}

#[test]
fn ledger_entries_require_all_three_accounts() {
    let mut s = settings();
    s.create_ledger_entries = true;
    assert!(s.validate().is_err());

    s.default_wip_account = Some("1400 - Work in Progress".to_string());
    assert!(s.validate().is_err());

    s.default_creditors_account = Some("2100 - Creditors".to_string());
    assert!(s.validate().is_err());

    s.default_retention_account = Some("2150 - Retention Payable".to_string());
    assert!(s.validate().is_ok());
}

#[test]
fn accounts_are_optional_when_ledger_entries_are_disabled() {
    let mut s = settings();
    s.create_ledger_entries = false;
    s.default_wip_account = None;
    s.default_creditors_account = None;
    s.default_retention_account = None;
    assert!(s.validate().is_ok());
}

//! Tests for payment certificate calculations
//!
//! Verifies the deduction chain, the negative-net rejection rule, and the
//! cumulative figures.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{
    validate_net_payment, validate_retention_percentage, CertificateType, DocStatus,
    DocumentStatus, PaymentCertificate,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn certificate(gross: &str, retention_pct: &str) -> PaymentCertificate {
    PaymentCertificate {
        id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        valuation_id: None,
        contractor: Some("Acme Construction".to_string()),
        certificate_type: CertificateType::Interim,
        certificate_date: Utc::now().date_naive(),
        payment_due_date: None,
        docstatus: DocStatus::Draft,
        status: DocumentStatus::Draft,
        gross_amount: dec(gross),
        retention_percentage: dec(retention_pct),
        retention_amount: Decimal::ZERO,
        advance_recovery: Decimal::ZERO,
        other_deductions: Decimal::ZERO,
        previous_payments: Decimal::ZERO,
        previous_retention: Decimal::ZERO,
        net_payment_amount: Decimal::ZERO,
        cumulative_gross_amount: Decimal::ZERO,
        cumulative_retention: Decimal::ZERO,
        remarks: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

mod deduction_chain {
    use super::*;

    #[test]
    fn net_is_gross_less_all_deductions() {
        let mut cert = certificate("10000", "5");
        cert.advance_recovery = dec("1000");
        cert.other_deductions = dec("250");
        cert.previous_payments = dec("2000");

        cert.recalculate();

        assert_eq!(cert.retention_amount, dec("500.00"));
        // 10000 - 500 - 1000 - 250 - 2000
        assert_eq!(cert.net_payment_amount, dec("6250.00"));
        assert_eq!(cert.cumulative_gross_amount, dec("12000.00"));
    }

    #[test]
    fn zero_gross_is_left_untouched() {
        let mut cert = certificate("0", "5");
        cert.retention_amount = dec("42");

        cert.recalculate();

        // Nothing to certify, nothing recomputed
        assert_eq!(cert.retention_amount, dec("42"));
        assert_eq!(cert.net_payment_amount, Decimal::ZERO);
    }

    #[test]
    fn cumulative_retention_builds_on_prior_certificates() {
        let mut cert = certificate("10000", "5");
        cert.previous_retention = dec("1200");

        cert.recalculate();

        assert_eq!(cert.cumulative_retention, dec("1700.00"));
    }

    #[test]
    fn recalculate_is_idempotent() {
        let mut cert = certificate("10000", "5");
        cert.previous_retention = dec("1200");
        cert.previous_payments = dec("3000");

        cert.recalculate();
        let first = (
            cert.retention_amount,
            cert.net_payment_amount,
            cert.cumulative_gross_amount,
            cert.cumulative_retention,
        );
        cert.recalculate();
        let second = (
            cert.retention_amount,
            cert.net_payment_amount,
            cert.cumulative_gross_amount,
            cert.cumulative_retention,
        );

        assert_eq!(first, second);
    }
}

mod validation {
    use super::*;

    #[test]
    fn negative_net_payment_is_rejected() {
        // gross 100, recovery 50, deductions 60 would net -10
        let mut cert = certificate("100", "0");
        cert.advance_recovery = dec("50");
        cert.other_deductions = dec("60");

        cert.recalculate();

        assert_eq!(cert.net_payment_amount, dec("-10.00"));
        assert!(validate_net_payment(cert.net_payment_amount).is_err());
    }

    #[test]
    fn non_negative_net_payment_passes() {
        let mut cert = certificate("100", "0");
        cert.advance_recovery = dec("50");
        cert.other_deductions = dec("50");

        cert.recalculate();

        assert_eq!(cert.net_payment_amount, dec("0.00"));
        assert!(validate_net_payment(cert.net_payment_amount).is_ok());
    }

    #[test]
    fn retention_percentage_bounds() {
        assert!(validate_retention_percentage(dec("0")).is_ok());
        assert!(validate_retention_percentage(dec("5")).is_ok());
        assert!(validate_retention_percentage(dec("50")).is_ok());
        assert!(validate_retention_percentage(dec("50.01")).is_err());
        assert!(validate_retention_percentage(dec("-1")).is_err());
    }
}

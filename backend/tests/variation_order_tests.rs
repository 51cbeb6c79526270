//! Tests for variation order calculations
//!
//! Verifies the omission sign rule, the signed total, and the
//! approval-gated status labels.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{
    ApprovalStatus, DocStatus, DocumentStatus, VariationItem, VariationOrder, VariationType,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn variation_with_items(contract_value: &str, items: Vec<VariationItem>) -> VariationOrder {
    VariationOrder {
        id: Uuid::new_v4(),
        boq_id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        company: None,
        variation_type: VariationType::Addition,
        description: "Extra drainage works".to_string(),
        docstatus: DocStatus::Draft,
        status: DocumentStatus::Draft,
        approval_status: ApprovalStatus::Pending,
        approved_by: None,
        approved_on: None,
        rejection_reason: None,
        original_contract_value: dec(contract_value),
        total_variation_amount: Decimal::ZERO,
        variation_percentage: Decimal::ZERO,
        items,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn line(quantity: &str, rate: &str, kind: VariationType) -> VariationItem {
    VariationItem {
        id: Uuid::new_v4(),
        item_code: "DRN-001".to_string(),
        description: None,
        uom: "m".to_string(),
        quantity: dec(quantity),
        rate: dec(rate),
        variation_type: kind,
        amount: Decimal::ZERO,
    }
}

mod sign_rule {
    use super::*;

    #[test]
    fn omission_negates_the_amount() {
        let mut variation =
            variation_with_items("0", vec![line("10", "5", VariationType::Omission)]);
        variation.recalculate();

        assert_eq!(variation.items[0].amount, dec("-50"));
        assert_eq!(variation.total_variation_amount, dec("-50"));
    }

    #[test]
    fn addition_keeps_the_amount_positive() {
        let mut variation =
            variation_with_items("0", vec![line("10", "5", VariationType::Addition)]);
        variation.recalculate();

        assert_eq!(variation.items[0].amount, dec("50"));
        assert_eq!(variation.total_variation_amount, dec("50"));
    }

    #[test]
    fn mixed_lines_net_out() {
        let mut variation = variation_with_items(
            "0",
            vec![
                line("10", "100", VariationType::Addition),
                line("4", "50", VariationType::Omission),
            ],
        );
        variation.recalculate();

        assert_eq!(variation.total_variation_amount, dec("800"));
    }

    #[test]
    fn unpriced_lines_are_skipped() {
        let mut variation = variation_with_items(
            "0",
            vec![
                line("10", "0", VariationType::Addition),
                line("2", "25", VariationType::Addition),
            ],
        );
        variation.recalculate();

        assert_eq!(variation.total_variation_amount, dec("50"));
    }
}

mod percentage {
    use super::*;

    #[test]
    fn percentage_against_original_contract() {
        let mut variation =
            variation_with_items("10000", vec![line("10", "100", VariationType::Addition)]);
        variation.recalculate();

        assert_eq!(variation.variation_percentage, dec("10.00"));
    }

    #[test]
    fn percentage_is_zero_without_contract_value() {
        let mut variation =
            variation_with_items("0", vec![line("10", "100", VariationType::Addition)]);
        variation.recalculate();

        assert_eq!(variation.variation_percentage, Decimal::ZERO);
    }

    #[test]
    fn omissions_produce_negative_percentage() {
        let mut variation =
            variation_with_items("10000", vec![line("10", "100", VariationType::Omission)]);
        variation.recalculate();

        assert_eq!(variation.variation_percentage, dec("-10.00"));
    }
}

mod approval_status {
    use super::*;

    #[test]
    fn submitted_with_pending_approval_reads_submitted() {
        let mut variation = variation_with_items("0", vec![]);
        variation.docstatus = DocStatus::Submitted;
        variation.refresh_status();

        assert_eq!(variation.status, DocumentStatus::Submitted);
    }

    #[test]
    fn approval_decision_drives_the_label() {
        let mut variation = variation_with_items("0", vec![]);
        variation.docstatus = DocStatus::Submitted;

        variation.approval_status = ApprovalStatus::Approved;
        variation.refresh_status();
        assert_eq!(variation.status, DocumentStatus::Approved);

        variation.approval_status = ApprovalStatus::Rejected;
        variation.refresh_status();
        assert_eq!(variation.status, DocumentStatus::Rejected);
    }

    #[test]
    fn cancellation_overrides_approval() {
        let mut variation = variation_with_items("0", vec![]);
        variation.docstatus = DocStatus::Cancelled;
        variation.approval_status = ApprovalStatus::Approved;
        variation.refresh_status();

        assert_eq!(variation.status, DocumentStatus::Cancelled);
    }
}

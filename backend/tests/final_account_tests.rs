//! Tests for final account reconciliation

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{DocStatus, DocumentStatus, FinalAccount, FinalAccountItem};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn account(items: Vec<FinalAccountItem>) -> FinalAccount {
    FinalAccount {
        id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        contractor: "Acme Construction".to_string(),
        account_date: Utc::now().date_naive(),
        docstatus: DocStatus::Draft,
        status: DocumentStatus::Draft,
        original_contract_value: Decimal::ZERO,
        approved_variations_total: Decimal::ZERO,
        claims_amount: Decimal::ZERO,
        contra_charges: Decimal::ZERO,
        adjusted_contract_value: Decimal::ZERO,
        work_done_to_date: Decimal::ZERO,
        materials_on_site: Decimal::ZERO,
        previous_payments: Decimal::ZERO,
        current_payment_due: Decimal::ZERO,
        total_certified_value: Decimal::ZERO,
        retention_percentage: Decimal::ZERO,
        retention_amount: Decimal::ZERO,
        net_amount_due: Decimal::ZERO,
        vat_percentage: Decimal::ZERO,
        vat_amount: Decimal::ZERO,
        gross_amount_payable: Decimal::ZERO,
        final_payment_amount: Decimal::ZERO,
        items,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn reconciliation_line(
    category: Option<&str>,
    original_quantity: &str,
    original_rate: &str,
    final_quantity: &str,
    final_rate: &str,
) -> FinalAccountItem {
    let original_quantity = dec(original_quantity);
    let original_rate = dec(original_rate);
    FinalAccountItem {
        id: Uuid::new_v4(),
        item_code: "EXC-001".to_string(),
        item_name: None,
        description: None,
        uom: "m3".to_string(),
        item_category: category.map(|c| c.to_string()),
        original_quantity,
        original_rate,
        original_amount: original_quantity * original_rate,
        final_quantity: dec(final_quantity),
        final_rate: dec(final_rate),
        final_amount: Decimal::ZERO,
        quantity_variance: Decimal::ZERO,
        rate_variance: Decimal::ZERO,
        amount_variance: Decimal::ZERO,
    }
}

mod item_variances {
    use super::*;

    #[test]
    fn final_amount_and_variances() {
        let mut item = reconciliation_line(None, "10", "100", "12", "110");
        item.recalculate();

        assert_eq!(item.final_amount, dec("1320"));
        assert_eq!(item.quantity_variance, dec("2"));
        assert_eq!(item.rate_variance, dec("10"));
        assert_eq!(item.amount_variance, dec("320"));
    }

    #[test]
    fn reduced_measurement_gives_negative_variances() {
        let mut item = reconciliation_line(None, "10", "100", "8", "100");
        item.recalculate();

        assert_eq!(item.quantity_variance, dec("-2"));
        assert_eq!(item.amount_variance, dec("-200"));
    }
}

mod reconciliation {
    use super::*;

    #[test]
    fn adjusted_contract_value() {
        let mut account = account(vec![]);
        account.original_contract_value = dec("100000");
        account.approved_variations_total = dec("5000");
        account.claims_amount = dec("2000");
        account.contra_charges = dec("1500");

        account.recalculate();

        assert_eq!(account.adjusted_contract_value, dec("105500"));
    }

    #[test]
    fn payment_chain_to_final_payment() {
        let mut account = account(vec![reconciliation_line(None, "10", "100", "10", "100")]);
        account.retention_percentage = dec("5");
        account.vat_percentage = dec("20");
        account.previous_payments = dec("500");

        account.recalculate();

        assert_eq!(account.total_certified_value, dec("1000"));
        assert_eq!(account.retention_amount, dec("50.00"));
        assert_eq!(account.net_amount_due, dec("950.00"));
        assert_eq!(account.vat_amount, dec("190.00"));
        assert_eq!(account.gross_amount_payable, dec("1140.00"));
        assert_eq!(account.final_payment_amount, dec("640.00"));
    }

    #[test]
    fn current_payment_due_from_work_and_materials() {
        let mut account = account(vec![]);
        account.work_done_to_date = dec("8000");
        account.materials_on_site = dec("1000");
        account.previous_payments = dec("6500");

        account.recalculate();

        assert_eq!(account.current_payment_due, dec("2500"));
    }

    #[test]
    fn recalculate_is_idempotent() {
        let mut account = account(vec![reconciliation_line(None, "10", "99.99", "11", "101.01")]);
        account.original_contract_value = dec("100000");
        account.retention_percentage = dec("3");
        account.vat_percentage = dec("7.5");

        account.recalculate();
        let first = (
            account.adjusted_contract_value,
            account.total_certified_value,
            account.net_amount_due,
            account.final_payment_amount,
        );
        account.recalculate();
        let second = (
            account.adjusted_contract_value,
            account.total_certified_value,
            account.net_amount_due,
            account.final_payment_amount,
        );

        assert_eq!(first, second);
    }
}

mod analysis {
    use super::*;

    #[test]
    fn category_breakdown_groups_items() {
        let mut account = account(vec![
            reconciliation_line(Some("Substructure"), "10", "100", "12", "100"),
            reconciliation_line(Some("Substructure"), "5", "200", "5", "220"),
            reconciliation_line(None, "1", "500", "1", "450"),
        ]);
        account.original_contract_value = dec("3000");
        account.recalculate();

        let analysis = account.cost_analysis();

        let substructure = &analysis.category_breakdown["Substructure"];
        assert_eq!(substructure.original_amount, dec("2000"));
        assert_eq!(substructure.final_amount, dec("2300"));
        assert_eq!(substructure.variance, dec("300"));

        // Uncategorized lines fall under Other
        let other = &analysis.category_breakdown["Other"];
        assert_eq!(other.original_amount, dec("500"));
        assert_eq!(other.final_amount, dec("450"));
        assert_eq!(other.variance, dec("-50"));
    }

    #[test]
    fn total_variance_against_original_contract() {
        let mut account = account(vec![]);
        account.original_contract_value = dec("100000");
        account.approved_variations_total = dec("10000");
        account.recalculate();

        let analysis = account.cost_analysis();
        assert_eq!(analysis.total_variance, dec("10000"));
        assert_eq!(analysis.variance_percentage, dec("10.00"));
    }
}

mod review_status {
    use super::*;

    #[test]
    fn submission_moves_to_under_review() {
        let mut account = account(vec![]);
        account.docstatus = DocStatus::Submitted;
        account.refresh_status();
        assert_eq!(account.status, DocumentStatus::UnderReview);
    }

    #[test]
    fn agreement_is_preserved_while_submitted() {
        let mut account = account(vec![]);
        account.docstatus = DocStatus::Submitted;
        account.status = DocumentStatus::Agreed;
        account.refresh_status();
        assert_eq!(account.status, DocumentStatus::Agreed);
    }

    #[test]
    fn cancellation_is_terminal() {
        let mut account = account(vec![]);
        account.docstatus = DocStatus::Cancelled;
        account.status = DocumentStatus::Agreed;
        account.refresh_status();
        assert_eq!(account.status, DocumentStatus::Cancelled);
    }
}

//! Tests for valuation calculations
//!
//! Verifies cumulative measurement, retention, and the end-to-end
//! BoQ-to-valuation scenario.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{DocStatus, DocumentStatus, Valuation, ValuationItem};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn valuation_with_items(retention_percentage: &str, items: Vec<ValuationItem>) -> Valuation {
    Valuation {
        id: Uuid::new_v4(),
        boq_id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        company: None,
        valuation_date: Utc::now().date_naive(),
        period: None,
        docstatus: DocStatus::Draft,
        status: DocumentStatus::Draft,
        total_work_done: Decimal::ZERO,
        current_valuation: Decimal::ZERO,
        cumulative_total: Decimal::ZERO,
        previous_total: Decimal::ZERO,
        retention_percentage: dec(retention_percentage),
        retention_amount: Decimal::ZERO,
        net_payable: Decimal::ZERO,
        items,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn measurement(previous: &str, current: &str, rate: &str) -> ValuationItem {
    ValuationItem {
        id: Uuid::new_v4(),
        item_code: "EXC-001".to_string(),
        description: None,
        uom: "m3".to_string(),
        previous_quantity: dec(previous),
        current_quantity: dec(current),
        cumulative_quantity: Decimal::ZERO,
        rate: dec(rate),
        current_amount: Decimal::ZERO,
        cumulative_amount: Decimal::ZERO,
    }
}

mod cumulative_measurement {
    use super::*;

    #[test]
    fn cumulative_adds_previous_and_current() {
        let mut item = measurement("8", "5", "100");
        item.recalculate();

        assert_eq!(item.cumulative_quantity, dec("13"));
        assert_eq!(item.current_amount, dec("500"));
        assert_eq!(item.cumulative_amount, dec("1300"));
    }

    #[test]
    fn first_period_cumulative_is_current() {
        let mut item = measurement("0", "5", "100");
        item.recalculate();

        assert_eq!(item.cumulative_quantity, dec("5"));
        assert_eq!(item.cumulative_amount, dec("500"));
    }

    #[test]
    fn unmeasured_item_is_left_alone() {
        let mut item = measurement("0", "0", "100");
        item.recalculate();

        assert_eq!(item.cumulative_quantity, Decimal::ZERO);
        assert_eq!(item.current_amount, Decimal::ZERO);
        assert_eq!(item.cumulative_amount, Decimal::ZERO);
    }
}

mod retention {
    use super::*;

    #[test]
    fn retention_and_net_payable() {
        // current_valuation 1000 at 5% retention withholds 50, pays 950
        let mut valuation = valuation_with_items("5", vec![measurement("0", "10", "100")]);
        valuation.recalculate();

        assert_eq!(valuation.current_valuation, dec("1000"));
        assert_eq!(valuation.retention_amount, dec("50.00"));
        assert_eq!(valuation.net_payable, dec("950.00"));
    }

    #[test]
    fn zero_retention_pays_full_valuation() {
        let mut valuation = valuation_with_items("0", vec![measurement("0", "10", "100")]);
        valuation.recalculate();

        assert_eq!(valuation.retention_amount, Decimal::ZERO);
        assert_eq!(valuation.net_payable, dec("1000"));
    }
}

mod totals {
    use super::*;

    #[test]
    fn work_done_sums_cumulative_amounts() {
        let mut valuation = valuation_with_items(
            "0",
            vec![measurement("8", "5", "100"), measurement("0", "2", "50")],
        );
        valuation.recalculate();

        assert_eq!(valuation.current_valuation, dec("600"));
        assert_eq!(valuation.total_work_done, dec("1400"));
        assert_eq!(valuation.cumulative_total, dec("1400"));
    }

    #[test]
    fn recalculate_is_idempotent() {
        let mut valuation = valuation_with_items("5", vec![measurement("3.33", "6.67", "99.99")]);

        valuation.recalculate();
        let first = (
            valuation.total_work_done,
            valuation.current_valuation,
            valuation.retention_amount,
            valuation.net_payable,
        );
        valuation.recalculate();
        let second = (
            valuation.total_work_done,
            valuation.current_valuation,
            valuation.retention_amount,
            valuation.net_payable,
        );

        assert_eq!(first, second);
    }
}

mod end_to_end {
    use super::*;
    use shared::{BillOfQuantities, BoqItem};

    #[test]
    fn boq_then_first_valuation() {
        // BoQ with one line {qty=10, rate=100}
        let mut boq = BillOfQuantities {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            company: None,
            title: "Contract works".to_string(),
            description: None,
            docstatus: DocStatus::Draft,
            status: DocumentStatus::Draft,
            total_quantity: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            items: vec![BoqItem {
                id: Uuid::new_v4(),
                item_code: "EXC-001".to_string(),
                item_name: None,
                description: None,
                uom: "m3".to_string(),
                quantity: dec("10"),
                rate: dec("100"),
                amount: Decimal::ZERO,
                bim_element_id: None,
                bim_element_type: None,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        boq.recalculate();
        assert_eq!(boq.total_amount, dec("1000"));

        boq.docstatus = DocStatus::Submitted;
        boq.refresh_status();
        assert_eq!(boq.status, DocumentStatus::Submitted);

        // First valuation measures half the quantity at the BoQ rate
        let mut valuation = valuation_with_items("5", vec![measurement("0", "5", "100")]);
        valuation.boq_id = boq.id;
        valuation.recalculate();

        assert_eq!(valuation.items[0].current_amount, dec("500"));
        assert_eq!(valuation.current_valuation, dec("500"));
        assert_eq!(valuation.retention_amount, dec("25.00"));
        assert_eq!(valuation.net_payable, dec("475.00"));
    }
}

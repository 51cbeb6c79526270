//! Tests for Bill of Quantities calculations
//!
//! Verifies the line-amount rule, the document sum invariant, and the
//! idempotence of the totals aggregator.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{line_amount, BillOfQuantities, BoqItem, DocStatus, DocumentStatus};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn boq_with_items(items: Vec<BoqItem>) -> BillOfQuantities {
    BillOfQuantities {
        id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        company: None,
        title: "Main works".to_string(),
        description: None,
        docstatus: DocStatus::Draft,
        status: DocumentStatus::Draft,
        total_quantity: Decimal::ZERO,
        total_amount: Decimal::ZERO,
        items,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn item(quantity: &str, rate: &str) -> BoqItem {
    BoqItem {
        id: Uuid::new_v4(),
        item_code: "CONC-001".to_string(),
        item_name: None,
        description: None,
        uom: "m3".to_string(),
        quantity: dec(quantity),
        rate: dec(rate),
        amount: Decimal::ZERO,
        bim_element_id: None,
        bim_element_type: None,
    }
}

mod line_amounts {
    use super::*;

    #[test]
    fn amount_is_quantity_times_rate_rounded() {
        assert_eq!(line_amount(dec("10"), dec("100")), Some(dec("1000")));
        assert_eq!(line_amount(dec("3.333"), dec("3")), Some(dec("10.00")));
        assert_eq!(line_amount(dec("0.125"), dec("1")), Some(dec("0.13")));
    }

    #[test]
    fn missing_quantity_or_rate_yields_none() {
        assert_eq!(line_amount(Decimal::ZERO, dec("100")), None);
        assert_eq!(line_amount(dec("10"), Decimal::ZERO), None);
        assert_eq!(line_amount(Decimal::ZERO, Decimal::ZERO), None);
    }

    #[test]
    fn manual_amount_survives_recalculation() {
        // A line without a rate keeps whatever amount was entered by hand
        let mut manual = item("10", "0");
        manual.amount = dec("750");
        let mut boq = boq_with_items(vec![manual]);

        boq.recalculate();

        assert_eq!(boq.items[0].amount, dec("750"));
        // but it does not contribute to the document totals
        assert_eq!(boq.total_amount, Decimal::ZERO);
        assert_eq!(boq.total_quantity, Decimal::ZERO);
    }
}

mod totals {
    use super::*;

    #[test]
    fn totals_sum_all_computed_lines() {
        let mut boq = boq_with_items(vec![
            item("10", "100"),
            item("5", "20.50"),
            item("2.5", "40"),
        ]);

        boq.recalculate();

        assert_eq!(boq.items[0].amount, dec("1000"));
        assert_eq!(boq.items[1].amount, dec("102.50"));
        assert_eq!(boq.items[2].amount, dec("100.00"));
        assert_eq!(boq.total_quantity, dec("17.5"));
        assert_eq!(boq.total_amount, dec("1202.50"));
    }

    #[test]
    fn single_line_end_to_end() {
        // BoQ with one line {qty=10, rate=100} totals 1000
        let mut boq = boq_with_items(vec![item("10", "100")]);
        boq.recalculate();
        assert_eq!(boq.total_amount, dec("1000"));
    }

    #[test]
    fn empty_boq_totals_zero() {
        let mut boq = boq_with_items(vec![]);
        boq.recalculate();
        assert_eq!(boq.total_quantity, Decimal::ZERO);
        assert_eq!(boq.total_amount, Decimal::ZERO);
    }

    #[test]
    fn recalculate_is_idempotent() {
        let mut boq = boq_with_items(vec![item("7.77", "13.13"), item("1.01", "99.99")]);

        boq.recalculate();
        let first_quantity = boq.total_quantity;
        let first_amount = boq.total_amount;
        let first_items: Vec<Decimal> = boq.items.iter().map(|i| i.amount).collect();

        boq.recalculate();

        assert_eq!(boq.total_quantity, first_quantity);
        assert_eq!(boq.total_amount, first_amount);
        let second_items: Vec<Decimal> = boq.items.iter().map(|i| i.amount).collect();
        assert_eq!(first_items, second_items);
    }
}

mod status {
    use super::*;

    #[test]
    fn status_follows_submission_flag() {
        let mut boq = boq_with_items(vec![]);

        boq.refresh_status();
        assert_eq!(boq.status, DocumentStatus::Draft);

        boq.docstatus = DocStatus::Submitted;
        boq.refresh_status();
        assert_eq!(boq.status, DocumentStatus::Submitted);

        boq.docstatus = DocStatus::Cancelled;
        boq.refresh_status();
        assert_eq!(boq.status, DocumentStatus::Cancelled);
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Aggregating an already aggregated document changes nothing
        #[test]
        fn aggregation_idempotence(
            lines in prop::collection::vec((0i64..=100_000, 0i64..=100_000), 0..20)
        ) {
            let items = lines
                .iter()
                .map(|(q, r)| item(&Decimal::new(*q, 2).to_string(), &Decimal::new(*r, 2).to_string()))
                .collect();
            let mut boq = boq_with_items(items);

            boq.recalculate();
            let once = (boq.total_quantity, boq.total_amount);
            boq.recalculate();
            let twice = (boq.total_quantity, boq.total_amount);

            prop_assert_eq!(once, twice);
        }

        /// total_amount equals the rounded sum of quantity * rate over
        /// computed lines
        #[test]
        fn sum_invariant(
            lines in prop::collection::vec((1i64..=100_000, 1i64..=100_000), 1..20)
        ) {
            let items: Vec<BoqItem> = lines
                .iter()
                .map(|(q, r)| item(&Decimal::new(*q, 2).to_string(), &Decimal::new(*r, 2).to_string()))
                .collect();
            let mut boq = boq_with_items(items);
            boq.recalculate();

            let expected: Decimal = lines
                .iter()
                .map(|(q, r)| shared::round2(Decimal::new(*q, 2) * Decimal::new(*r, 2)))
                .sum();

            let diff = (boq.total_amount - shared::round2(expected)).abs();
            prop_assert!(diff <= dec("0.01"));
        }
    }
}

//! Tests for cross-document rollups
//!
//! Verifies the submitted-only filter, the self-exclusion rule, and the
//! completion percentage behavior.

use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{
    capped_progress, completion_percentage, sum_submitted_excluding, DocStatus, DocumentTotal,
    ProjectFinancialSummary,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn total(docstatus: DocStatus, amount: &str) -> DocumentTotal {
    DocumentTotal {
        id: Uuid::new_v4(),
        docstatus,
        amount: dec(amount),
    }
}

mod submitted_sums {
    use super::*;

    #[test]
    fn only_submitted_documents_count() {
        let documents = vec![
            total(DocStatus::Draft, "100"),
            total(DocStatus::Submitted, "200"),
            total(DocStatus::Cancelled, "400"),
            total(DocStatus::Submitted, "800"),
        ];

        assert_eq!(sum_submitted_excluding(&documents, None), dec("1000"));
    }

    #[test]
    fn current_document_is_excluded_even_when_submitted() {
        // previous_total for a valuation must not count the valuation
        // itself, or a recomputation after submission double-counts it
        let own_id = Uuid::new_v4();
        let documents = vec![
            DocumentTotal {
                id: own_id,
                docstatus: DocStatus::Submitted,
                amount: dec("500"),
            },
            total(DocStatus::Submitted, "300"),
            total(DocStatus::Submitted, "200"),
        ];

        assert_eq!(
            sum_submitted_excluding(&documents, Some(own_id)),
            dec("500")
        );
        assert_eq!(sum_submitted_excluding(&documents, None), dec("1000"));
    }

    #[test]
    fn empty_set_sums_to_zero() {
        assert_eq!(sum_submitted_excluding(&[], None), Decimal::ZERO);
    }
}

mod completion {
    use super::*;

    #[test]
    fn completion_is_valued_over_contracted() {
        assert_eq!(completion_percentage(dec("1000"), dec("250")), dec("25.00"));
    }

    #[test]
    fn completion_is_uncapped() {
        // Over-measurement reports above 100
        assert_eq!(
            completion_percentage(dec("1000"), dec("1250")),
            dec("125.00")
        );
    }

    #[test]
    fn completion_without_boq_value_is_zero() {
        assert_eq!(completion_percentage(Decimal::ZERO, dec("500")), Decimal::ZERO);
    }

    #[test]
    fn project_progress_is_capped() {
        // The project record's progress field saturates at 100
        assert_eq!(capped_progress(dec("1000"), dec("1250")), dec("100"));
        assert_eq!(capped_progress(dec("1000"), dec("250")), dec("25.00"));
    }
}

mod financial_summary {
    use super::*;

    #[test]
    fn outstanding_is_valuations_less_payments() {
        let summary = ProjectFinancialSummary::compute(
            dec("10000"),
            dec("6000"),
            dec("500"),
            dec("4500"),
        );

        assert_eq!(summary.outstanding_amount, dec("1500"));
        assert_eq!(summary.completion_percentage, dec("60.00"));
        assert_eq!(summary.total_variations, dec("500"));
    }

    #[test]
    fn summary_handles_empty_project() {
        let summary = ProjectFinancialSummary::compute(
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        );

        assert_eq!(summary.outstanding_amount, Decimal::ZERO);
        assert_eq!(summary.completion_percentage, Decimal::ZERO);
    }
}

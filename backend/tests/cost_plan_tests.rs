//! Tests for cost plan calculations

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{CostPlan, CostPlanItem, DocStatus, DocumentStatus};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn plan(contingency: &str, overhead: &str, budget: &str, items: Vec<CostPlanItem>) -> CostPlan {
    CostPlan {
        id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        company: None,
        title: "Stage C estimate".to_string(),
        docstatus: DocStatus::Draft,
        status: DocumentStatus::Draft,
        total_estimated_cost: Decimal::ZERO,
        contingency_percentage: dec(contingency),
        contingency_amount: Decimal::ZERO,
        overhead_percentage: dec(overhead),
        overhead_amount: Decimal::ZERO,
        total_project_cost: Decimal::ZERO,
        approved_budget: dec(budget),
        budget_variance: Decimal::ZERO,
        items,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn estimate(quantity: &str, unit_rate: &str, market_rate: &str) -> CostPlanItem {
    CostPlanItem {
        id: Uuid::new_v4(),
        item_code: "STL-001".to_string(),
        item_name: None,
        description: None,
        uom: "t".to_string(),
        estimated_quantity: dec(quantity),
        unit_rate: dec(unit_rate),
        estimated_cost: Decimal::ZERO,
        market_rate: dec(market_rate),
        variance_percentage: Decimal::ZERO,
    }
}

mod item_calculations {
    use super::*;

    #[test]
    fn estimated_cost_is_quantity_times_rate() {
        let mut item = estimate("10", "250", "0");
        item.recalculate();
        assert_eq!(item.estimated_cost, dec("2500"));
    }

    #[test]
    fn variance_against_market_rate() {
        // paying 250 against a market rate of 200 is 25% over
        let mut item = estimate("10", "250", "200");
        item.recalculate();
        assert_eq!(item.variance_percentage, dec("25.00"));
    }

    #[test]
    fn below_market_variance_is_negative() {
        let mut item = estimate("10", "150", "200");
        item.recalculate();
        assert_eq!(item.variance_percentage, dec("-25.00"));
    }

    #[test]
    fn variance_needs_both_rates() {
        let mut item = estimate("10", "250", "0");
        item.recalculate();
        assert_eq!(item.variance_percentage, Decimal::ZERO);
    }
}

mod plan_totals {
    use super::*;

    #[test]
    fn contingency_overhead_and_total_project_cost() {
        let mut plan = plan("10", "5", "0", vec![estimate("10", "100", "0")]);
        plan.recalculate();

        assert_eq!(plan.total_estimated_cost, dec("1000"));
        assert_eq!(plan.contingency_amount, dec("100.00"));
        assert_eq!(plan.overhead_amount, dec("50.00"));
        assert_eq!(plan.total_project_cost, dec("1150.00"));
    }

    #[test]
    fn budget_variance_against_approved_budget() {
        let mut plan = plan("0", "0", "900", vec![estimate("10", "100", "0")]);
        plan.recalculate();

        // 100 over budget
        assert_eq!(plan.budget_variance, dec("100"));
    }

    #[test]
    fn under_budget_variance_is_negative() {
        let mut plan = plan("0", "0", "1200", vec![estimate("10", "100", "0")]);
        plan.recalculate();

        assert_eq!(plan.budget_variance, dec("-200"));
    }

    #[test]
    fn recalculate_is_idempotent() {
        let mut plan = plan("7.5", "2.5", "5000", vec![estimate("3.33", "99.99", "88")]);

        plan.recalculate();
        let first = (
            plan.total_estimated_cost,
            plan.contingency_amount,
            plan.overhead_amount,
            plan.total_project_cost,
            plan.budget_variance,
        );
        plan.recalculate();
        let second = (
            plan.total_estimated_cost,
            plan.contingency_amount,
            plan.overhead_amount,
            plan.total_project_cost,
            plan.budget_variance,
        );

        assert_eq!(first, second);
    }
}

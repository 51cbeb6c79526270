//! Cost plan models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::boq::line_amount;
use crate::types::{derive_status, percentage_of, round2, DocStatus, DocumentStatus};

/// Pre-contract cost estimate for a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostPlan {
    pub id: Uuid,
    pub project_id: Uuid,
    pub company: Option<String>,
    pub title: String,
    pub docstatus: DocStatus,
    pub status: DocumentStatus,
    pub total_estimated_cost: Decimal,
    pub contingency_percentage: Decimal,
    pub contingency_amount: Decimal,
    pub overhead_percentage: Decimal,
    pub overhead_amount: Decimal,
    pub total_project_cost: Decimal,
    pub approved_budget: Decimal,
    pub budget_variance: Decimal,
    pub items: Vec<CostPlanItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Estimated cost line with a market-rate comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostPlanItem {
    pub id: Uuid,
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub uom: String,
    pub estimated_quantity: Decimal,
    pub unit_rate: Decimal,
    pub estimated_cost: Decimal,
    pub market_rate: Decimal,
    pub variance_percentage: Decimal,
}

impl CostPlanItem {
    pub fn recalculate(&mut self) {
        if let Some(cost) = line_amount(self.estimated_quantity, self.unit_rate) {
            self.estimated_cost = cost;
        }

        if !self.unit_rate.is_zero() && !self.market_rate.is_zero() {
            self.variance_percentage = round2(
                (self.unit_rate - self.market_rate) / self.market_rate * Decimal::ONE_HUNDRED,
            );
        }
    }
}

impl CostPlan {
    /// Recompute item costs, contingency/overhead allowances, the total
    /// project cost and the variance against the approved budget.
    pub fn recalculate(&mut self) {
        let mut total_estimated = Decimal::ZERO;

        for item in &mut self.items {
            item.recalculate();
            if !item.estimated_cost.is_zero() {
                total_estimated += item.estimated_cost;
            }
        }

        self.total_estimated_cost = round2(total_estimated);

        if !self.contingency_percentage.is_zero() {
            self.contingency_amount =
                percentage_of(self.total_estimated_cost, self.contingency_percentage);
        }
        if !self.overhead_percentage.is_zero() {
            self.overhead_amount = percentage_of(self.total_estimated_cost, self.overhead_percentage);
        }

        self.total_project_cost =
            round2(self.total_estimated_cost + self.contingency_amount + self.overhead_amount);

        if !self.approved_budget.is_zero() && !self.total_project_cost.is_zero() {
            self.budget_variance = round2(self.total_project_cost - self.approved_budget);
        }
    }

    pub fn refresh_status(&mut self) {
        self.status = derive_status(self.docstatus, None);
    }
}

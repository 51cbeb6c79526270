//! Valuation models for tracking work progress and interim payments

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::boq::line_amount;
use crate::types::{derive_status, percentage_of, round2, DocStatus, DocumentStatus};

/// Periodic measurement of work completed, valued against BoQ rates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Valuation {
    pub id: Uuid,
    pub boq_id: Uuid,
    pub project_id: Uuid,
    pub company: Option<String>,
    pub valuation_date: NaiveDate,
    pub period: Option<String>,
    pub docstatus: DocStatus,
    pub status: DocumentStatus,
    /// Value of all work measured to date (cumulative amounts)
    pub total_work_done: Decimal,
    /// Value of work measured in this period only
    pub current_valuation: Decimal,
    pub cumulative_total: Decimal,
    /// Sum of current valuations of all other submitted valuations on the
    /// same BoQ; captured by the cross-document rollup
    pub previous_total: Decimal,
    pub retention_percentage: Decimal,
    pub retention_amount: Decimal,
    pub net_payable: Decimal,
    pub items: Vec<ValuationItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-item measurement on a valuation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationItem {
    pub id: Uuid,
    pub item_code: String,
    pub description: Option<String>,
    pub uom: String,
    pub previous_quantity: Decimal,
    pub current_quantity: Decimal,
    pub cumulative_quantity: Decimal,
    pub rate: Decimal,
    pub current_amount: Decimal,
    pub cumulative_amount: Decimal,
}

impl ValuationItem {
    /// Roll the period measurement into the cumulative figures.
    pub fn recalculate(&mut self) {
        if !self.previous_quantity.is_zero() && !self.current_quantity.is_zero() {
            self.cumulative_quantity = round2(self.previous_quantity + self.current_quantity);
        } else if !self.current_quantity.is_zero() {
            self.cumulative_quantity = self.current_quantity;
        }

        if let Some(amount) = line_amount(self.current_quantity, self.rate) {
            self.current_amount = amount;
        }
        if let Some(amount) = line_amount(self.cumulative_quantity, self.rate) {
            self.cumulative_amount = amount;
        }
    }
}

impl Valuation {
    /// Recompute item amounts, document totals, retention and net payable.
    pub fn recalculate(&mut self) {
        let mut total_work_done = Decimal::ZERO;
        let mut current_valuation = Decimal::ZERO;

        for item in &mut self.items {
            item.recalculate();

            if !item.current_quantity.is_zero() && !item.rate.is_zero() {
                current_valuation += item.current_amount;
            }
            if !item.cumulative_quantity.is_zero() && !item.rate.is_zero() {
                total_work_done += item.cumulative_amount;
            }
        }

        self.total_work_done = round2(total_work_done);
        self.current_valuation = round2(current_valuation);
        self.cumulative_total = self.total_work_done;

        self.calculate_retention();
    }

    fn calculate_retention(&mut self) {
        if !self.retention_percentage.is_zero() && !self.current_valuation.is_zero() {
            self.retention_amount = percentage_of(self.current_valuation, self.retention_percentage);
            self.net_payable = round2(self.current_valuation - self.retention_amount);
        } else {
            self.retention_amount = Decimal::ZERO;
            self.net_payable = self.current_valuation;
        }
    }

    pub fn refresh_status(&mut self) {
        self.status = derive_status(self.docstatus, None);
    }
}

/// Previous cumulative measurements per item code, aggregated over all other
/// submitted valuations on the same BoQ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviousItemTotals {
    pub item_code: String,
    pub previous_cumulative_quantity: Decimal,
    pub previous_cumulative_amount: Decimal,
}

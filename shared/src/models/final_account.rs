//! Final account models for project closure and cost reconciliation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::boq::line_amount;
use crate::types::{percentage_of, round2, DocStatus, DocumentStatus};

/// End-of-project reconciliation of original contract, variations and
/// actual measured quantities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAccount {
    pub id: Uuid,
    pub project_id: Uuid,
    pub contractor: String,
    pub account_date: NaiveDate,
    pub docstatus: DocStatus,
    pub status: DocumentStatus,
    pub original_contract_value: Decimal,
    /// Rollup over approved, submitted variation orders for the project
    pub approved_variations_total: Decimal,
    pub claims_amount: Decimal,
    pub contra_charges: Decimal,
    pub adjusted_contract_value: Decimal,
    pub work_done_to_date: Decimal,
    pub materials_on_site: Decimal,
    /// Rollup over submitted payment certificates for project + contractor
    pub previous_payments: Decimal,
    pub current_payment_due: Decimal,
    pub total_certified_value: Decimal,
    pub retention_percentage: Decimal,
    pub retention_amount: Decimal,
    pub net_amount_due: Decimal,
    pub vat_percentage: Decimal,
    pub vat_amount: Decimal,
    pub gross_amount_payable: Decimal,
    pub final_payment_amount: Decimal,
    pub items: Vec<FinalAccountItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Original-vs-final comparison for a single work item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAccountItem {
    pub id: Uuid,
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub uom: String,
    pub item_category: Option<String>,
    pub original_quantity: Decimal,
    pub original_rate: Decimal,
    pub original_amount: Decimal,
    pub final_quantity: Decimal,
    pub final_rate: Decimal,
    pub final_amount: Decimal,
    pub quantity_variance: Decimal,
    pub rate_variance: Decimal,
    pub amount_variance: Decimal,
}

impl FinalAccountItem {
    pub fn recalculate(&mut self) {
        if let Some(amount) = line_amount(self.final_quantity, self.final_rate) {
            self.final_amount = amount;
        }

        if !self.original_quantity.is_zero() && !self.final_quantity.is_zero() {
            self.quantity_variance = round2(self.final_quantity - self.original_quantity);
        }
        if !self.original_rate.is_zero() && !self.final_rate.is_zero() {
            self.rate_variance = round2(self.final_rate - self.original_rate);
        }
        if !self.original_amount.is_zero() && !self.final_amount.is_zero() {
            self.amount_variance = round2(self.final_amount - self.original_amount);
        }
    }
}

impl FinalAccount {
    /// Recompute the contract adjustments, payment summary and final
    /// payment figures. Rollup inputs (`approved_variations_total`,
    /// `previous_payments`) must already be captured on the document.
    pub fn recalculate(&mut self) {
        self.adjusted_contract_value = round2(
            self.original_contract_value + self.approved_variations_total + self.claims_amount
                - self.contra_charges,
        );

        let total_work_value = round2(self.work_done_to_date + self.materials_on_site);
        self.current_payment_due = round2(total_work_value - self.previous_payments);

        let mut total_certified = Decimal::ZERO;
        for item in &mut self.items {
            item.recalculate();
            if !item.final_amount.is_zero() {
                total_certified += item.final_amount;
            }
        }
        self.total_certified_value = round2(total_certified);

        if !self.retention_percentage.is_zero() {
            self.retention_amount =
                percentage_of(self.total_certified_value, self.retention_percentage);
        } else {
            self.retention_amount = Decimal::ZERO;
        }

        self.net_amount_due = round2(self.total_certified_value - self.retention_amount);

        if !self.vat_percentage.is_zero() {
            self.vat_amount = percentage_of(self.net_amount_due, self.vat_percentage);
        } else {
            self.vat_amount = Decimal::ZERO;
        }

        self.gross_amount_payable = round2(self.net_amount_due + self.vat_amount);
        self.final_payment_amount = round2(self.gross_amount_payable - self.previous_payments);
    }
}

/// Per-category original/final/variance breakdown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryVariance {
    pub original_amount: Decimal,
    pub final_amount: Decimal,
    pub variance: Decimal,
}

/// Cost variance analysis over a final account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAccountAnalysis {
    pub original_contract: Decimal,
    pub final_account: Decimal,
    pub total_variance: Decimal,
    pub variance_percentage: Decimal,
    pub category_breakdown: BTreeMap<String, CategoryVariance>,
}

impl FinalAccount {
    /// Original-vs-adjusted contract analysis with a per-category breakdown.
    pub fn cost_analysis(&self) -> FinalAccountAnalysis {
        let total_variance = round2(self.adjusted_contract_value - self.original_contract_value);
        let variance_percentage = if self.original_contract_value.is_zero() {
            Decimal::ZERO
        } else {
            round2(total_variance / self.original_contract_value * Decimal::ONE_HUNDRED)
        };

        let mut breakdown: BTreeMap<String, CategoryVariance> = BTreeMap::new();
        for item in &self.items {
            let category = item
                .item_category
                .clone()
                .unwrap_or_else(|| "Other".to_string());
            let entry = breakdown.entry(category).or_default();
            entry.original_amount = round2(entry.original_amount + item.original_amount);
            entry.final_amount = round2(entry.final_amount + item.final_amount);
            entry.variance = round2(entry.final_amount - entry.original_amount);
        }

        FinalAccountAnalysis {
            original_contract: self.original_contract_value,
            final_account: self.adjusted_contract_value,
            total_variance,
            variance_percentage,
            category_breakdown: breakdown,
        }
    }

    /// Final accounts track review/agreement after submission rather than a
    /// plain submitted label.
    pub fn refresh_status(&mut self) {
        self.status = match self.docstatus {
            DocStatus::Draft => DocumentStatus::Draft,
            DocStatus::Cancelled => DocumentStatus::Cancelled,
            DocStatus::Submitted => {
                if self.status == DocumentStatus::Agreed {
                    DocumentStatus::Agreed
                } else {
                    DocumentStatus::UnderReview
                }
            }
        };
    }
}

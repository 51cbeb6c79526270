//! Variation order models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{derive_status, round2, ApprovalStatus, DocStatus, DocumentStatus};

/// Formally approved change (addition or omission) to contracted scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationOrder {
    pub id: Uuid,
    pub boq_id: Uuid,
    pub project_id: Uuid,
    pub company: Option<String>,
    pub variation_type: VariationType,
    pub description: String,
    pub docstatus: DocStatus,
    pub status: DocumentStatus,
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<Uuid>,
    pub approved_on: Option<NaiveDate>,
    pub rejection_reason: Option<String>,
    pub original_contract_value: Decimal,
    pub total_variation_amount: Decimal,
    pub variation_percentage: Decimal,
    pub items: Vec<VariationItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Addition increases contracted scope; omission removes it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VariationType {
    Addition,
    Omission,
}

impl VariationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariationType::Addition => "addition",
            VariationType::Omission => "omission",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "addition" => Some(VariationType::Addition),
            "omission" => Some(VariationType::Omission),
            _ => None,
        }
    }
}

/// A varied line item; the amount carries the sign of the variation type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationItem {
    pub id: Uuid,
    pub item_code: String,
    pub description: Option<String>,
    pub uom: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub variation_type: VariationType,
    pub amount: Decimal,
}

impl VariationOrder {
    /// Recompute signed item amounts, the total variation amount, and the
    /// variation percentage against the original contract value.
    pub fn recalculate(&mut self) {
        let mut total = Decimal::ZERO;

        for item in &mut self.items {
            if item.quantity.is_zero() || item.rate.is_zero() {
                continue;
            }
            let magnitude = round2(item.quantity * item.rate).abs();
            item.amount = match item.variation_type {
                VariationType::Addition => magnitude,
                VariationType::Omission => -magnitude,
            };
            total += item.amount;
        }

        self.total_variation_amount = round2(total);

        if !self.original_contract_value.is_zero() && !self.total_variation_amount.is_zero() {
            self.variation_percentage = round2(
                self.total_variation_amount / self.original_contract_value
                    * Decimal::ONE_HUNDRED,
            );
        } else {
            self.variation_percentage = Decimal::ZERO;
        }
    }

    pub fn refresh_status(&mut self) {
        self.status = derive_status(self.docstatus, Some(self.approval_status));
    }
}

//! Bill of Quantities models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{derive_status, round2, DocStatus, DocumentStatus};

/// Bill of Quantities for a construction project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillOfQuantities {
    pub id: Uuid,
    pub project_id: Uuid,
    pub company: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub docstatus: DocStatus,
    pub status: DocumentStatus,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    pub items: Vec<BoqItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single work item on a BoQ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoqItem {
    pub id: Uuid,
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub uom: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    /// Element identifier when the item was produced by a BIM import
    pub bim_element_id: Option<String>,
    pub bim_element_type: Option<String>,
}

/// Derived line amount, or `None` when quantity or rate is absent.
///
/// When `None`, the caller leaves the previously stored amount untouched so
/// manually entered amounts survive recalculation.
pub fn line_amount(quantity: Decimal, rate: Decimal) -> Option<Decimal> {
    if quantity.is_zero() || rate.is_zero() {
        return None;
    }
    Some(round2(quantity * rate))
}

impl BillOfQuantities {
    /// Recompute line amounts and document totals in place.
    ///
    /// Idempotent: re-running on an already consistent document yields the
    /// same totals. Lines without both quantity and rate keep their stored
    /// amount and do not contribute to the totals.
    pub fn recalculate(&mut self) {
        let mut total_quantity = Decimal::ZERO;
        let mut total_amount = Decimal::ZERO;

        for item in &mut self.items {
            if let Some(amount) = line_amount(item.quantity, item.rate) {
                item.amount = amount;
                total_quantity += item.quantity;
                total_amount += item.amount;
            }
        }

        self.total_quantity = round2(total_quantity);
        self.total_amount = round2(total_amount);
    }

    pub fn refresh_status(&mut self) {
        self.status = derive_status(self.docstatus, None);
    }
}

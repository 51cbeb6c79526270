//! Construction item catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog item that BoQ, valuation and tender lines price against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionItem {
    pub item_code: String,
    pub item_name: String,
    pub description: Option<String>,
    pub item_group: String,
    pub uom: String,
    pub standard_rate: Decimal,
    pub material_type: Option<String>,
    /// Source element class when the item was created by a BIM import
    pub bim_element_type: Option<String>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Historic rate observation for an item on some document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRateHistoryEntry {
    pub rate: Decimal,
    pub quantity: Decimal,
    pub amount: Decimal,
    pub document_title: String,
    pub recorded_at: DateTime<Utc>,
}

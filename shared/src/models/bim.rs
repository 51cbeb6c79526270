//! BIM element mapping
//!
//! Maps already-deserialized building-model elements onto construction
//! items and selects the primary takeoff quantity per element class. File
//! parsing (IFC/DWG/spreadsheet) happens upstream; this module only sees
//! field-value records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A building element extracted from a BIM model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BimElement {
    pub element_id: String,
    /// Element class, e.g. "IFCWALL", "IFCSLAB"
    pub element_type: String,
    pub name: String,
    pub material: Option<String>,
    pub unit: Option<String>,
    /// Named quantities extracted from the model (area, length, volume, ...)
    pub quantities: BTreeMap<String, Decimal>,
    pub properties: BTreeMap<String, String>,
}

impl BimElement {
    fn quantity(&self, key: &str) -> Option<Decimal> {
        self.quantities.get(key).copied().filter(|q| !q.is_zero())
    }

    /// Primary takeoff quantity for the element.
    ///
    /// Walls measure by area before length; slabs and roofs by area before
    /// volume; beams and columns by length before volume; doors and
    /// windows by count (defaulting to one each).
    pub fn primary_quantity(&self) -> Decimal {
        let kind = self.element_type.to_ascii_uppercase();

        match kind.as_str() {
            "IFCWALL" | "IFCWALLSTANDARDCASE" => self
                .quantity("area")
                .or_else(|| self.quantity("length"))
                .or_else(|| self.quantity("quantity"))
                .unwrap_or(Decimal::ZERO),
            "IFCSLAB" | "IFCROOF" => self
                .quantity("area")
                .or_else(|| self.quantity("volume"))
                .or_else(|| self.quantity("quantity"))
                .unwrap_or(Decimal::ZERO),
            "IFCBEAM" | "IFCCOLUMN" => self
                .quantity("length")
                .or_else(|| self.quantity("volume"))
                .or_else(|| self.quantity("quantity"))
                .unwrap_or(Decimal::ZERO),
            "IFCDOOR" | "IFCWINDOW" => self
                .quantity("quantity")
                .or_else(|| self.quantity("area"))
                .unwrap_or(Decimal::ONE),
            _ => self
                .quantity("quantity")
                .or_else(|| self.quantity("area"))
                .or_else(|| self.quantity("volume"))
                .or_else(|| self.quantity("length"))
                .unwrap_or(Decimal::ONE),
        }
    }

    /// Unit of measure for the generated BoQ line.
    pub fn uom(&self) -> String {
        self.unit.clone().unwrap_or_else(|| "Nos".to_string())
    }
}

/// Candidate catalog item names for an element class, tried in order.
pub fn candidate_item_names(element_type: &str) -> &'static [&'static str] {
    match element_type.to_ascii_uppercase().as_str() {
        "IFCWALL" | "IFCWALLSTANDARDCASE" => &["WALL", "MASONRY", "CONCRETE WALL"],
        "IFCSLAB" => &["SLAB", "CONCRETE SLAB", "FLOOR SLAB"],
        "IFCBEAM" => &["BEAM", "CONCRETE BEAM", "STEEL BEAM"],
        "IFCCOLUMN" => &["COLUMN", "CONCRETE COLUMN", "STEEL COLUMN"],
        "IFCDOOR" => &["DOOR", "WOODEN DOOR", "STEEL DOOR"],
        "IFCWINDOW" => &["WINDOW", "GLASS WINDOW", "ALUMINUM WINDOW"],
        "IFCROOF" => &["ROOF", "ROOFING", "ROOF SLAB"],
        "IFCFOUNDATION" => &["FOUNDATION", "FOOTING", "CONCRETE FOUNDATION"],
        _ => &[],
    }
}

/// Material keywords tried when no element-class mapping matches.
pub fn material_keywords() -> &'static [&'static str] {
    &["concrete", "steel", "wood", "brick", "block"]
}

/// Keyword extracted from the element material, if any is recognized.
pub fn material_keyword(material: &str) -> Option<&'static str> {
    let lower = material.to_ascii_lowercase();
    material_keywords()
        .iter()
        .find(|keyword| lower.contains(**keyword))
        .copied()
}

/// Outcome of a BIM import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BimImportSummary {
    pub boq_id: uuid::Uuid,
    pub elements_received: usize,
    pub items_created: usize,
    pub elements_skipped: usize,
}

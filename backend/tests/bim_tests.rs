//! Tests for BIM element mapping and quantity takeoff

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use shared::{candidate_item_names, material_keyword, BimElement};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn element(element_type: &str, quantities: &[(&str, &str)]) -> BimElement {
    BimElement {
        element_id: "1001".to_string(),
        element_type: element_type.to_string(),
        name: format!("{}_1001", element_type),
        material: None,
        unit: None,
        quantities: quantities
            .iter()
            .map(|(k, v)| (k.to_string(), dec(v)))
            .collect(),
        properties: BTreeMap::new(),
    }
}

mod primary_quantity {
    use super::*;

    #[test]
    fn walls_measure_by_area_before_length() {
        let wall = element("IFCWALL", &[("area", "24.5"), ("length", "7")]);
        assert_eq!(wall.primary_quantity(), dec("24.5"));

        let wall_without_area = element("IFCWALL", &[("length", "7")]);
        assert_eq!(wall_without_area.primary_quantity(), dec("7"));
    }

    #[test]
    fn slabs_measure_by_area_before_volume() {
        let slab = element("IFCSLAB", &[("area", "120"), ("volume", "36")]);
        assert_eq!(slab.primary_quantity(), dec("120"));

        let slab_without_area = element("IFCSLAB", &[("volume", "36")]);
        assert_eq!(slab_without_area.primary_quantity(), dec("36"));
    }

    #[test]
    fn beams_and_columns_measure_by_length() {
        let beam = element("IFCBEAM", &[("length", "6"), ("volume", "0.72")]);
        assert_eq!(beam.primary_quantity(), dec("6"));

        let column = element("IFCCOLUMN", &[("volume", "0.9")]);
        assert_eq!(column.primary_quantity(), dec("0.9"));
    }

    #[test]
    fn doors_and_windows_default_to_one_each() {
        let door = element("IFCDOOR", &[]);
        assert_eq!(door.primary_quantity(), Decimal::ONE);

        let window = element("IFCWINDOW", &[("quantity", "4")]);
        assert_eq!(window.primary_quantity(), dec("4"));
    }

    #[test]
    fn unknown_elements_fall_back_through_the_priority_chain() {
        let generic = element("CUSTOMPART", &[("volume", "3")]);
        assert_eq!(generic.primary_quantity(), dec("3"));

        let bare = element("CUSTOMPART", &[]);
        assert_eq!(bare.primary_quantity(), Decimal::ONE);
    }

    #[test]
    fn walls_without_any_quantity_take_off_zero() {
        let wall = element("IFCWALL", &[]);
        assert_eq!(wall.primary_quantity(), Decimal::ZERO);
    }

    #[test]
    fn element_type_matching_ignores_case() {
        let wall = element("IfcWall", &[("area", "10")]);
        assert_eq!(wall.primary_quantity(), dec("10"));
    }
}

mod item_mapping {
    use super::*;

    #[test]
    fn known_element_classes_have_candidates() {
        assert_eq!(
            candidate_item_names("IFCWALL"),
            ["WALL", "MASONRY", "CONCRETE WALL"]
        );
        assert_eq!(
            candidate_item_names("ifcslab"),
            ["SLAB", "CONCRETE SLAB", "FLOOR SLAB"]
        );
        assert!(!candidate_item_names("IFCFOUNDATION").is_empty());
    }

    #[test]
    fn unknown_element_classes_have_no_candidates() {
        assert!(candidate_item_names("CUSTOMPART").is_empty());
    }

    #[test]
    fn material_keywords_are_recognized_within_descriptions() {
        assert_eq!(material_keyword("Reinforced Concrete C30"), Some("concrete"));
        assert_eq!(material_keyword("Structural STEEL S355"), Some("steel"));
        assert_eq!(material_keyword("gypsum plaster"), None);
    }

    #[test]
    fn uom_defaults_to_count() {
        let mut door = element("IFCDOOR", &[]);
        assert_eq!(door.uom(), "Nos");

        door.unit = Some("m2".to_string());
        assert_eq!(door.uom(), "m2");
    }
}

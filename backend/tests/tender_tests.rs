//! Tests for tender package and quote calculations

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{DocStatus, DocumentStatus, TenderPackage, TenderQuote, TenderQuoteItem};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn package(estimated_value: &str, bid_security: &str) -> TenderPackage {
    TenderPackage {
        id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        title: "Groundworks package".to_string(),
        description: None,
        docstatus: DocStatus::Draft,
        status: DocumentStatus::Draft,
        estimated_value: dec(estimated_value),
        publication_date: None,
        submission_deadline: None,
        opening_date: None,
        bid_security_percentage: dec(bid_security),
        bid_security_amount: Decimal::ZERO,
        total_quotes_received: 0,
        lowest_quote_amount: Decimal::ZERO,
        winning_contractor: None,
        winning_quote_amount: Decimal::ZERO,
        savings_percentage: Decimal::ZERO,
        award_date: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn quote(discount: &str, tax: &str, items: Vec<TenderQuoteItem>) -> TenderQuote {
    TenderQuote {
        id: Uuid::new_v4(),
        tender_package_id: Uuid::new_v4(),
        contractor: "Acme Construction".to_string(),
        docstatus: DocStatus::Draft,
        status: DocumentStatus::Draft,
        total_base_amount: Decimal::ZERO,
        discount_percentage: dec(discount),
        discount_amount: Decimal::ZERO,
        tax_percentage: dec(tax),
        tax_amount: Decimal::ZERO,
        total_quote_amount: Decimal::ZERO,
        technical_score: Decimal::ZERO,
        commercial_score: Decimal::ZERO,
        overall_score: Decimal::ZERO,
        validity_date: None,
        delivery_period_days: None,
        items,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn quote_line(quantity: &str, unit_rate: &str) -> TenderQuoteItem {
    TenderQuoteItem {
        id: Uuid::new_v4(),
        item_code: "EXC-001".to_string(),
        item_name: None,
        description: None,
        uom: "m3".to_string(),
        quantity: dec(quantity),
        unit_rate: dec(unit_rate),
        amount: Decimal::ZERO,
    }
}

mod quote_totals {
    use super::*;

    #[test]
    fn base_total_sums_priced_lines() {
        let mut quote = quote("0", "0", vec![quote_line("10", "100"), quote_line("5", "40")]);
        quote.recalculate();

        assert_eq!(quote.total_base_amount, dec("1200"));
        assert_eq!(quote.total_quote_amount, dec("1200"));
    }

    #[test]
    fn tax_applies_to_the_discounted_net() {
        // 1000 base, 10% discount -> 900 net, 20% tax on the net
        let mut quote = quote("10", "20", vec![quote_line("10", "100")]);
        quote.recalculate();

        assert_eq!(quote.discount_amount, dec("100.00"));
        assert_eq!(quote.tax_amount, dec("180.00"));
        assert_eq!(quote.total_quote_amount, dec("1080.00"));
    }

    #[test]
    fn unpriced_lines_do_not_contribute() {
        let mut quote = quote("0", "0", vec![quote_line("10", "0"), quote_line("2", "50")]);
        quote.recalculate();

        assert_eq!(quote.total_base_amount, dec("100"));
    }

    #[test]
    fn recalculate_is_idempotent() {
        let mut quote = quote("7.5", "12.5", vec![quote_line("3.33", "99.99")]);

        quote.recalculate();
        let first = (
            quote.total_base_amount,
            quote.discount_amount,
            quote.tax_amount,
            quote.total_quote_amount,
        );
        quote.recalculate();
        let second = (
            quote.total_base_amount,
            quote.discount_amount,
            quote.tax_amount,
            quote.total_quote_amount,
        );

        assert_eq!(first, second);
    }
}

mod evaluation_score {
    use super::*;

    #[test]
    fn overall_score_weighs_technical_sixty_forty() {
        let mut quote = quote("0", "0", vec![]);
        quote.technical_score = dec("90");
        quote.commercial_score = dec("70");
        quote.recalculate();

        // 90 * 0.6 + 70 * 0.4
        assert_eq!(quote.overall_score, dec("82.00"));
    }

    #[test]
    fn score_needs_both_components() {
        let mut quote = quote("0", "0", vec![]);
        quote.technical_score = dec("90");
        quote.recalculate();

        assert_eq!(quote.overall_score, Decimal::ZERO);
    }
}

mod package_figures {
    use super::*;

    #[test]
    fn bid_security_from_estimated_value() {
        let mut package = package("100000", "2.5");
        package.recalculate();

        assert_eq!(package.bid_security_amount, dec("2500.00"));
    }

    #[test]
    fn savings_against_winning_quote() {
        let mut package = package("100000", "0");
        package.winning_quote_amount = dec("92000");
        package.recalculate();

        assert_eq!(package.savings_percentage, dec("8.00"));
    }

    #[test]
    fn published_and_awarded_labels() {
        let mut package = package("0", "0");
        package.docstatus = DocStatus::Submitted;
        package.refresh_status();
        assert_eq!(package.status, DocumentStatus::Published);

        package.status = DocumentStatus::Awarded;
        package.refresh_status();
        assert_eq!(package.status, DocumentStatus::Awarded);

        package.docstatus = DocStatus::Cancelled;
        package.refresh_status();
        assert_eq!(package.status, DocumentStatus::Cancelled);
    }
}

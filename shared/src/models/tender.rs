//! Tender package and quote models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::boq::line_amount;
use crate::types::{derive_status, percentage_of, round2, DocStatus, DocumentStatus};

/// Technical weighting fixed by evaluation policy (60/40 split)
pub fn technical_weight() -> Decimal {
    Decimal::new(6, 1)
}

/// Commercial weighting fixed by evaluation policy (60/40 split)
pub fn commercial_weight() -> Decimal {
    Decimal::new(4, 1)
}

/// A package of work put out to tender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderPackage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub docstatus: DocStatus,
    pub status: DocumentStatus,
    pub estimated_value: Decimal,
    pub publication_date: Option<NaiveDate>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub opening_date: Option<NaiveDate>,
    pub bid_security_percentage: Decimal,
    pub bid_security_amount: Decimal,
    pub total_quotes_received: i32,
    pub lowest_quote_amount: Decimal,
    pub winning_contractor: Option<String>,
    pub winning_quote_amount: Decimal,
    pub savings_percentage: Decimal,
    pub award_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenderPackage {
    /// Recompute the bid security amount and savings vs the winning quote.
    pub fn recalculate(&mut self) {
        if !self.estimated_value.is_zero() && !self.bid_security_percentage.is_zero() {
            self.bid_security_amount =
                percentage_of(self.estimated_value, self.bid_security_percentage);
        }

        if !self.estimated_value.is_zero() && !self.winning_quote_amount.is_zero() {
            self.savings_percentage = round2(
                (self.estimated_value - self.winning_quote_amount) / self.estimated_value
                    * Decimal::ONE_HUNDRED,
            );
        }
    }

    /// Published on submission, awarded explicitly.
    pub fn refresh_status(&mut self) {
        self.status = match self.docstatus {
            DocStatus::Draft => DocumentStatus::Draft,
            DocStatus::Cancelled => DocumentStatus::Cancelled,
            DocStatus::Submitted => {
                if self.status == DocumentStatus::Awarded {
                    DocumentStatus::Awarded
                } else {
                    DocumentStatus::Published
                }
            }
        };
    }
}

/// A contractor's priced quote against a tender package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderQuote {
    pub id: Uuid,
    pub tender_package_id: Uuid,
    pub contractor: String,
    pub docstatus: DocStatus,
    pub status: DocumentStatus,
    pub total_base_amount: Decimal,
    pub discount_percentage: Decimal,
    pub discount_amount: Decimal,
    pub tax_percentage: Decimal,
    pub tax_amount: Decimal,
    pub total_quote_amount: Decimal,
    /// Technical compliance score (0-100)
    pub technical_score: Decimal,
    /// Commercial compliance score (0-100)
    pub commercial_score: Decimal,
    pub overall_score: Decimal,
    pub validity_date: Option<NaiveDate>,
    pub delivery_period_days: Option<i32>,
    pub items: Vec<TenderQuoteItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Quote line mirroring the BoQ item shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderQuoteItem {
    pub id: Uuid,
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub uom: String,
    pub quantity: Decimal,
    pub unit_rate: Decimal,
    pub amount: Decimal,
}

impl TenderQuote {
    /// Recompute line amounts, discount, tax on the discounted net, the
    /// final quote amount and the weighted evaluation score.
    pub fn recalculate(&mut self) {
        let mut total_base = Decimal::ZERO;

        for item in &mut self.items {
            if let Some(amount) = line_amount(item.quantity, item.unit_rate) {
                item.amount = amount;
                total_base += item.amount;
            }
        }

        self.total_base_amount = round2(total_base);

        if !self.discount_percentage.is_zero() {
            self.discount_amount = percentage_of(self.total_base_amount, self.discount_percentage);
        } else {
            self.discount_amount = Decimal::ZERO;
        }

        let net_amount = round2(self.total_base_amount - self.discount_amount);
        if !self.tax_percentage.is_zero() {
            self.tax_amount = percentage_of(net_amount, self.tax_percentage);
        } else {
            self.tax_amount = Decimal::ZERO;
        }

        self.total_quote_amount = round2(net_amount + self.tax_amount);

        self.calculate_overall_score();
    }

    fn calculate_overall_score(&mut self) {
        if self.technical_score.is_zero() || self.commercial_score.is_zero() {
            return;
        }
        self.overall_score = round2(
            self.technical_score * technical_weight()
                + self.commercial_score * commercial_weight(),
        );
    }

    pub fn refresh_status(&mut self) {
        self.status = derive_status(self.docstatus, None);
    }
}

/// Row of a quote comparison, sorted by amount ascending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteComparison {
    pub quote_id: Uuid,
    pub contractor: String,
    pub total_quote_amount: Decimal,
    pub overall_score: Decimal,
    pub validity_date: Option<NaiveDate>,
    pub delivery_period_days: Option<i32>,
}

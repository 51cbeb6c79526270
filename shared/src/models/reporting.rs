//! Cross-document rollup types and helpers

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{round2, DocStatus};

/// Minimal view of a document used by rollup sums: identity, submission
/// flag and the amount being aggregated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTotal {
    pub id: Uuid,
    pub docstatus: DocStatus,
    pub amount: Decimal,
}

/// Sum amounts over submitted documents, excluding one document.
///
/// Rollups that feed a document's own "previous total" must exclude that
/// document, even when it is already submitted, to avoid double-counting
/// on recomputation.
pub fn sum_submitted_excluding(documents: &[DocumentTotal], exclude: Option<Uuid>) -> Decimal {
    let total = documents
        .iter()
        .filter(|doc| doc.docstatus.is_submitted())
        .filter(|doc| Some(doc.id) != exclude)
        .map(|doc| doc.amount)
        .sum();
    round2(total)
}

/// Completion = valued amount / BoQ amount * 100, uncapped.
///
/// Over-measurement past the contract value reports above 100.
pub fn completion_percentage(boq_amount: Decimal, valued_amount: Decimal) -> Decimal {
    if boq_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round2(valued_amount / boq_amount * Decimal::ONE_HUNDRED)
}

/// Progress for the project record, capped at 100.
pub fn capped_progress(contract_value: Decimal, certified_amount: Decimal) -> Decimal {
    if contract_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round2(certified_amount / contract_value * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED)
}

/// Financial summary of a project across all document kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFinancialSummary {
    pub total_boq_value: Decimal,
    pub total_valuations: Decimal,
    pub total_variations: Decimal,
    pub total_payments: Decimal,
    pub outstanding_amount: Decimal,
    pub completion_percentage: Decimal,
}

impl ProjectFinancialSummary {
    pub fn compute(
        total_boq_value: Decimal,
        total_valuations: Decimal,
        total_variations: Decimal,
        total_payments: Decimal,
    ) -> Self {
        Self {
            total_boq_value,
            total_valuations,
            total_variations,
            total_payments,
            outstanding_amount: round2(total_valuations - total_payments),
            completion_percentage: completion_percentage(total_boq_value, total_valuations),
        }
    }
}

/// Per-project cost analysis row: plan vs contract vs certified work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAnalysisRow {
    pub cost_plan_id: Uuid,
    pub cost_plan_title: String,
    pub total_project_cost: Decimal,
    pub boq_total: Decimal,
    pub certified_total: Decimal,
}

/// Variation order counts and amounts grouped by approval outcome
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariationAnalysis {
    pub approved_count: i64,
    pub approved_amount: Decimal,
    pub pending_count: i64,
    pub pending_amount: Decimal,
    pub rejected_count: i64,
    pub rejected_amount: Decimal,
}

/// Valuation progress point for a BoQ (chart source)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationProgressPoint {
    pub valuation_id: Uuid,
    pub valuation_date: chrono::NaiveDate,
    pub current_valuation: Decimal,
    pub cumulative_total: Decimal,
    pub completion_percentage: Decimal,
}

/// Payment certificate summary row for a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCertificateSummaryRow {
    pub certificate_id: Uuid,
    pub certificate_date: chrono::NaiveDate,
    pub contractor: Option<String>,
    pub gross_amount: Decimal,
    pub retention_amount: Decimal,
    pub net_payment_amount: Decimal,
}

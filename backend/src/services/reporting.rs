//! Cross-document reporting service
//!
//! Read-only rollups over submitted documents. Filter semantics are
//! fixed: docstatus = 1 means submitted, != 2 means not cancelled.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{
    completion_percentage, round2, PaymentCertificateSummaryRow, ProjectFinancialSummary,
    ValuationProgressPoint, VariationAnalysis,
};

/// Service for dashboard and report queries
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// BoQ summary row for a project
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BoqSummaryRow {
    pub boq_id: Uuid,
    pub title: String,
    pub status: String,
    pub item_count: i64,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Financial summary of a project across all document kinds.
    ///
    /// Completion is uncapped: a project valued past its BoQ total reports
    /// above 100 percent.
    pub async fn project_financial_summary(
        &self,
        project_id: Uuid,
    ) -> AppResult<ProjectFinancialSummary> {
        self.ensure_project(project_id).await?;

        let boq_total = self
            .submitted_sum("SELECT SUM(total_amount) FROM boqs WHERE project_id = $1 AND docstatus = 1", project_id)
            .await?;
        let valuation_total = self
            .submitted_sum(
                "SELECT SUM(current_valuation) FROM valuations WHERE project_id = $1 AND docstatus = 1",
                project_id,
            )
            .await?;
        let variation_total = self
            .submitted_sum(
                "SELECT SUM(total_variation_amount) FROM variation_orders WHERE project_id = $1 AND docstatus = 1",
                project_id,
            )
            .await?;
        let payment_total = self
            .submitted_sum(
                "SELECT SUM(net_payment_amount) FROM payment_certificates WHERE project_id = $1 AND docstatus = 1",
                project_id,
            )
            .await?;

        Ok(ProjectFinancialSummary::compute(
            boq_total,
            valuation_total,
            variation_total,
            payment_total,
        ))
    }

    /// Per-BoQ totals for a project
    pub async fn boq_summary(&self, project_id: Uuid) -> AppResult<Vec<BoqSummaryRow>> {
        let rows = sqlx::query_as::<_, BoqSummaryRow>(
            r#"
            SELECT b.id AS boq_id, b.title, b.status,
                   COUNT(bi.id) AS item_count,
                   b.total_quantity, b.total_amount
            FROM boqs b
            LEFT JOIN boq_items bi ON bi.boq_id = b.id
            WHERE b.project_id = $1 AND b.docstatus != 2
            GROUP BY b.id, b.title, b.status, b.total_quantity, b.total_amount
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Valuation progress against a BoQ, ordered by date
    pub async fn valuation_progress(&self, boq_id: Uuid) -> AppResult<Vec<ValuationProgressPoint>> {
        let boq_amount = sqlx::query_scalar::<_, Decimal>(
            "SELECT total_amount FROM boqs WHERE id = $1",
        )
        .bind(boq_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("BoQ".to_string()))?;

        let rows = sqlx::query_as::<_, (Uuid, NaiveDate, Decimal, Decimal)>(
            r#"
            SELECT id, valuation_date, current_valuation, cumulative_total
            FROM valuations
            WHERE boq_id = $1 AND docstatus = 1
            ORDER BY valuation_date ASC, created_at ASC
            "#,
        )
        .bind(boq_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(valuation_id, valuation_date, current_valuation, cumulative_total)| {
                    ValuationProgressPoint {
                        valuation_id,
                        valuation_date,
                        current_valuation,
                        cumulative_total,
                        completion_percentage: completion_percentage(boq_amount, cumulative_total),
                    }
                },
            )
            .collect())
    }

    /// Variation orders grouped by approval outcome
    pub async fn variation_analysis(&self, project_id: Uuid) -> AppResult<VariationAnalysis> {
        let rows = sqlx::query_as::<_, (String, i64, Option<Decimal>)>(
            r#"
            SELECT approval_status, COUNT(*), SUM(total_variation_amount)
            FROM variation_orders
            WHERE project_id = $1 AND docstatus = 1
            GROUP BY approval_status
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        let mut analysis = VariationAnalysis::default();
        for (status, count, amount) in rows {
            let amount = round2(amount.unwrap_or_default());
            match status.as_str() {
                "approved" => {
                    analysis.approved_count = count;
                    analysis.approved_amount = amount;
                }
                "rejected" => {
                    analysis.rejected_count = count;
                    analysis.rejected_amount = amount;
                }
                _ => {
                    analysis.pending_count = count;
                    analysis.pending_amount = amount;
                }
            }
        }

        Ok(analysis)
    }

    /// Certificate rows for a project, newest first
    pub async fn payment_summary(
        &self,
        project_id: Uuid,
    ) -> AppResult<Vec<PaymentCertificateSummaryRow>> {
        let rows = sqlx::query_as::<_, (Uuid, NaiveDate, Option<String>, Decimal, Decimal, Decimal)>(
            r#"
            SELECT id, certificate_date, contractor, gross_amount, retention_amount,
                   net_payment_amount
            FROM payment_certificates
            WHERE project_id = $1 AND docstatus = 1
            ORDER BY certificate_date DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    certificate_id,
                    certificate_date,
                    contractor,
                    gross_amount,
                    retention_amount,
                    net_payment_amount,
                )| PaymentCertificateSummaryRow {
                    certificate_id,
                    certificate_date,
                    contractor,
                    gross_amount,
                    retention_amount,
                    net_payment_amount,
                },
            )
            .collect())
    }

    /// Export the financial summary as CSV
    pub async fn export_financial_summary_csv(&self, project_id: Uuid) -> AppResult<String> {
        let summary = self.project_financial_summary(project_id).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "total_boq_value",
                "total_valuations",
                "total_variations",
                "total_payments",
                "outstanding_amount",
                "completion_percentage",
            ])
            .map_err(|e| AppError::Internal(e.to_string()))?;
        writer
            .write_record([
                summary.total_boq_value.to_string(),
                summary.total_valuations.to_string(),
                summary.total_variations.to_string(),
                summary.total_payments.to_string(),
                summary.outstanding_amount.to_string(),
                summary.completion_percentage.to_string(),
            ])
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Export a BoQ's items as CSV
    pub async fn export_boq_csv(&self, boq_id: Uuid) -> AppResult<String> {
        let boq = crate::services::BoqService::new(self.db.clone())
            .get_boq(boq_id)
            .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["item_code", "item_name", "uom", "quantity", "rate", "amount"])
            .map_err(|e| AppError::Internal(e.to_string()))?;

        for item in &boq.items {
            writer
                .write_record([
                    item.item_code.clone(),
                    item.item_name.clone().unwrap_or_default(),
                    item.uom.clone(),
                    item.quantity.to_string(),
                    item.rate.to_string(),
                    item.amount.to_string(),
                ])
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
    }

    async fn submitted_sum(&self, sql: &str, project_id: Uuid) -> AppResult<Decimal> {
        let total = sqlx::query_scalar::<_, Option<Decimal>>(sql)
            .bind(project_id)
            .fetch_one(&self.db)
            .await?;
        Ok(round2(total.unwrap_or_default()))
    }

    async fn ensure_project(&self, project_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_one(&self.db)
            .await?;
        if exists == 0 {
            return Err(AppError::NotFound("Project".to_string()));
        }
        Ok(())
    }
}

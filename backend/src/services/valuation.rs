//! Valuation service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::{
    sum_submitted_excluding, DocStatus, DocumentStatus, DocumentTotal, PreviousItemTotals,
    Valuation, ValuationItem,
};

/// Service for periodic valuations of work done against a BoQ
#[derive(Clone)]
pub struct ValuationService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ValuationRow {
    id: Uuid,
    boq_id: Uuid,
    project_id: Uuid,
    company: Option<String>,
    valuation_date: NaiveDate,
    period: Option<String>,
    docstatus: i16,
    status: String,
    total_work_done: Decimal,
    current_valuation: Decimal,
    cumulative_total: Decimal,
    previous_total: Decimal,
    retention_percentage: Decimal,
    retention_amount: Decimal,
    net_payable: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ValuationItemRow {
    id: Uuid,
    item_code: String,
    description: Option<String>,
    uom: String,
    previous_quantity: Decimal,
    current_quantity: Decimal,
    cumulative_quantity: Decimal,
    rate: Decimal,
    current_amount: Decimal,
    cumulative_amount: Decimal,
}

impl ValuationRow {
    fn into_entity(self, items: Vec<ValuationItem>) -> Valuation {
        Valuation {
            id: self.id,
            boq_id: self.boq_id,
            project_id: self.project_id,
            company: self.company,
            valuation_date: self.valuation_date,
            period: self.period,
            docstatus: DocStatus::from_i16(self.docstatus).unwrap_or_default(),
            status: DocumentStatus::from_str(&self.status).unwrap_or(DocumentStatus::Draft),
            total_work_done: self.total_work_done,
            current_valuation: self.current_valuation,
            cumulative_total: self.cumulative_total,
            previous_total: self.previous_total,
            retention_percentage: self.retention_percentage,
            retention_amount: self.retention_amount,
            net_payable: self.net_payable,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<ValuationItemRow> for ValuationItem {
    fn from(row: ValuationItemRow) -> Self {
        ValuationItem {
            id: row.id,
            item_code: row.item_code,
            description: row.description,
            uom: row.uom,
            previous_quantity: row.previous_quantity,
            current_quantity: row.current_quantity,
            cumulative_quantity: row.cumulative_quantity,
            rate: row.rate,
            current_amount: row.current_amount,
            cumulative_amount: row.cumulative_amount,
        }
    }
}

/// Input for a valuation line
#[derive(Debug, Clone, Deserialize)]
pub struct ValuationItemInput {
    pub item_code: String,
    pub description: Option<String>,
    pub uom: String,
    #[serde(default)]
    pub previous_quantity: Decimal,
    #[serde(default)]
    pub current_quantity: Decimal,
    #[serde(default)]
    pub rate: Decimal,
}

/// Input for creating a valuation
#[derive(Debug, Deserialize)]
pub struct CreateValuationInput {
    pub boq_id: Uuid,
    pub valuation_date: NaiveDate,
    pub period: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub retention_percentage: Decimal,
    #[serde(default)]
    pub items: Vec<ValuationItemInput>,
}

/// Input for updating a draft valuation
#[derive(Debug, Deserialize)]
pub struct UpdateValuationInput {
    pub valuation_date: Option<NaiveDate>,
    pub period: Option<String>,
    pub retention_percentage: Option<Decimal>,
    pub items: Option<Vec<ValuationItemInput>>,
}

/// Valuation header for listings
#[derive(Debug, Serialize)]
pub struct ValuationSummary {
    pub id: Uuid,
    pub boq_id: Uuid,
    pub project_id: Uuid,
    pub valuation_date: NaiveDate,
    pub status: DocumentStatus,
    pub current_valuation: Decimal,
    pub net_payable: Decimal,
}

/// BoQ line exposed to valuation entry
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BoqItemForValuation {
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub uom: String,
    pub boq_quantity: Decimal,
    pub rate: Decimal,
    pub boq_amount: Decimal,
}

impl ValuationService {
    /// Create a new ValuationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a draft valuation against a BoQ
    pub async fn create_valuation(
        &self,
        user: &AuthUser,
        input: CreateValuationInput,
    ) -> AppResult<Valuation> {
        let boq = self.load_boq(input.boq_id).await?;

        shared::validate_retention_percentage(input.retention_percentage)
            .map_err(|msg| AppError::validation("retention_percentage", msg))?;

        let mut valuation = Valuation {
            id: Uuid::new_v4(),
            boq_id: input.boq_id,
            project_id: boq.project_id,
            company: input.company.or_else(|| user.company.clone()),
            valuation_date: input.valuation_date,
            period: input.period,
            docstatus: DocStatus::Draft,
            status: DocumentStatus::Draft,
            total_work_done: Decimal::ZERO,
            current_valuation: Decimal::ZERO,
            cumulative_total: Decimal::ZERO,
            previous_total: Decimal::ZERO,
            retention_percentage: input.retention_percentage,
            retention_amount: Decimal::ZERO,
            net_payable: Decimal::ZERO,
            items: input.items.into_iter().map(item_from_input).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        valuation.recalculate();
        valuation.previous_total = self.previous_total(valuation.boq_id, Some(valuation.id)).await?;
        valuation.refresh_status();

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO valuations (
                id, boq_id, project_id, company, valuation_date, period, docstatus,
                status, total_work_done, current_valuation, cumulative_total,
                previous_total, retention_percentage, retention_amount, net_payable
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(valuation.id)
        .bind(valuation.boq_id)
        .bind(valuation.project_id)
        .bind(&valuation.company)
        .bind(valuation.valuation_date)
        .bind(&valuation.period)
        .bind(valuation.docstatus.as_i16())
        .bind(valuation.status.as_str())
        .bind(valuation.total_work_done)
        .bind(valuation.current_valuation)
        .bind(valuation.cumulative_total)
        .bind(valuation.previous_total)
        .bind(valuation.retention_percentage)
        .bind(valuation.retention_amount)
        .bind(valuation.net_payable)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, valuation.id, &valuation.items).await?;

        tx.commit().await?;

        tracing::info!(
            "Created valuation {} against BoQ {}",
            valuation.id,
            valuation.boq_id
        );
        self.get_valuation(valuation.id).await
    }

    /// Get a valuation with its items
    pub async fn get_valuation(&self, valuation_id: Uuid) -> AppResult<Valuation> {
        let row = sqlx::query_as::<_, ValuationRow>(
            r#"
            SELECT id, boq_id, project_id, company, valuation_date, period, docstatus,
                   status, total_work_done, current_valuation, cumulative_total,
                   previous_total, retention_percentage, retention_amount, net_payable,
                   created_at, updated_at
            FROM valuations
            WHERE id = $1
            "#,
        )
        .bind(valuation_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Valuation".to_string()))?;

        let items = sqlx::query_as::<_, ValuationItemRow>(
            r#"
            SELECT id, item_code, description, uom, previous_quantity, current_quantity,
                   cumulative_quantity, rate, current_amount, cumulative_amount
            FROM valuation_items
            WHERE valuation_id = $1
            ORDER BY idx
            "#,
        )
        .bind(valuation_id)
        .fetch_all(&self.db)
        .await?;

        Ok(row.into_entity(items.into_iter().map(|r| r.into()).collect()))
    }

    /// List valuation headers, optionally by BoQ or project
    pub async fn list_valuations(
        &self,
        boq_id: Option<Uuid>,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<ValuationSummary>> {
        let rows = sqlx::query_as::<_, ValuationRow>(
            r#"
            SELECT id, boq_id, project_id, company, valuation_date, period, docstatus,
                   status, total_work_done, current_valuation, cumulative_total,
                   previous_total, retention_percentage, retention_amount, net_payable,
                   created_at, updated_at
            FROM valuations
            WHERE ($1::uuid IS NULL OR boq_id = $1)
              AND ($2::uuid IS NULL OR project_id = $2)
            ORDER BY valuation_date DESC, created_at DESC
            "#,
        )
        .bind(boq_id)
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ValuationSummary {
                id: row.id,
                boq_id: row.boq_id,
                project_id: row.project_id,
                valuation_date: row.valuation_date,
                status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Draft),
                current_valuation: row.current_valuation,
                net_payable: row.net_payable,
            })
            .collect())
    }

    /// Update a draft valuation
    pub async fn update_valuation(
        &self,
        _user: &AuthUser,
        valuation_id: Uuid,
        input: UpdateValuationInput,
    ) -> AppResult<Valuation> {
        let mut valuation = self.get_valuation(valuation_id).await?;

        if !valuation.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(
                "Only draft valuations can be modified".to_string(),
            ));
        }

        if let Some(date) = input.valuation_date {
            valuation.valuation_date = date;
        }
        if let Some(period) = input.period {
            valuation.period = Some(period);
        }
        if let Some(pct) = input.retention_percentage {
            shared::validate_retention_percentage(pct)
                .map_err(|msg| AppError::validation("retention_percentage", msg))?;
            valuation.retention_percentage = pct;
        }
        if let Some(items) = input.items {
            valuation.items = items.into_iter().map(item_from_input).collect();
        }

        valuation.recalculate();
        valuation.previous_total = self.previous_total(valuation.boq_id, Some(valuation.id)).await?;
        valuation.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &valuation).await?;
        sqlx::query("DELETE FROM valuation_items WHERE valuation_id = $1")
            .bind(valuation.id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, valuation.id, &valuation.items).await?;
        tx.commit().await?;

        self.get_valuation(valuation_id).await
    }

    /// Submit a draft valuation
    pub async fn submit_valuation(
        &self,
        _user: &AuthUser,
        valuation_id: Uuid,
    ) -> AppResult<Valuation> {
        let mut valuation = self.get_valuation(valuation_id).await?;

        if !valuation.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot submit valuation in state {}",
                valuation.docstatus
            )));
        }

        valuation.recalculate();
        valuation.previous_total = self.previous_total(valuation.boq_id, Some(valuation.id)).await?;
        valuation.docstatus = DocStatus::Submitted;
        valuation.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &valuation).await?;
        update_item_amounts(&mut tx, &valuation.items).await?;
        tx.commit().await?;

        tracing::info!("Submitted valuation {}", valuation.id);
        self.get_valuation(valuation_id).await
    }

    /// Cancel a submitted valuation; cancellation is terminal
    pub async fn cancel_valuation(
        &self,
        _user: &AuthUser,
        valuation_id: Uuid,
    ) -> AppResult<Valuation> {
        let mut valuation = self.get_valuation(valuation_id).await?;

        if !valuation.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot cancel valuation in state {}",
                valuation.docstatus
            )));
        }

        valuation.docstatus = DocStatus::Cancelled;
        valuation.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &valuation).await?;
        tx.commit().await?;

        tracing::info!("Cancelled valuation {}", valuation.id);
        self.get_valuation(valuation_id).await
    }

    /// BoQ lines with contract quantities and rates for valuation entry
    pub async fn boq_items_for_valuation(
        &self,
        boq_id: Uuid,
    ) -> AppResult<Vec<BoqItemForValuation>> {
        self.load_boq(boq_id).await?;

        let rows = sqlx::query_as::<_, BoqItemForValuation>(
            r#"
            SELECT item_code, item_name, description, uom,
                   quantity AS boq_quantity, rate, amount AS boq_amount
            FROM boq_items
            WHERE boq_id = $1
            ORDER BY idx
            "#,
        )
        .bind(boq_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Sum of current valuations over all other submitted valuations of the
    /// BoQ. The document under recomputation is excluded even when it is
    /// already submitted, to avoid double-counting.
    pub async fn previous_total(
        &self,
        boq_id: Uuid,
        exclude: Option<Uuid>,
    ) -> AppResult<Decimal> {
        let rows = sqlx::query_as::<_, (Uuid, i16, Decimal)>(
            r#"
            SELECT id, docstatus, current_valuation
            FROM valuations
            WHERE boq_id = $1
            "#,
        )
        .bind(boq_id)
        .fetch_all(&self.db)
        .await?;

        let totals: Vec<DocumentTotal> = rows
            .into_iter()
            .map(|(id, docstatus, amount)| DocumentTotal {
                id,
                docstatus: DocStatus::from_i16(docstatus).unwrap_or_default(),
                amount,
            })
            .collect();

        Ok(sum_submitted_excluding(&totals, exclude))
    }

    /// Previous cumulative measurements per item code over all other
    /// submitted valuations of the BoQ
    pub async fn previous_item_totals(
        &self,
        boq_id: Uuid,
        exclude: Option<Uuid>,
    ) -> AppResult<Vec<PreviousItemTotals>> {
        let rows = sqlx::query_as::<_, (String, Decimal, Decimal)>(
            r#"
            SELECT vi.item_code,
                   COALESCE(SUM(vi.cumulative_quantity), 0) AS previous_cumulative_quantity,
                   COALESCE(SUM(vi.cumulative_amount), 0) AS previous_cumulative_amount
            FROM valuation_items vi
            INNER JOIN valuations v ON v.id = vi.valuation_id
            WHERE v.boq_id = $1 AND v.docstatus = 1
              AND ($2::uuid IS NULL OR v.id != $2)
            GROUP BY vi.item_code
            "#,
        )
        .bind(boq_id)
        .bind(exclude)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(item_code, previous_cumulative_quantity, previous_cumulative_amount)| {
                    PreviousItemTotals {
                        item_code,
                        previous_cumulative_quantity,
                        previous_cumulative_amount,
                    }
                },
            )
            .collect())
    }

    /// Validate that the BoQ reference exists, returning its project
    async fn load_boq(&self, boq_id: Uuid) -> AppResult<BoqRef> {
        let project_id =
            sqlx::query_scalar::<_, Uuid>("SELECT project_id FROM boqs WHERE id = $1")
                .bind(boq_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::validation("boq_id", "BoQ is mandatory"))?;
        Ok(BoqRef { project_id })
    }

    async fn persist_header(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        valuation: &Valuation,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE valuations
            SET valuation_date = $2, period = $3, docstatus = $4, status = $5,
                total_work_done = $6, current_valuation = $7, cumulative_total = $8,
                previous_total = $9, retention_percentage = $10, retention_amount = $11,
                net_payable = $12, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(valuation.id)
        .bind(valuation.valuation_date)
        .bind(&valuation.period)
        .bind(valuation.docstatus.as_i16())
        .bind(valuation.status.as_str())
        .bind(valuation.total_work_done)
        .bind(valuation.current_valuation)
        .bind(valuation.cumulative_total)
        .bind(valuation.previous_total)
        .bind(valuation.retention_percentage)
        .bind(valuation.retention_amount)
        .bind(valuation.net_payable)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

struct BoqRef {
    project_id: Uuid,
}

fn item_from_input(input: ValuationItemInput) -> ValuationItem {
    ValuationItem {
        id: Uuid::new_v4(),
        item_code: input.item_code,
        description: input.description,
        uom: input.uom,
        previous_quantity: input.previous_quantity,
        current_quantity: input.current_quantity,
        cumulative_quantity: Decimal::ZERO,
        rate: input.rate,
        current_amount: Decimal::ZERO,
        cumulative_amount: Decimal::ZERO,
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    valuation_id: Uuid,
    items: &[ValuationItem],
) -> AppResult<()> {
    for (idx, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO valuation_items (
                id, valuation_id, idx, item_code, description, uom,
                previous_quantity, current_quantity, cumulative_quantity, rate,
                current_amount, cumulative_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(item.id)
        .bind(valuation_id)
        .bind(idx as i32)
        .bind(&item.item_code)
        .bind(&item.description)
        .bind(&item.uom)
        .bind(item.previous_quantity)
        .bind(item.current_quantity)
        .bind(item.cumulative_quantity)
        .bind(item.rate)
        .bind(item.current_amount)
        .bind(item.cumulative_amount)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn update_item_amounts(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    items: &[ValuationItem],
) -> AppResult<()> {
    for item in items {
        sqlx::query(
            r#"
            UPDATE valuation_items
            SET cumulative_quantity = $2, current_amount = $3, cumulative_amount = $4
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .bind(item.cumulative_quantity)
        .bind(item.current_amount)
        .bind(item.cumulative_amount)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

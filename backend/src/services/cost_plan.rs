//! Cost plan service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::boq::{BoqItemInput, BoqService, CreateBoqInput};
use shared::{CostAnalysisRow, CostPlan, CostPlanItem, DocStatus, DocumentStatus};

/// Service for pre-contract cost plans
#[derive(Clone)]
pub struct CostPlanService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct CostPlanRow {
    id: Uuid,
    project_id: Uuid,
    company: Option<String>,
    title: String,
    docstatus: i16,
    status: String,
    total_estimated_cost: Decimal,
    contingency_percentage: Decimal,
    contingency_amount: Decimal,
    overhead_percentage: Decimal,
    overhead_amount: Decimal,
    total_project_cost: Decimal,
    approved_budget: Decimal,
    budget_variance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CostPlanItemRow {
    id: Uuid,
    item_code: String,
    item_name: Option<String>,
    description: Option<String>,
    uom: String,
    estimated_quantity: Decimal,
    unit_rate: Decimal,
    estimated_cost: Decimal,
    market_rate: Decimal,
    variance_percentage: Decimal,
}

impl CostPlanRow {
    fn into_entity(self, items: Vec<CostPlanItem>) -> CostPlan {
        CostPlan {
            id: self.id,
            project_id: self.project_id,
            company: self.company,
            title: self.title,
            docstatus: DocStatus::from_i16(self.docstatus).unwrap_or_default(),
            status: DocumentStatus::from_str(&self.status).unwrap_or(DocumentStatus::Draft),
            total_estimated_cost: self.total_estimated_cost,
            contingency_percentage: self.contingency_percentage,
            contingency_amount: self.contingency_amount,
            overhead_percentage: self.overhead_percentage,
            overhead_amount: self.overhead_amount,
            total_project_cost: self.total_project_cost,
            approved_budget: self.approved_budget,
            budget_variance: self.budget_variance,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<CostPlanItemRow> for CostPlanItem {
    fn from(row: CostPlanItemRow) -> Self {
        CostPlanItem {
            id: row.id,
            item_code: row.item_code,
            item_name: row.item_name,
            description: row.description,
            uom: row.uom,
            estimated_quantity: row.estimated_quantity,
            unit_rate: row.unit_rate,
            estimated_cost: row.estimated_cost,
            market_rate: row.market_rate,
            variance_percentage: row.variance_percentage,
        }
    }
}

/// Input for a cost plan line
#[derive(Debug, Clone, Deserialize)]
pub struct CostPlanItemInput {
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub uom: String,
    #[serde(default)]
    pub estimated_quantity: Decimal,
    #[serde(default)]
    pub unit_rate: Decimal,
    #[serde(default)]
    pub market_rate: Decimal,
}

/// Input for creating a cost plan
#[derive(Debug, Deserialize)]
pub struct CreateCostPlanInput {
    pub project_id: Uuid,
    pub title: String,
    pub company: Option<String>,
    #[serde(default)]
    pub contingency_percentage: Decimal,
    #[serde(default)]
    pub overhead_percentage: Decimal,
    #[serde(default)]
    pub approved_budget: Decimal,
    #[serde(default)]
    pub items: Vec<CostPlanItemInput>,
}

/// Input for updating a draft cost plan
#[derive(Debug, Deserialize)]
pub struct UpdateCostPlanInput {
    pub title: Option<String>,
    pub contingency_percentage: Option<Decimal>,
    pub overhead_percentage: Option<Decimal>,
    pub approved_budget: Option<Decimal>,
    pub items: Option<Vec<CostPlanItemInput>>,
}

/// Cost plan header for listings
#[derive(Debug, Serialize)]
pub struct CostPlanSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub status: DocumentStatus,
    pub total_project_cost: Decimal,
    pub budget_variance: Decimal,
}

impl CostPlanService {
    /// Create a new CostPlanService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a draft cost plan
    pub async fn create_cost_plan(
        &self,
        user: &AuthUser,
        input: CreateCostPlanInput,
    ) -> AppResult<CostPlan> {
        self.validate_project(input.project_id).await?;

        if input.title.trim().is_empty() {
            return Err(AppError::validation("title", "Title is required"));
        }

        let mut plan = CostPlan {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            company: input.company.or_else(|| user.company.clone()),
            title: input.title,
            docstatus: DocStatus::Draft,
            status: DocumentStatus::Draft,
            total_estimated_cost: Decimal::ZERO,
            contingency_percentage: input.contingency_percentage,
            contingency_amount: Decimal::ZERO,
            overhead_percentage: input.overhead_percentage,
            overhead_amount: Decimal::ZERO,
            total_project_cost: Decimal::ZERO,
            approved_budget: input.approved_budget,
            budget_variance: Decimal::ZERO,
            items: input.items.into_iter().map(item_from_input).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        plan.recalculate();
        plan.refresh_status();

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO cost_plans (
                id, project_id, company, title, docstatus, status,
                total_estimated_cost, contingency_percentage, contingency_amount,
                overhead_percentage, overhead_amount, total_project_cost,
                approved_budget, budget_variance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(plan.id)
        .bind(plan.project_id)
        .bind(&plan.company)
        .bind(&plan.title)
        .bind(plan.docstatus.as_i16())
        .bind(plan.status.as_str())
        .bind(plan.total_estimated_cost)
        .bind(plan.contingency_percentage)
        .bind(plan.contingency_amount)
        .bind(plan.overhead_percentage)
        .bind(plan.overhead_amount)
        .bind(plan.total_project_cost)
        .bind(plan.approved_budget)
        .bind(plan.budget_variance)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, plan.id, &plan.items).await?;

        tx.commit().await?;

        tracing::info!("Created cost plan {} for project {}", plan.id, plan.project_id);
        self.get_cost_plan(plan.id).await
    }

    /// Get a cost plan with its items
    pub async fn get_cost_plan(&self, plan_id: Uuid) -> AppResult<CostPlan> {
        let row = sqlx::query_as::<_, CostPlanRow>(
            r#"
            SELECT id, project_id, company, title, docstatus, status,
                   total_estimated_cost, contingency_percentage, contingency_amount,
                   overhead_percentage, overhead_amount, total_project_cost,
                   approved_budget, budget_variance, created_at, updated_at
            FROM cost_plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Cost plan".to_string()))?;

        let items = sqlx::query_as::<_, CostPlanItemRow>(
            r#"
            SELECT id, item_code, item_name, description, uom, estimated_quantity,
                   unit_rate, estimated_cost, market_rate, variance_percentage
            FROM cost_plan_items
            WHERE cost_plan_id = $1
            ORDER BY idx
            "#,
        )
        .bind(plan_id)
        .fetch_all(&self.db)
        .await?;

        Ok(row.into_entity(items.into_iter().map(|r| r.into()).collect()))
    }

    /// List cost plan headers, optionally by project
    pub async fn list_cost_plans(
        &self,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<CostPlanSummary>> {
        let rows = sqlx::query_as::<_, CostPlanRow>(
            r#"
            SELECT id, project_id, company, title, docstatus, status,
                   total_estimated_cost, contingency_percentage, contingency_amount,
                   overhead_percentage, overhead_amount, total_project_cost,
                   approved_budget, budget_variance, created_at, updated_at
            FROM cost_plans
            WHERE ($1::uuid IS NULL OR project_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CostPlanSummary {
                id: row.id,
                project_id: row.project_id,
                title: row.title,
                status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Draft),
                total_project_cost: row.total_project_cost,
                budget_variance: row.budget_variance,
            })
            .collect())
    }

    /// Update a draft cost plan
    pub async fn update_cost_plan(
        &self,
        _user: &AuthUser,
        plan_id: Uuid,
        input: UpdateCostPlanInput,
    ) -> AppResult<CostPlan> {
        let mut plan = self.get_cost_plan(plan_id).await?;

        if !plan.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(
                "Only draft cost plans can be modified".to_string(),
            ));
        }

        if let Some(title) = input.title {
            plan.title = title;
        }
        if let Some(pct) = input.contingency_percentage {
            plan.contingency_percentage = pct;
        }
        if let Some(pct) = input.overhead_percentage {
            plan.overhead_percentage = pct;
        }
        if let Some(budget) = input.approved_budget {
            plan.approved_budget = budget;
        }
        if let Some(items) = input.items {
            plan.items = items.into_iter().map(item_from_input).collect();
        }

        plan.recalculate();
        plan.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &plan).await?;
        sqlx::query("DELETE FROM cost_plan_items WHERE cost_plan_id = $1")
            .bind(plan.id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, plan.id, &plan.items).await?;
        tx.commit().await?;

        self.get_cost_plan(plan_id).await
    }

    /// Submit a draft cost plan
    pub async fn submit_cost_plan(&self, _user: &AuthUser, plan_id: Uuid) -> AppResult<CostPlan> {
        let mut plan = self.get_cost_plan(plan_id).await?;

        if !plan.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot submit cost plan in state {}",
                plan.docstatus
            )));
        }

        plan.recalculate();
        plan.docstatus = DocStatus::Submitted;
        plan.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &plan).await?;
        tx.commit().await?;

        tracing::info!("Submitted cost plan {}", plan.id);
        self.get_cost_plan(plan_id).await
    }

    /// Cancel a submitted cost plan; cancellation is terminal
    pub async fn cancel_cost_plan(&self, _user: &AuthUser, plan_id: Uuid) -> AppResult<CostPlan> {
        let mut plan = self.get_cost_plan(plan_id).await?;

        if !plan.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot cancel cost plan in state {}",
                plan.docstatus
            )));
        }

        plan.docstatus = DocStatus::Cancelled;
        plan.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &plan).await?;
        tx.commit().await?;

        tracing::info!("Cancelled cost plan {}", plan.id);
        self.get_cost_plan(plan_id).await
    }

    /// Create a draft BoQ from a submitted cost plan
    pub async fn create_boq_from_cost_plan(
        &self,
        user: &AuthUser,
        plan_id: Uuid,
    ) -> AppResult<shared::BillOfQuantities> {
        let plan = self.get_cost_plan(plan_id).await?;

        if !plan.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(
                "Only submitted cost plans can be used to create a BoQ".to_string(),
            ));
        }

        let input = CreateBoqInput {
            project_id: plan.project_id,
            title: format!("BoQ from {}", plan.title),
            description: Some(format!("BoQ created from cost plan {}", plan.id)),
            company: plan.company.clone(),
            items: plan
                .items
                .iter()
                .map(|item| BoqItemInput {
                    item_code: item.item_code.clone(),
                    item_name: item.item_name.clone(),
                    description: item.description.clone(),
                    uom: item.uom.clone(),
                    quantity: item.estimated_quantity,
                    rate: item.unit_rate,
                    amount: item.estimated_cost,
                    bim_element_id: None,
                    bim_element_type: None,
                })
                .collect(),
        };

        BoqService::new(self.db.clone()).create_boq(user, input).await
    }

    /// Plan vs contract vs certified work for every submitted plan of the
    /// project
    pub async fn cost_analysis(&self, project_id: Uuid) -> AppResult<Vec<CostAnalysisRow>> {
        let rows = sqlx::query_as::<_, (Uuid, String, Decimal, Option<Decimal>, Option<Decimal>)>(
            r#"
            SELECT cp.id, cp.title, cp.total_project_cost,
                   (SELECT SUM(b.total_amount) FROM boqs b
                    WHERE b.project_id = cp.project_id AND b.docstatus = 1),
                   (SELECT SUM(v.current_valuation) FROM valuations v
                    WHERE v.project_id = cp.project_id AND v.docstatus = 1)
            FROM cost_plans cp
            WHERE cp.project_id = $1 AND cp.docstatus = 1
            ORDER BY cp.created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(cost_plan_id, cost_plan_title, total_project_cost, boq_total, certified_total)| {
                    CostAnalysisRow {
                        cost_plan_id,
                        cost_plan_title,
                        total_project_cost,
                        boq_total: boq_total.unwrap_or_default(),
                        certified_total: certified_total.unwrap_or_default(),
                    }
                },
            )
            .collect())
    }

    async fn validate_project(&self, project_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_one(&self.db)
            .await?;

        if exists == 0 {
            return Err(AppError::validation("project_id", "Project is mandatory"));
        }
        Ok(())
    }

    async fn persist_header(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        plan: &CostPlan,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE cost_plans
            SET title = $2, docstatus = $3, status = $4, total_estimated_cost = $5,
                contingency_percentage = $6, contingency_amount = $7,
                overhead_percentage = $8, overhead_amount = $9,
                total_project_cost = $10, approved_budget = $11, budget_variance = $12,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(plan.id)
        .bind(&plan.title)
        .bind(plan.docstatus.as_i16())
        .bind(plan.status.as_str())
        .bind(plan.total_estimated_cost)
        .bind(plan.contingency_percentage)
        .bind(plan.contingency_amount)
        .bind(plan.overhead_percentage)
        .bind(plan.overhead_amount)
        .bind(plan.total_project_cost)
        .bind(plan.approved_budget)
        .bind(plan.budget_variance)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn item_from_input(input: CostPlanItemInput) -> CostPlanItem {
    CostPlanItem {
        id: Uuid::new_v4(),
        item_code: input.item_code,
        item_name: input.item_name,
        description: input.description,
        uom: input.uom,
        estimated_quantity: input.estimated_quantity,
        unit_rate: input.unit_rate,
        estimated_cost: Decimal::ZERO,
        market_rate: input.market_rate,
        variance_percentage: Decimal::ZERO,
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    cost_plan_id: Uuid,
    items: &[CostPlanItem],
) -> AppResult<()> {
    for (idx, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO cost_plan_items (
                id, cost_plan_id, idx, item_code, item_name, description, uom,
                estimated_quantity, unit_rate, estimated_cost, market_rate,
                variance_percentage
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(item.id)
        .bind(cost_plan_id)
        .bind(idx as i32)
        .bind(&item.item_code)
        .bind(&item.item_name)
        .bind(&item.description)
        .bind(&item.uom)
        .bind(item.estimated_quantity)
        .bind(item.unit_rate)
        .bind(item.estimated_cost)
        .bind(item.market_rate)
        .bind(item.variance_percentage)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

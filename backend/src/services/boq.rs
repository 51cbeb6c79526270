//! Bill of Quantities service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::{BillOfQuantities, BoqItem, DocStatus, DocumentStatus};

/// Service for managing Bills of Quantities
#[derive(Clone)]
pub struct BoqService {
    db: PgPool,
}

/// Database row for a BoQ header
#[derive(Debug, sqlx::FromRow)]
struct BoqRow {
    id: Uuid,
    project_id: Uuid,
    company: Option<String>,
    title: String,
    description: Option<String>,
    docstatus: i16,
    status: String,
    total_quantity: Decimal,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Database row for a BoQ item
#[derive(Debug, sqlx::FromRow)]
struct BoqItemRow {
    id: Uuid,
    item_code: String,
    item_name: Option<String>,
    description: Option<String>,
    uom: String,
    quantity: Decimal,
    rate: Decimal,
    amount: Decimal,
    bim_element_id: Option<String>,
    bim_element_type: Option<String>,
}

impl BoqRow {
    fn into_entity(self, items: Vec<BoqItem>) -> BillOfQuantities {
        BillOfQuantities {
            id: self.id,
            project_id: self.project_id,
            company: self.company,
            title: self.title,
            description: self.description,
            docstatus: DocStatus::from_i16(self.docstatus).unwrap_or_default(),
            status: DocumentStatus::from_str(&self.status).unwrap_or(DocumentStatus::Draft),
            total_quantity: self.total_quantity,
            total_amount: self.total_amount,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<BoqItemRow> for BoqItem {
    fn from(row: BoqItemRow) -> Self {
        BoqItem {
            id: row.id,
            item_code: row.item_code,
            item_name: row.item_name,
            description: row.description,
            uom: row.uom,
            quantity: row.quantity,
            rate: row.rate,
            amount: row.amount,
            bim_element_id: row.bim_element_id,
            bim_element_type: row.bim_element_type,
        }
    }
}

/// Input for a BoQ line item
#[derive(Debug, Clone, Deserialize)]
pub struct BoqItemInput {
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub uom: String,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub rate: Decimal,
    /// Manually entered amount, kept when quantity or rate is missing
    #[serde(default)]
    pub amount: Decimal,
    pub bim_element_id: Option<String>,
    pub bim_element_type: Option<String>,
}

/// Input for creating a BoQ
#[derive(Debug, Deserialize)]
pub struct CreateBoqInput {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub items: Vec<BoqItemInput>,
}

/// Input for updating a draft BoQ
#[derive(Debug, Deserialize)]
pub struct UpdateBoqInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub items: Option<Vec<BoqItemInput>>,
}

/// BoQ header without line items, for listings
#[derive(Debug, Serialize)]
pub struct BoqSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub status: DocumentStatus,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl BoqService {
    /// Create a new BoqService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a draft BoQ with its line items
    pub async fn create_boq(
        &self,
        user: &AuthUser,
        input: CreateBoqInput,
    ) -> AppResult<BillOfQuantities> {
        self.validate_project(input.project_id).await?;

        if input.title.trim().is_empty() {
            return Err(AppError::validation("title", "Title is required"));
        }

        let mut boq = BillOfQuantities {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            company: input.company.or_else(|| user.company.clone()),
            title: input.title,
            description: input.description,
            docstatus: DocStatus::Draft,
            status: DocumentStatus::Draft,
            total_quantity: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            items: input.items.into_iter().map(item_from_input).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        boq.recalculate();
        boq.refresh_status();

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO boqs (
                id, project_id, company, title, description, docstatus, status,
                total_quantity, total_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(boq.id)
        .bind(boq.project_id)
        .bind(&boq.company)
        .bind(&boq.title)
        .bind(&boq.description)
        .bind(boq.docstatus.as_i16())
        .bind(boq.status.as_str())
        .bind(boq.total_quantity)
        .bind(boq.total_amount)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, boq.id, &boq.items).await?;

        tx.commit().await?;

        tracing::info!("Created BoQ {} for project {}", boq.id, boq.project_id);
        self.get_boq(boq.id).await
    }

    /// Get a BoQ with its items
    pub async fn get_boq(&self, boq_id: Uuid) -> AppResult<BillOfQuantities> {
        let row = sqlx::query_as::<_, BoqRow>(
            r#"
            SELECT id, project_id, company, title, description, docstatus, status,
                   total_quantity, total_amount, created_at, updated_at
            FROM boqs
            WHERE id = $1
            "#,
        )
        .bind(boq_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("BoQ".to_string()))?;

        let items = self.get_boq_items(boq_id).await?;
        Ok(row.into_entity(items))
    }

    /// List BoQ headers, optionally restricted to one project
    pub async fn list_boqs(&self, project_id: Option<Uuid>) -> AppResult<Vec<BoqSummary>> {
        let rows = sqlx::query_as::<_, BoqRow>(
            r#"
            SELECT id, project_id, company, title, description, docstatus, status,
                   total_quantity, total_amount, created_at, updated_at
            FROM boqs
            WHERE ($1::uuid IS NULL OR project_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| BoqSummary {
                id: row.id,
                project_id: row.project_id,
                title: row.title,
                status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Draft),
                total_quantity: row.total_quantity,
                total_amount: row.total_amount,
                created_at: row.created_at,
            })
            .collect())
    }

    /// Get the line items of a BoQ in entry order
    pub async fn get_boq_items(&self, boq_id: Uuid) -> AppResult<Vec<BoqItem>> {
        let rows = sqlx::query_as::<_, BoqItemRow>(
            r#"
            SELECT id, item_code, item_name, description, uom, quantity, rate, amount,
                   bim_element_id, bim_element_type
            FROM boq_items
            WHERE boq_id = $1
            ORDER BY idx
            "#,
        )
        .bind(boq_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Update a draft BoQ
    pub async fn update_boq(
        &self,
        _user: &AuthUser,
        boq_id: Uuid,
        input: UpdateBoqInput,
    ) -> AppResult<BillOfQuantities> {
        let mut boq = self.get_boq(boq_id).await?;

        if !boq.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(
                "Only draft BoQs can be modified".to_string(),
            ));
        }

        if let Some(title) = input.title {
            boq.title = title;
        }
        if let Some(description) = input.description {
            boq.description = Some(description);
        }
        if let Some(items) = input.items {
            boq.items = items.into_iter().map(item_from_input).collect();
        }

        boq.recalculate();
        boq.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &boq).await?;
        sqlx::query("DELETE FROM boq_items WHERE boq_id = $1")
            .bind(boq.id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, boq.id, &boq.items).await?;
        tx.commit().await?;

        self.get_boq(boq_id).await
    }

    /// Submit a draft BoQ, fixing its totals
    pub async fn submit_boq(&self, _user: &AuthUser, boq_id: Uuid) -> AppResult<BillOfQuantities> {
        let mut boq = self.get_boq(boq_id).await?;

        if !boq.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot submit BoQ in state {}",
                boq.docstatus
            )));
        }

        boq.recalculate();
        boq.docstatus = DocStatus::Submitted;
        boq.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &boq).await?;
        update_item_amounts(&mut tx, &boq.items).await?;
        tx.commit().await?;

        tracing::info!("Submitted BoQ {}", boq.id);
        self.get_boq(boq_id).await
    }

    /// Cancel a submitted BoQ; cancellation is terminal
    pub async fn cancel_boq(&self, _user: &AuthUser, boq_id: Uuid) -> AppResult<BillOfQuantities> {
        let mut boq = self.get_boq(boq_id).await?;

        if !boq.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot cancel BoQ in state {}",
                boq.docstatus
            )));
        }

        boq.docstatus = DocStatus::Cancelled;
        boq.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &boq).await?;
        tx.commit().await?;

        tracing::info!("Cancelled BoQ {}", boq.id);
        self.get_boq(boq_id).await
    }

    /// Duplicate a BoQ as a new draft with quantities and amounts reset
    pub async fn duplicate_boq(
        &self,
        user: &AuthUser,
        boq_id: Uuid,
    ) -> AppResult<BillOfQuantities> {
        let source = self.get_boq(boq_id).await?;

        let input = CreateBoqInput {
            project_id: source.project_id,
            title: format!("Copy of {}", source.title),
            description: source.description.clone(),
            company: source.company.clone(),
            items: source
                .items
                .iter()
                .map(|item| BoqItemInput {
                    item_code: item.item_code.clone(),
                    item_name: item.item_name.clone(),
                    description: item.description.clone(),
                    uom: item.uom.clone(),
                    quantity: Decimal::ZERO,
                    rate: item.rate,
                    amount: Decimal::ZERO,
                    bim_element_id: None,
                    bim_element_type: None,
                })
                .collect(),
        };

        self.create_boq(user, input).await
    }

    /// Validate that the referenced project exists
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
        boq: &BillOfQuantities,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE boqs
            SET title = $2, description = $3, docstatus = $4, status = $5,
                total_quantity = $6, total_amount = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(boq.id)
        .bind(&boq.title)
        .bind(&boq.description)
        .bind(boq.docstatus.as_i16())
        .bind(boq.status.as_str())
        .bind(boq.total_quantity)
        .bind(boq.total_amount)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn item_from_input(input: BoqItemInput) -> BoqItem {
    BoqItem {
        id: Uuid::new_v4(),
        item_code: input.item_code,
        item_name: input.item_name,
        description: input.description,
        uom: input.uom,
        quantity: input.quantity,
        rate: input.rate,
        amount: input.amount,
        bim_element_id: input.bim_element_id,
        bim_element_type: input.bim_element_type,
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    boq_id: Uuid,
    items: &[BoqItem],
) -> AppResult<()> {
    for (idx, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO boq_items (
                id, boq_id, idx, item_code, item_name, description, uom,
                quantity, rate, amount, bim_element_id, bim_element_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(item.id)
        .bind(boq_id)
        .bind(idx as i32)
        .bind(&item.item_code)
        .bind(&item.item_name)
        .bind(&item.description)
        .bind(&item.uom)
        .bind(item.quantity)
        .bind(item.rate)
        .bind(item.amount)
        .bind(&item.bim_element_id)
        .bind(&item.bim_element_type)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn update_item_amounts(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    items: &[BoqItem],
) -> AppResult<()> {
    for item in items {
        sqlx::query("UPDATE boq_items SET amount = $2 WHERE id = $1")
            .bind(item.id)
            .bind(item.amount)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

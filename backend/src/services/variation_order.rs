//! Variation order service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::notification::NotificationService;
use crate::services::soft;
use shared::{
    variation_approved_notification, variation_rejected_notification, ApprovalStatus, DocStatus,
    DocumentStatus, VariationItem, VariationOrder, VariationType,
};

/// Service for variation orders against a submitted BoQ
#[derive(Clone)]
pub struct VariationOrderService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct VariationRow {
    id: Uuid,
    boq_id: Uuid,
    project_id: Uuid,
    company: Option<String>,
    variation_type: String,
    description: String,
    docstatus: i16,
    status: String,
    approval_status: String,
    approved_by: Option<Uuid>,
    approved_on: Option<NaiveDate>,
    rejection_reason: Option<String>,
    original_contract_value: Decimal,
    total_variation_amount: Decimal,
    variation_percentage: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct VariationItemRow {
    id: Uuid,
    item_code: String,
    description: Option<String>,
    uom: String,
    quantity: Decimal,
    rate: Decimal,
    variation_type: String,
    amount: Decimal,
}

impl VariationRow {
    fn into_entity(self, items: Vec<VariationItem>) -> VariationOrder {
        VariationOrder {
            id: self.id,
            boq_id: self.boq_id,
            project_id: self.project_id,
            company: self.company,
            variation_type: VariationType::from_str(&self.variation_type)
                .unwrap_or(VariationType::Addition),
            description: self.description,
            docstatus: DocStatus::from_i16(self.docstatus).unwrap_or_default(),
            status: DocumentStatus::from_str(&self.status).unwrap_or(DocumentStatus::Draft),
            approval_status: ApprovalStatus::from_str(&self.approval_status).unwrap_or_default(),
            approved_by: self.approved_by,
            approved_on: self.approved_on,
            rejection_reason: self.rejection_reason,
            original_contract_value: self.original_contract_value,
            total_variation_amount: self.total_variation_amount,
            variation_percentage: self.variation_percentage,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<VariationItemRow> for VariationItem {
    fn from(row: VariationItemRow) -> Self {
        VariationItem {
            id: row.id,
            item_code: row.item_code,
            description: row.description,
            uom: row.uom,
            quantity: row.quantity,
            rate: row.rate,
            variation_type: VariationType::from_str(&row.variation_type)
                .unwrap_or(VariationType::Addition),
            amount: row.amount,
        }
    }
}

/// Input for a variation line
#[derive(Debug, Clone, Deserialize)]
pub struct VariationItemInput {
    pub item_code: String,
    pub description: Option<String>,
    pub uom: String,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub rate: Decimal,
    pub variation_type: VariationType,
}

/// Input for creating a variation order
#[derive(Debug, Deserialize)]
pub struct CreateVariationInput {
    pub boq_id: Uuid,
    pub project_id: Uuid,
    pub company: Option<String>,
    pub variation_type: Option<VariationType>,
    pub description: Option<String>,
    #[serde(default)]
    pub original_contract_value: Decimal,
    #[serde(default)]
    pub items: Vec<VariationItemInput>,
}

/// Input for updating a draft variation order
#[derive(Debug, Deserialize)]
pub struct UpdateVariationInput {
    pub description: Option<String>,
    pub original_contract_value: Option<Decimal>,
    pub items: Option<Vec<VariationItemInput>>,
}

/// Variation order header for listings
#[derive(Debug, Serialize)]
pub struct VariationSummary {
    pub id: Uuid,
    pub boq_id: Uuid,
    pub project_id: Uuid,
    pub status: DocumentStatus,
    pub approval_status: ApprovalStatus,
    pub total_variation_amount: Decimal,
    pub variation_percentage: Decimal,
}

impl VariationOrderService {
    /// Create a new VariationOrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a draft variation order
    pub async fn create_variation(
        &self,
        user: &AuthUser,
        input: CreateVariationInput,
    ) -> AppResult<VariationOrder> {
        let variation_type = input
            .variation_type
            .ok_or_else(|| AppError::validation("variation_type", "Variation type is mandatory"))?;
        let description = input
            .description
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| AppError::validation("description", "Description is mandatory"))?;

        self.validate_boq_and_project(input.boq_id, input.project_id)
            .await?;

        let mut variation = VariationOrder {
            id: Uuid::new_v4(),
            boq_id: input.boq_id,
            project_id: input.project_id,
            company: input.company.or_else(|| user.company.clone()),
            variation_type,
            description,
            docstatus: DocStatus::Draft,
            status: DocumentStatus::Draft,
            approval_status: ApprovalStatus::Pending,
            approved_by: None,
            approved_on: None,
            rejection_reason: None,
            original_contract_value: input.original_contract_value,
            total_variation_amount: Decimal::ZERO,
            variation_percentage: Decimal::ZERO,
            items: input.items.into_iter().map(item_from_input).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        variation.recalculate();
        variation.refresh_status();

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO variation_orders (
                id, boq_id, project_id, company, variation_type, description,
                docstatus, status, approval_status, original_contract_value,
                total_variation_amount, variation_percentage
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(variation.id)
        .bind(variation.boq_id)
        .bind(variation.project_id)
        .bind(&variation.company)
        .bind(variation.variation_type.as_str())
        .bind(&variation.description)
        .bind(variation.docstatus.as_i16())
        .bind(variation.status.as_str())
        .bind(variation.approval_status.as_str())
        .bind(variation.original_contract_value)
        .bind(variation.total_variation_amount)
        .bind(variation.variation_percentage)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, variation.id, &variation.items).await?;

        tx.commit().await?;

        tracing::info!(
            "Created variation order {} against BoQ {}",
            variation.id,
            variation.boq_id
        );
        self.get_variation(variation.id).await
    }

    /// Get a variation order with its items
    pub async fn get_variation(&self, variation_id: Uuid) -> AppResult<VariationOrder> {
        let row = sqlx::query_as::<_, VariationRow>(
            r#"
            SELECT id, boq_id, project_id, company, variation_type, description,
                   docstatus, status, approval_status, approved_by, approved_on,
                   rejection_reason, original_contract_value, total_variation_amount,
                   variation_percentage, created_at, updated_at
            FROM variation_orders
            WHERE id = $1
            "#,
        )
        .bind(variation_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Variation order".to_string()))?;

        let items = sqlx::query_as::<_, VariationItemRow>(
            r#"
            SELECT id, item_code, description, uom, quantity, rate, variation_type, amount
            FROM variation_items
            WHERE variation_order_id = $1
            ORDER BY idx
            "#,
        )
        .bind(variation_id)
        .fetch_all(&self.db)
        .await?;

        Ok(row.into_entity(items.into_iter().map(|r| r.into()).collect()))
    }

    /// List variation order headers, optionally by project
    pub async fn list_variations(
        &self,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<VariationSummary>> {
        let rows = sqlx::query_as::<_, VariationRow>(
            r#"
            SELECT id, boq_id, project_id, company, variation_type, description,
                   docstatus, status, approval_status, approved_by, approved_on,
                   rejection_reason, original_contract_value, total_variation_amount,
                   variation_percentage, created_at, updated_at
            FROM variation_orders
            WHERE ($1::uuid IS NULL OR project_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| VariationSummary {
                id: row.id,
                boq_id: row.boq_id,
                project_id: row.project_id,
                status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Draft),
                approval_status: ApprovalStatus::from_str(&row.approval_status)
                    .unwrap_or_default(),
                total_variation_amount: row.total_variation_amount,
                variation_percentage: row.variation_percentage,
            })
            .collect())
    }

    /// Update a draft variation order
    pub async fn update_variation(
        &self,
        _user: &AuthUser,
        variation_id: Uuid,
        input: UpdateVariationInput,
    ) -> AppResult<VariationOrder> {
        let mut variation = self.get_variation(variation_id).await?;

        if !variation.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(
                "Only draft variation orders can be modified".to_string(),
            ));
        }

        if let Some(description) = input.description {
            if description.trim().is_empty() {
                return Err(AppError::validation("description", "Description is mandatory"));
            }
            variation.description = description;
        }
        if let Some(value) = input.original_contract_value {
            variation.original_contract_value = value;
        }
        if let Some(items) = input.items {
            variation.items = items.into_iter().map(item_from_input).collect();
        }

        variation.recalculate();
        variation.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &variation).await?;
        sqlx::query("DELETE FROM variation_items WHERE variation_order_id = $1")
            .bind(variation.id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, variation.id, &variation.items).await?;
        tx.commit().await?;

        self.get_variation(variation_id).await
    }

    /// Submit a draft variation order; approval stays pending
    pub async fn submit_variation(
        &self,
        _user: &AuthUser,
        variation_id: Uuid,
    ) -> AppResult<VariationOrder> {
        let mut variation = self.get_variation(variation_id).await?;

        if !variation.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot submit variation order in state {}",
                variation.docstatus
            )));
        }

        self.validate_boq_and_project(variation.boq_id, variation.project_id)
            .await?;

        variation.recalculate();
        variation.docstatus = DocStatus::Submitted;
        variation.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &variation).await?;
        update_item_amounts(&mut tx, &variation.items).await?;
        tx.commit().await?;

        tracing::info!("Submitted variation order {}", variation.id);
        self.get_variation(variation_id).await
    }

    /// Cancel a submitted variation order; cancellation is terminal
    pub async fn cancel_variation(
        &self,
        _user: &AuthUser,
        variation_id: Uuid,
    ) -> AppResult<VariationOrder> {
        let mut variation = self.get_variation(variation_id).await?;

        if !variation.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot cancel variation order in state {}",
                variation.docstatus
            )));
        }

        variation.docstatus = DocStatus::Cancelled;
        variation.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &variation).await?;
        tx.commit().await?;

        tracing::info!("Cancelled variation order {}", variation.id);
        self.get_variation(variation_id).await
    }

    /// Approve a submitted variation order exactly once
    pub async fn approve_variation(
        &self,
        user: &AuthUser,
        variation_id: Uuid,
    ) -> AppResult<VariationOrder> {
        let mut variation = self.get_variation(variation_id).await?;

        if !variation.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(
                "Only submitted variation orders can be approved".to_string(),
            ));
        }
        if variation.approval_status == ApprovalStatus::Approved {
            return Err(AppError::Conflict(
                "Variation order is already approved".to_string(),
            ));
        }

        variation.approval_status = ApprovalStatus::Approved;
        variation.approved_by = Some(user.user_id);
        variation.approved_on = Some(Utc::now().date_naive());
        variation.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &variation).await?;
        tx.commit().await?;

        tracing::info!("Approved variation order {}", variation.id);

        soft(
            "Sending approval notification",
            self.notify_decision(&variation, None).await,
        );

        self.get_variation(variation_id).await
    }

    /// Reject a submitted variation order exactly once
    pub async fn reject_variation(
        &self,
        user: &AuthUser,
        variation_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<VariationOrder> {
        let mut variation = self.get_variation(variation_id).await?;

        if !variation.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(
                "Only submitted variation orders can be rejected".to_string(),
            ));
        }
        if variation.approval_status == ApprovalStatus::Rejected {
            return Err(AppError::Conflict(
                "Variation order is already rejected".to_string(),
            ));
        }

        variation.approval_status = ApprovalStatus::Rejected;
        variation.approved_by = Some(user.user_id);
        variation.approved_on = Some(Utc::now().date_naive());
        variation.rejection_reason = reason.clone();
        variation.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &variation).await?;
        tx.commit().await?;

        tracing::info!("Rejected variation order {}", variation.id);

        soft(
            "Sending rejection notification",
            self.notify_decision(&variation, reason.as_deref()).await,
        );

        self.get_variation(variation_id).await
    }

    /// BoQ items available for pricing a variation
    pub async fn boq_items_for_variation(
        &self,
        boq_id: Uuid,
    ) -> AppResult<Vec<shared::BoqItem>> {
        crate::services::BoqService::new(self.db.clone())
            .get_boq_items(boq_id)
            .await
    }

    /// BoQ must exist and be submitted; project must match the BoQ project
    async fn validate_boq_and_project(&self, boq_id: Uuid, project_id: Uuid) -> AppResult<()> {
        let boq = sqlx::query_as::<_, (Uuid, i16, Uuid)>(
            "SELECT id, docstatus, project_id FROM boqs WHERE id = $1",
        )
        .bind(boq_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::validation("boq_id", "BoQ is mandatory"))?;

        if boq.1 != DocStatus::Submitted.as_i16() {
            return Err(AppError::validation("boq_id", "Referenced BoQ must be submitted"));
        }

        if boq.2 != project_id {
            return Err(AppError::validation(
                "project_id",
                "Project must match the BoQ project",
            ));
        }

        Ok(())
    }

    /// Notify the project manager of an approval decision
    async fn notify_decision(
        &self,
        variation: &VariationOrder,
        rejection_reason: Option<&str>,
    ) -> AppResult<()> {
        let project = sqlx::query_as::<_, (String, Option<String>)>(
            "SELECT name, manager_email FROM projects WHERE id = $1",
        )
        .bind(variation.project_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

        let Some(recipient) = project.1 else {
            return Ok(());
        };

        let message = match variation.approval_status {
            ApprovalStatus::Approved => {
                variation_approved_notification(&recipient, variation.id, &project.0)
            }
            ApprovalStatus::Rejected => variation_rejected_notification(
                &recipient,
                variation.id,
                &project.0,
                rejection_reason,
            ),
            ApprovalStatus::Pending => return Ok(()),
        };

        NotificationService::new(self.db.clone()).queue(message).await?;
        Ok(())
    }

    async fn persist_header(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        variation: &VariationOrder,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE variation_orders
            SET description = $2, docstatus = $3, status = $4, approval_status = $5,
                approved_by = $6, approved_on = $7, rejection_reason = $8,
                original_contract_value = $9, total_variation_amount = $10,
                variation_percentage = $11, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(variation.id)
        .bind(&variation.description)
        .bind(variation.docstatus.as_i16())
        .bind(variation.status.as_str())
        .bind(variation.approval_status.as_str())
        .bind(variation.approved_by)
        .bind(variation.approved_on)
        .bind(&variation.rejection_reason)
        .bind(variation.original_contract_value)
        .bind(variation.total_variation_amount)
        .bind(variation.variation_percentage)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn item_from_input(input: VariationItemInput) -> VariationItem {
    VariationItem {
        id: Uuid::new_v4(),
        item_code: input.item_code,
        description: input.description,
        uom: input.uom,
        quantity: input.quantity,
        rate: input.rate,
        variation_type: input.variation_type,
        amount: Decimal::ZERO,
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    variation_order_id: Uuid,
    items: &[VariationItem],
) -> AppResult<()> {
    for (idx, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO variation_items (
                id, variation_order_id, idx, item_code, description, uom,
                quantity, rate, variation_type, amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(item.id)
        .bind(variation_order_id)
        .bind(idx as i32)
        .bind(&item.item_code)
        .bind(&item.description)
        .bind(&item.uom)
        .bind(item.quantity)
        .bind(item.rate)
        .bind(item.variation_type.as_str())
        .bind(item.amount)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn update_item_amounts(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    items: &[VariationItem],
) -> AppResult<()> {
    for item in items {
        sqlx::query("UPDATE variation_items SET amount = $2 WHERE id = $1")
            .bind(item.id)
            .bind(item.amount)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

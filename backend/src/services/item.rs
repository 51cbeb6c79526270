//! Construction item catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::{ConstructionItem, ItemRateHistoryEntry};

/// Service for the construction item catalog
#[derive(Clone)]
pub struct ItemService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    item_code: String,
    item_name: String,
    description: Option<String>,
    item_group: String,
    uom: String,
    standard_rate: Decimal,
    material_type: Option<String>,
    bim_element_type: Option<String>,
    disabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for ConstructionItem {
    fn from(row: ItemRow) -> Self {
        ConstructionItem {
            item_code: row.item_code,
            item_name: row.item_name,
            description: row.description,
            item_group: row.item_group,
            uom: row.uom,
            standard_rate: row.standard_rate,
            material_type: row.material_type,
            bim_element_type: row.bim_element_type,
            disabled: row.disabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a catalog item
#[derive(Debug, Deserialize)]
pub struct CreateItemInput {
    pub item_code: String,
    pub item_name: String,
    pub description: Option<String>,
    pub item_group: Option<String>,
    pub uom: String,
    #[serde(default)]
    pub standard_rate: Decimal,
    pub material_type: Option<String>,
}

impl ItemService {
    /// Create a new ItemService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a catalog item
    pub async fn create_item(
        &self,
        _user: &AuthUser,
        input: CreateItemInput,
    ) -> AppResult<ConstructionItem> {
        shared::validate_item_code(&input.item_code)
            .map_err(|msg| AppError::validation("item_code", msg))?;

        if input.item_name.trim().is_empty() {
            return Err(AppError::validation("item_name", "Item name is required"));
        }

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM construction_items WHERE item_code = $1")
                .bind(&input.item_code)
                .fetch_one(&self.db)
                .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("item_code".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO construction_items (
                item_code, item_name, description, item_group, uom, standard_rate,
                material_type, disabled
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE)
            "#,
        )
        .bind(&input.item_code)
        .bind(&input.item_name)
        .bind(&input.description)
        .bind(
            input
                .item_group
                .as_deref()
                .unwrap_or("Construction Materials"),
        )
        .bind(&input.uom)
        .bind(input.standard_rate)
        .bind(&input.material_type)
        .execute(&self.db)
        .await?;

        self.get_item(&input.item_code).await
    }

    /// Get a catalog item by code
    pub async fn get_item(&self, item_code: &str) -> AppResult<ConstructionItem> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT item_code, item_name, description, item_group, uom, standard_rate,
                   material_type, bim_element_type, disabled, created_at, updated_at
            FROM construction_items
            WHERE item_code = $1
            "#,
        )
        .bind(item_code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        Ok(row.into())
    }

    /// List enabled catalog items
    pub async fn list_items(&self) -> AppResult<Vec<ConstructionItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT item_code, item_name, description, item_group, uom, standard_rate,
                   material_type, bim_element_type, disabled, created_at, updated_at
            FROM construction_items
            WHERE disabled = FALSE
            ORDER BY item_code
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Rate history for an item from BoQ lines, newest first
    pub async fn rate_history(
        &self,
        item_code: &str,
        project_id: Option<Uuid>,
        limit: i64,
    ) -> AppResult<Vec<ItemRateHistoryEntry>> {
        let rows = sqlx::query_as::<_, (Decimal, Decimal, Decimal, String, DateTime<Utc>)>(
            r#"
            SELECT bi.rate, bi.quantity, bi.amount, b.title, b.created_at
            FROM boq_items bi
            INNER JOIN boqs b ON b.id = bi.boq_id
            WHERE bi.item_code = $1
              AND ($2::uuid IS NULL OR b.project_id = $2)
            ORDER BY b.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(item_code)
        .bind(project_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(rate, quantity, amount, document_title, recorded_at)| {
                ItemRateHistoryEntry {
                    rate,
                    quantity,
                    amount,
                    document_title,
                    recorded_at,
                }
            })
            .collect())
    }
}

//! BIM import service
//!
//! Maps already-deserialized building elements onto catalog items and
//! produces a draft BoQ. Elements arrive as field-value records; file
//! parsing happens upstream of this service.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::boq::{BoqItemInput, BoqService, CreateBoqInput};
use shared::{candidate_item_names, material_keyword, BimElement, BimImportSummary};

/// Service for BIM element import
#[derive(Clone)]
pub struct BimService {
    db: PgPool,
}

/// Input for a BIM import
#[derive(Debug, Deserialize)]
pub struct BimImportInput {
    pub project_id: Uuid,
    /// Label of the upstream source, e.g. "IFC Import"
    pub import_source: String,
    pub elements: Vec<BimElement>,
}

impl BimService {
    /// Create a new BimService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a draft BoQ from extracted building elements.
    ///
    /// Elements with no usable quantity are skipped; elements with no
    /// catalog match get a generated generic item.
    pub async fn import_elements(
        &self,
        user: &AuthUser,
        input: BimImportInput,
    ) -> AppResult<BimImportSummary> {
        if input.elements.is_empty() {
            return Err(AppError::ValidationError(
                "No elements to import".to_string(),
            ));
        }

        let elements_received = input.elements.len();
        let mut items = Vec::new();
        let mut skipped = 0;

        for element in &input.elements {
            let quantity = element.primary_quantity();
            if quantity.is_zero() {
                skipped += 1;
                continue;
            }

            let item_code = self.map_element_to_item(element).await?;
            let rate = self.standard_rate(&item_code).await?;

            items.push(BoqItemInput {
                item_code,
                item_name: Some(element.name.clone()),
                description: Some(format!("{}: {}", element.element_type, element.name)),
                uom: element.uom(),
                quantity,
                rate,
                amount: Decimal::ZERO,
                bim_element_id: Some(element.element_id.clone()),
                bim_element_type: Some(element.element_type.clone()),
            });
        }

        if items.is_empty() {
            return Err(AppError::ValidationError(
                "No elements carried a usable quantity".to_string(),
            ));
        }

        let items_created = items.len();

        let boq = BoqService::new(self.db.clone())
            .create_boq(
                user,
                CreateBoqInput {
                    project_id: input.project_id,
                    title: format!("BIM Import - {}", input.import_source),
                    description: Some(format!(
                        "Automatically generated from {}",
                        input.import_source
                    )),
                    company: user.company.clone(),
                    items,
                },
            )
            .await?;

        tracing::info!(
            "BIM import created BoQ {} with {} items ({} elements skipped)",
            boq.id,
            items_created,
            skipped
        );

        Ok(BimImportSummary {
            boq_id: boq.id,
            elements_received,
            items_created,
            elements_skipped: skipped,
        })
    }

    /// Map an element to a catalog item: candidate names by element class
    /// first, then material keywords, then a generated generic item.
    async fn map_element_to_item(&self, element: &BimElement) -> AppResult<String> {
        for candidate in candidate_item_names(&element.element_type) {
            if let Some(code) = self.find_item_like(candidate).await? {
                return Ok(code);
            }
        }

        if let Some(keyword) = element.material.as_deref().and_then(material_keyword) {
            if let Some(code) = self.find_item_like(keyword).await? {
                return Ok(code);
            }
        }

        self.create_generic_item(element).await
    }

    /// First enabled catalog item whose name matches the pattern
    async fn find_item_like(&self, pattern: &str) -> AppResult<Option<String>> {
        let code = sqlx::query_scalar::<_, String>(
            r#"
            SELECT item_code
            FROM construction_items
            WHERE item_name ILIKE '%' || $1 || '%' AND disabled = FALSE
            ORDER BY item_code
            LIMIT 1
            "#,
        )
        .bind(pattern)
        .fetch_optional(&self.db)
        .await?;

        Ok(code)
    }

    /// Create a generic catalog item for an unmapped element
    async fn create_generic_item(&self, element: &BimElement) -> AppResult<String> {
        let element_type = element.element_type.to_ascii_uppercase();
        let suffix = Uuid::new_v4().simple().to_string();
        let item_code = format!("BIM-{}-{}", element_type, &suffix[..5].to_uppercase());

        sqlx::query(
            r#"
            INSERT INTO construction_items (
                item_code, item_name, description, item_group, uom, standard_rate,
                material_type, bim_element_type, disabled
            )
            VALUES ($1, $2, $3, 'Construction Materials', $4, 0, $5, $6, FALSE)
            ON CONFLICT (item_code) DO NOTHING
            "#,
        )
        .bind(&item_code)
        .bind(format!("{}: {}", element_type, element.name))
        .bind(format!("Imported from BIM model: {}", element_type))
        .bind(element.uom())
        .bind(&element.material)
        .bind(&element_type)
        .execute(&self.db)
        .await?;

        Ok(item_code)
    }

    async fn standard_rate(&self, item_code: &str) -> AppResult<Decimal> {
        let rate = sqlx::query_scalar::<_, Decimal>(
            "SELECT standard_rate FROM construction_items WHERE item_code = $1",
        )
        .bind(item_code)
        .fetch_optional(&self.db)
        .await?;

        Ok(rate.unwrap_or_default())
    }
}

//! Tender package and quote service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::{
    DocStatus, DocumentStatus, QuoteComparison, TenderPackage, TenderQuote, TenderQuoteItem,
};

/// Service for tender packages and contractor quotes
#[derive(Clone)]
pub struct TenderService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    project_id: Uuid,
    title: String,
    description: Option<String>,
    docstatus: i16,
    status: String,
    estimated_value: Decimal,
    publication_date: Option<NaiveDate>,
    submission_deadline: Option<DateTime<Utc>>,
    opening_date: Option<NaiveDate>,
    bid_security_percentage: Decimal,
    bid_security_amount: Decimal,
    total_quotes_received: i32,
    lowest_quote_amount: Decimal,
    winning_contractor: Option<String>,
    winning_quote_amount: Decimal,
    savings_percentage: Decimal,
    award_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PackageRow> for TenderPackage {
    fn from(row: PackageRow) -> Self {
        TenderPackage {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            docstatus: DocStatus::from_i16(row.docstatus).unwrap_or_default(),
            status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Draft),
            estimated_value: row.estimated_value,
            publication_date: row.publication_date,
            submission_deadline: row.submission_deadline,
            opening_date: row.opening_date,
            bid_security_percentage: row.bid_security_percentage,
            bid_security_amount: row.bid_security_amount,
            total_quotes_received: row.total_quotes_received,
            lowest_quote_amount: row.lowest_quote_amount,
            winning_contractor: row.winning_contractor,
            winning_quote_amount: row.winning_quote_amount,
            savings_percentage: row.savings_percentage,
            award_date: row.award_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: Uuid,
    tender_package_id: Uuid,
    contractor: String,
    docstatus: i16,
    status: String,
    total_base_amount: Decimal,
    discount_percentage: Decimal,
    discount_amount: Decimal,
    tax_percentage: Decimal,
    tax_amount: Decimal,
    total_quote_amount: Decimal,
    technical_score: Decimal,
    commercial_score: Decimal,
    overall_score: Decimal,
    validity_date: Option<NaiveDate>,
    delivery_period_days: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct QuoteItemRow {
    id: Uuid,
    item_code: String,
    item_name: Option<String>,
    description: Option<String>,
    uom: String,
    quantity: Decimal,
    unit_rate: Decimal,
    amount: Decimal,
}

impl QuoteRow {
    fn into_entity(self, items: Vec<TenderQuoteItem>) -> TenderQuote {
        TenderQuote {
            id: self.id,
            tender_package_id: self.tender_package_id,
            contractor: self.contractor,
            docstatus: DocStatus::from_i16(self.docstatus).unwrap_or_default(),
            status: DocumentStatus::from_str(&self.status).unwrap_or(DocumentStatus::Draft),
            total_base_amount: self.total_base_amount,
            discount_percentage: self.discount_percentage,
            discount_amount: self.discount_amount,
            tax_percentage: self.tax_percentage,
            tax_amount: self.tax_amount,
            total_quote_amount: self.total_quote_amount,
            technical_score: self.technical_score,
            commercial_score: self.commercial_score,
            overall_score: self.overall_score,
            validity_date: self.validity_date,
            delivery_period_days: self.delivery_period_days,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<QuoteItemRow> for TenderQuoteItem {
    fn from(row: QuoteItemRow) -> Self {
        TenderQuoteItem {
            id: row.id,
            item_code: row.item_code,
            item_name: row.item_name,
            description: row.description,
            uom: row.uom,
            quantity: row.quantity,
            unit_rate: row.unit_rate,
            amount: row.amount,
        }
    }
}

/// Input for creating a tender package
#[derive(Debug, Deserialize)]
pub struct CreatePackageInput {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_value: Decimal,
    pub publication_date: Option<NaiveDate>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub opening_date: Option<NaiveDate>,
    #[serde(default)]
    pub bid_security_percentage: Decimal,
}

/// Input for updating a draft tender package
#[derive(Debug, Deserialize)]
pub struct UpdatePackageInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_value: Option<Decimal>,
    pub publication_date: Option<NaiveDate>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub opening_date: Option<NaiveDate>,
    pub bid_security_percentage: Option<Decimal>,
}

/// Input for a quote line
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteItemInput {
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub uom: String,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_rate: Decimal,
}

/// Input for creating a tender quote
#[derive(Debug, Deserialize)]
pub struct CreateQuoteInput {
    pub tender_package_id: Uuid,
    pub contractor: String,
    #[serde(default)]
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub tax_percentage: Decimal,
    #[serde(default)]
    pub technical_score: Decimal,
    #[serde(default)]
    pub commercial_score: Decimal,
    pub validity_date: Option<NaiveDate>,
    pub delivery_period_days: Option<i32>,
    #[serde(default)]
    pub items: Vec<QuoteItemInput>,
}

/// Input for updating a draft tender quote
#[derive(Debug, Deserialize)]
pub struct UpdateQuoteInput {
    pub discount_percentage: Option<Decimal>,
    pub tax_percentage: Option<Decimal>,
    pub technical_score: Option<Decimal>,
    pub commercial_score: Option<Decimal>,
    pub validity_date: Option<NaiveDate>,
    pub delivery_period_days: Option<i32>,
    pub items: Option<Vec<QuoteItemInput>>,
}

/// Package header for listings
#[derive(Debug, Serialize)]
pub struct PackageSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub status: DocumentStatus,
    pub estimated_value: Decimal,
    pub total_quotes_received: i32,
    pub winning_contractor: Option<String>,
}

impl TenderService {
    /// Create a new TenderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Tender packages
    // ------------------------------------------------------------------

    /// Create a draft tender package
    pub async fn create_package(
        &self,
        _user: &AuthUser,
        input: CreatePackageInput,
    ) -> AppResult<TenderPackage> {
        self.validate_project(input.project_id).await?;

        if input.title.trim().is_empty() {
            return Err(AppError::validation("title", "Title is required"));
        }

        let mut package = TenderPackage {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            title: input.title,
            description: input.description,
            docstatus: DocStatus::Draft,
            status: DocumentStatus::Draft,
            estimated_value: input.estimated_value,
            publication_date: input.publication_date,
            submission_deadline: input.submission_deadline,
            opening_date: input.opening_date,
            bid_security_percentage: input.bid_security_percentage,
            bid_security_amount: Decimal::ZERO,
            total_quotes_received: 0,
            lowest_quote_amount: Decimal::ZERO,
            winning_contractor: None,
            winning_quote_amount: Decimal::ZERO,
            savings_percentage: Decimal::ZERO,
            award_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        validate_package_dates(&package)?;
        package.recalculate();
        package.refresh_status();

        sqlx::query(
            r#"
            INSERT INTO tender_packages (
                id, project_id, title, description, docstatus, status,
                estimated_value, publication_date, submission_deadline, opening_date,
                bid_security_percentage, bid_security_amount, total_quotes_received,
                lowest_quote_amount, winning_quote_amount, savings_percentage
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(package.id)
        .bind(package.project_id)
        .bind(&package.title)
        .bind(&package.description)
        .bind(package.docstatus.as_i16())
        .bind(package.status.as_str())
        .bind(package.estimated_value)
        .bind(package.publication_date)
        .bind(package.submission_deadline)
        .bind(package.opening_date)
        .bind(package.bid_security_percentage)
        .bind(package.bid_security_amount)
        .bind(package.total_quotes_received)
        .bind(package.lowest_quote_amount)
        .bind(package.winning_quote_amount)
        .bind(package.savings_percentage)
        .execute(&self.db)
        .await?;

        tracing::info!("Created tender package {}", package.id);
        self.get_package(package.id).await
    }

    /// Get a tender package by ID
    pub async fn get_package(&self, package_id: Uuid) -> AppResult<TenderPackage> {
        let row = sqlx::query_as::<_, PackageRow>(
            r#"
            SELECT id, project_id, title, description, docstatus, status,
                   estimated_value, publication_date, submission_deadline, opening_date,
                   bid_security_percentage, bid_security_amount, total_quotes_received,
                   lowest_quote_amount, winning_contractor, winning_quote_amount,
                   savings_percentage, award_date, created_at, updated_at
            FROM tender_packages
            WHERE id = $1
            "#,
        )
        .bind(package_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tender package".to_string()))?;

        Ok(row.into())
    }

    /// List package headers, optionally by project
    pub async fn list_packages(&self, project_id: Option<Uuid>) -> AppResult<Vec<PackageSummary>> {
        let rows = sqlx::query_as::<_, PackageRow>(
            r#"
            SELECT id, project_id, title, description, docstatus, status,
                   estimated_value, publication_date, submission_deadline, opening_date,
                   bid_security_percentage, bid_security_amount, total_quotes_received,
                   lowest_quote_amount, winning_contractor, winning_quote_amount,
                   savings_percentage, award_date, created_at, updated_at
            FROM tender_packages
            WHERE ($1::uuid IS NULL OR project_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PackageSummary {
                id: row.id,
                project_id: row.project_id,
                title: row.title,
                status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Draft),
                estimated_value: row.estimated_value,
                total_quotes_received: row.total_quotes_received,
                winning_contractor: row.winning_contractor,
            })
            .collect())
    }

    /// Update a draft tender package
    pub async fn update_package(
        &self,
        _user: &AuthUser,
        package_id: Uuid,
        input: UpdatePackageInput,
    ) -> AppResult<TenderPackage> {
        let mut package = self.get_package(package_id).await?;

        if !package.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(
                "Only draft tender packages can be modified".to_string(),
            ));
        }

        if let Some(title) = input.title {
            package.title = title;
        }
        if let Some(description) = input.description {
            package.description = Some(description);
        }
        if let Some(value) = input.estimated_value {
            package.estimated_value = value;
        }
        if let Some(date) = input.publication_date {
            package.publication_date = Some(date);
        }
        if let Some(deadline) = input.submission_deadline {
            package.submission_deadline = Some(deadline);
        }
        if let Some(date) = input.opening_date {
            package.opening_date = Some(date);
        }
        if let Some(pct) = input.bid_security_percentage {
            package.bid_security_percentage = pct;
        }

        validate_package_dates(&package)?;
        package.recalculate();
        package.refresh_status();
        self.persist_package(&package).await?;

        self.get_package(package_id).await
    }

    /// Publish a draft tender package
    pub async fn submit_package(
        &self,
        _user: &AuthUser,
        package_id: Uuid,
    ) -> AppResult<TenderPackage> {
        let mut package = self.get_package(package_id).await?;

        if !package.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot publish tender package in state {}",
                package.docstatus
            )));
        }

        validate_package_dates(&package)?;
        package.recalculate();
        package.docstatus = DocStatus::Submitted;
        package.refresh_status();
        self.persist_package(&package).await?;

        tracing::info!("Published tender package {}", package.id);
        self.get_package(package_id).await
    }

    /// Cancel a published tender package; cancellation is terminal
    pub async fn cancel_package(
        &self,
        _user: &AuthUser,
        package_id: Uuid,
    ) -> AppResult<TenderPackage> {
        let mut package = self.get_package(package_id).await?;

        if !package.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot cancel tender package in state {}",
                package.docstatus
            )));
        }

        package.docstatus = DocStatus::Cancelled;
        package.refresh_status();
        self.persist_package(&package).await?;

        tracing::info!("Cancelled tender package {}", package.id);
        self.get_package(package_id).await
    }

    /// Award the tender to the current winning contractor
    pub async fn award_package(
        &self,
        _user: &AuthUser,
        package_id: Uuid,
    ) -> AppResult<TenderPackage> {
        let mut package = self.get_package(package_id).await?;

        if !package.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(
                "Only published tender packages can be awarded".to_string(),
            ));
        }
        if package.winning_contractor.is_none() {
            return Err(AppError::ValidationError(
                "Please select winning contractor first".to_string(),
            ));
        }
        if package.status == DocumentStatus::Awarded {
            return Err(AppError::Conflict("Tender is already awarded".to_string()));
        }

        package.status = DocumentStatus::Awarded;
        package.award_date = Some(Utc::now().date_naive());
        package.recalculate();
        self.persist_package(&package).await?;

        tracing::info!(
            "Awarded tender package {} to {:?}",
            package.id,
            package.winning_contractor
        );
        self.get_package(package_id).await
    }

    /// Quotes sorted by amount for side-by-side comparison
    pub async fn quote_comparison(&self, package_id: Uuid) -> AppResult<Vec<QuoteComparison>> {
        let rows = sqlx::query_as::<_, QuoteRow>(
            r#"
            SELECT id, tender_package_id, contractor, docstatus, status,
                   total_base_amount, discount_percentage, discount_amount,
                   tax_percentage, tax_amount, total_quote_amount, technical_score,
                   commercial_score, overall_score, validity_date, delivery_period_days,
                   created_at, updated_at
            FROM tender_quotes
            WHERE tender_package_id = $1 AND docstatus = 1
            ORDER BY total_quote_amount ASC
            "#,
        )
        .bind(package_id)
        .fetch_all(&self.db)
        .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound(
                "Submitted quotes for comparison".to_string(),
            ));
        }

        Ok(rows
            .into_iter()
            .map(|row| QuoteComparison {
                quote_id: row.id,
                contractor: row.contractor,
                total_quote_amount: row.total_quote_amount,
                overall_score: row.overall_score,
                validity_date: row.validity_date,
                delivery_period_days: row.delivery_period_days,
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Tender quotes
    // ------------------------------------------------------------------

    /// Create a draft quote against a package
    pub async fn create_quote(
        &self,
        _user: &AuthUser,
        input: CreateQuoteInput,
    ) -> AppResult<TenderQuote> {
        let package = self.get_package(input.tender_package_id).await?;

        if input.contractor.trim().is_empty() {
            return Err(AppError::validation("contractor", "Contractor is required"));
        }

        let mut quote = TenderQuote {
            id: Uuid::new_v4(),
            tender_package_id: package.id,
            contractor: input.contractor,
            docstatus: DocStatus::Draft,
            status: DocumentStatus::Draft,
            total_base_amount: Decimal::ZERO,
            discount_percentage: input.discount_percentage,
            discount_amount: Decimal::ZERO,
            tax_percentage: input.tax_percentage,
            tax_amount: Decimal::ZERO,
            total_quote_amount: Decimal::ZERO,
            technical_score: input.technical_score,
            commercial_score: input.commercial_score,
            overall_score: Decimal::ZERO,
            validity_date: input.validity_date,
            delivery_period_days: input.delivery_period_days,
            items: input.items.into_iter().map(quote_item_from_input).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        quote.recalculate();
        quote.refresh_status();

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tender_quotes (
                id, tender_package_id, contractor, docstatus, status,
                total_base_amount, discount_percentage, discount_amount,
                tax_percentage, tax_amount, total_quote_amount, technical_score,
                commercial_score, overall_score, validity_date, delivery_period_days
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(quote.id)
        .bind(quote.tender_package_id)
        .bind(&quote.contractor)
        .bind(quote.docstatus.as_i16())
        .bind(quote.status.as_str())
        .bind(quote.total_base_amount)
        .bind(quote.discount_percentage)
        .bind(quote.discount_amount)
        .bind(quote.tax_percentage)
        .bind(quote.tax_amount)
        .bind(quote.total_quote_amount)
        .bind(quote.technical_score)
        .bind(quote.commercial_score)
        .bind(quote.overall_score)
        .bind(quote.validity_date)
        .bind(quote.delivery_period_days)
        .execute(&mut *tx)
        .await?;

        insert_quote_items(&mut tx, quote.id, &quote.items).await?;

        tx.commit().await?;

        tracing::info!("Created tender quote {} for package {}", quote.id, package.id);
        self.get_quote(quote.id).await
    }

    /// Get a quote with its items
    pub async fn get_quote(&self, quote_id: Uuid) -> AppResult<TenderQuote> {
        let row = sqlx::query_as::<_, QuoteRow>(
            r#"
            SELECT id, tender_package_id, contractor, docstatus, status,
                   total_base_amount, discount_percentage, discount_amount,
                   tax_percentage, tax_amount, total_quote_amount, technical_score,
                   commercial_score, overall_score, validity_date, delivery_period_days,
                   created_at, updated_at
            FROM tender_quotes
            WHERE id = $1
            "#,
        )
        .bind(quote_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tender quote".to_string()))?;

        let items = sqlx::query_as::<_, QuoteItemRow>(
            r#"
            SELECT id, item_code, item_name, description, uom, quantity, unit_rate, amount
            FROM tender_quote_items
            WHERE tender_quote_id = $1
            ORDER BY idx
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.db)
        .await?;

        Ok(row.into_entity(items.into_iter().map(|r| r.into()).collect()))
    }

    /// List quotes for a package
    pub async fn list_quotes(&self, package_id: Uuid) -> AppResult<Vec<TenderQuote>> {
        let rows = sqlx::query_as::<_, QuoteRow>(
            r#"
            SELECT id, tender_package_id, contractor, docstatus, status,
                   total_base_amount, discount_percentage, discount_amount,
                   tax_percentage, tax_amount, total_quote_amount, technical_score,
                   commercial_score, overall_score, validity_date, delivery_period_days,
                   created_at, updated_at
            FROM tender_quotes
            WHERE tender_package_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(package_id)
        .fetch_all(&self.db)
        .await?;

        let mut quotes = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            let items = sqlx::query_as::<_, QuoteItemRow>(
                r#"
                SELECT id, item_code, item_name, description, uom, quantity, unit_rate, amount
                FROM tender_quote_items
                WHERE tender_quote_id = $1
                ORDER BY idx
                "#,
            )
            .bind(id)
            .fetch_all(&self.db)
            .await?;
            quotes.push(row.into_entity(items.into_iter().map(|r| r.into()).collect()));
        }

        Ok(quotes)
    }

    /// Update a draft quote
    pub async fn update_quote(
        &self,
        _user: &AuthUser,
        quote_id: Uuid,
        input: UpdateQuoteInput,
    ) -> AppResult<TenderQuote> {
        let mut quote = self.get_quote(quote_id).await?;

        if !quote.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(
                "Only draft quotes can be modified".to_string(),
            ));
        }

        if let Some(pct) = input.discount_percentage {
            quote.discount_percentage = pct;
        }
        if let Some(pct) = input.tax_percentage {
            quote.tax_percentage = pct;
        }
        if let Some(score) = input.technical_score {
            quote.technical_score = score;
        }
        if let Some(score) = input.commercial_score {
            quote.commercial_score = score;
        }
        if let Some(date) = input.validity_date {
            quote.validity_date = Some(date);
        }
        if let Some(days) = input.delivery_period_days {
            quote.delivery_period_days = Some(days);
        }
        if let Some(items) = input.items {
            quote.items = items.into_iter().map(quote_item_from_input).collect();
        }

        quote.recalculate();
        quote.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_quote(&mut tx, &quote).await?;
        sqlx::query("DELETE FROM tender_quote_items WHERE tender_quote_id = $1")
            .bind(quote.id)
            .execute(&mut *tx)
            .await?;
        insert_quote_items(&mut tx, quote.id, &quote.items).await?;
        tx.commit().await?;

        self.get_quote(quote_id).await
    }

    /// Submit a quote before the package deadline, refreshing the package
    /// quote summary
    pub async fn submit_quote(&self, _user: &AuthUser, quote_id: Uuid) -> AppResult<TenderQuote> {
        let mut quote = self.get_quote(quote_id).await?;

        if !quote.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot submit quote in state {}",
                quote.docstatus
            )));
        }

        let package = self.get_package(quote.tender_package_id).await?;
        if let Some(deadline) = package.submission_deadline {
            if Utc::now() > deadline {
                return Err(AppError::ValidationError(
                    "Quote submission deadline has passed".to_string(),
                ));
            }
        }

        quote.recalculate();
        quote.docstatus = DocStatus::Submitted;
        quote.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_quote(&mut tx, &quote).await?;
        for item in &quote.items {
            sqlx::query("UPDATE tender_quote_items SET amount = $2 WHERE id = $1")
                .bind(item.id)
                .bind(item.amount)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!("Submitted tender quote {}", quote.id);

        self.update_quote_summary(quote.tender_package_id).await?;

        self.get_quote(quote_id).await
    }

    /// Refresh the package's quote summary: count, lowest quote and the
    /// provisional winner (lowest amount)
    pub async fn update_quote_summary(&self, package_id: Uuid) -> AppResult<TenderPackage> {
        let quotes = sqlx::query_as::<_, (String, Decimal)>(
            r#"
            SELECT contractor, total_quote_amount
            FROM tender_quotes
            WHERE tender_package_id = $1 AND docstatus = 1
            ORDER BY total_quote_amount ASC
            "#,
        )
        .bind(package_id)
        .fetch_all(&self.db)
        .await?;

        let mut package = self.get_package(package_id).await?;
        package.total_quotes_received = quotes.len() as i32;

        if let Some((winner, lowest)) = quotes.first() {
            package.lowest_quote_amount = *lowest;
            package.winning_contractor = Some(winner.clone());
            package.winning_quote_amount = *lowest;
        }

        package.recalculate();
        self.persist_package(&package).await?;

        self.get_package(package_id).await
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

    async fn persist_package(&self, package: &TenderPackage) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE tender_packages
            SET title = $2, description = $3, docstatus = $4, status = $5,
                estimated_value = $6, publication_date = $7, submission_deadline = $8,
                opening_date = $9, bid_security_percentage = $10,
                bid_security_amount = $11, total_quotes_received = $12,
                lowest_quote_amount = $13, winning_contractor = $14,
                winning_quote_amount = $15, savings_percentage = $16, award_date = $17,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(package.id)
        .bind(&package.title)
        .bind(&package.description)
        .bind(package.docstatus.as_i16())
        .bind(package.status.as_str())
        .bind(package.estimated_value)
        .bind(package.publication_date)
        .bind(package.submission_deadline)
        .bind(package.opening_date)
        .bind(package.bid_security_percentage)
        .bind(package.bid_security_amount)
        .bind(package.total_quotes_received)
        .bind(package.lowest_quote_amount)
        .bind(&package.winning_contractor)
        .bind(package.winning_quote_amount)
        .bind(package.savings_percentage)
        .bind(package.award_date)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn persist_quote(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        quote: &TenderQuote,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE tender_quotes
            SET docstatus = $2, status = $3, total_base_amount = $4,
                discount_percentage = $5, discount_amount = $6, tax_percentage = $7,
                tax_amount = $8, total_quote_amount = $9, technical_score = $10,
                commercial_score = $11, overall_score = $12, validity_date = $13,
                delivery_period_days = $14, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(quote.id)
        .bind(quote.docstatus.as_i16())
        .bind(quote.status.as_str())
        .bind(quote.total_base_amount)
        .bind(quote.discount_percentage)
        .bind(quote.discount_amount)
        .bind(quote.tax_percentage)
        .bind(quote.tax_amount)
        .bind(quote.total_quote_amount)
        .bind(quote.technical_score)
        .bind(quote.commercial_score)
        .bind(quote.overall_score)
        .bind(quote.validity_date)
        .bind(quote.delivery_period_days)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

/// Publication, deadline and opening must be in strict order
fn validate_package_dates(package: &TenderPackage) -> AppResult<()> {
    if let (Some(publication), Some(deadline)) =
        (package.publication_date, package.submission_deadline)
    {
        if publication >= deadline.date_naive() {
            return Err(AppError::validation(
                "submission_deadline",
                "Bid submission deadline must be after tender publication date",
            ));
        }
    }

    if let (Some(deadline), Some(opening)) = (package.submission_deadline, package.opening_date) {
        if deadline.date_naive() >= opening {
            return Err(AppError::validation(
                "opening_date",
                "Bid opening date must be after bid submission deadline",
            ));
        }
    }

    Ok(())
}

fn quote_item_from_input(input: QuoteItemInput) -> TenderQuoteItem {
    TenderQuoteItem {
        id: Uuid::new_v4(),
        item_code: input.item_code,
        item_name: input.item_name,
        description: input.description,
        uom: input.uom,
        quantity: input.quantity,
        unit_rate: input.unit_rate,
        amount: Decimal::ZERO,
    }
}

async fn insert_quote_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    tender_quote_id: Uuid,
    items: &[TenderQuoteItem],
) -> AppResult<()> {
    for (idx, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO tender_quote_items (
                id, tender_quote_id, idx, item_code, item_name, description, uom,
                quantity, unit_rate, amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(item.id)
        .bind(tender_quote_id)
        .bind(idx as i32)
        .bind(&item.item_code)
        .bind(&item.item_name)
        .bind(&item.description)
        .bind(&item.uom)
        .bind(item.quantity)
        .bind(item.unit_rate)
        .bind(item.amount)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

//! Final account service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::payment_certificate::{CreateCertificateInput, PaymentCertificateService};
use crate::services::soft;
use shared::{
    round2, CertificateType, DocStatus, DocumentStatus, FinalAccount, FinalAccountAnalysis,
    FinalAccountItem, PaymentCertificate, ProjectStatus,
};

/// Service for end-of-project final accounts
#[derive(Clone)]
pub struct FinalAccountService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct FinalAccountRow {
    id: Uuid,
    project_id: Uuid,
    contractor: String,
    account_date: NaiveDate,
    docstatus: i16,
    status: String,
    original_contract_value: Decimal,
    approved_variations_total: Decimal,
    claims_amount: Decimal,
    contra_charges: Decimal,
    adjusted_contract_value: Decimal,
    work_done_to_date: Decimal,
    materials_on_site: Decimal,
    previous_payments: Decimal,
    current_payment_due: Decimal,
    total_certified_value: Decimal,
    retention_percentage: Decimal,
    retention_amount: Decimal,
    net_amount_due: Decimal,
    vat_percentage: Decimal,
    vat_amount: Decimal,
    gross_amount_payable: Decimal,
    final_payment_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct FinalAccountItemRow {
    id: Uuid,
    item_code: String,
    item_name: Option<String>,
    description: Option<String>,
    uom: String,
    item_category: Option<String>,
    original_quantity: Decimal,
    original_rate: Decimal,
    original_amount: Decimal,
    final_quantity: Decimal,
    final_rate: Decimal,
    final_amount: Decimal,
    quantity_variance: Decimal,
    rate_variance: Decimal,
    amount_variance: Decimal,
}

impl FinalAccountRow {
    fn into_entity(self, items: Vec<FinalAccountItem>) -> FinalAccount {
        FinalAccount {
            id: self.id,
            project_id: self.project_id,
            contractor: self.contractor,
            account_date: self.account_date,
            docstatus: DocStatus::from_i16(self.docstatus).unwrap_or_default(),
            status: DocumentStatus::from_str(&self.status).unwrap_or(DocumentStatus::Draft),
            original_contract_value: self.original_contract_value,
            approved_variations_total: self.approved_variations_total,
            claims_amount: self.claims_amount,
            contra_charges: self.contra_charges,
            adjusted_contract_value: self.adjusted_contract_value,
            work_done_to_date: self.work_done_to_date,
            materials_on_site: self.materials_on_site,
            previous_payments: self.previous_payments,
            current_payment_due: self.current_payment_due,
            total_certified_value: self.total_certified_value,
            retention_percentage: self.retention_percentage,
            retention_amount: self.retention_amount,
            net_amount_due: self.net_amount_due,
            vat_percentage: self.vat_percentage,
            vat_amount: self.vat_amount,
            gross_amount_payable: self.gross_amount_payable,
            final_payment_amount: self.final_payment_amount,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<FinalAccountItemRow> for FinalAccountItem {
    fn from(row: FinalAccountItemRow) -> Self {
        FinalAccountItem {
            id: row.id,
            item_code: row.item_code,
            item_name: row.item_name,
            description: row.description,
            uom: row.uom,
            item_category: row.item_category,
            original_quantity: row.original_quantity,
            original_rate: row.original_rate,
            original_amount: row.original_amount,
            final_quantity: row.final_quantity,
            final_rate: row.final_rate,
            final_amount: row.final_amount,
            quantity_variance: row.quantity_variance,
            rate_variance: row.rate_variance,
            amount_variance: row.amount_variance,
        }
    }
}

/// Input for a final account line
#[derive(Debug, Clone, Deserialize)]
pub struct FinalAccountItemInput {
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub uom: String,
    pub item_category: Option<String>,
    #[serde(default)]
    pub original_quantity: Decimal,
    #[serde(default)]
    pub original_rate: Decimal,
    #[serde(default)]
    pub original_amount: Decimal,
    #[serde(default)]
    pub final_quantity: Decimal,
    #[serde(default)]
    pub final_rate: Decimal,
    #[serde(default)]
    pub final_amount: Decimal,
}

/// Input for creating a final account
#[derive(Debug, Deserialize)]
pub struct CreateFinalAccountInput {
    pub project_id: Uuid,
    pub contractor: String,
    pub account_date: Option<NaiveDate>,
    #[serde(default)]
    pub original_contract_value: Decimal,
    #[serde(default)]
    pub claims_amount: Decimal,
    #[serde(default)]
    pub contra_charges: Decimal,
    #[serde(default)]
    pub work_done_to_date: Decimal,
    #[serde(default)]
    pub materials_on_site: Decimal,
    #[serde(default)]
    pub retention_percentage: Decimal,
    #[serde(default)]
    pub vat_percentage: Decimal,
    #[serde(default)]
    pub items: Vec<FinalAccountItemInput>,
}

/// Input for updating a draft final account
#[derive(Debug, Deserialize)]
pub struct UpdateFinalAccountInput {
    pub account_date: Option<NaiveDate>,
    pub original_contract_value: Option<Decimal>,
    pub claims_amount: Option<Decimal>,
    pub contra_charges: Option<Decimal>,
    pub work_done_to_date: Option<Decimal>,
    pub materials_on_site: Option<Decimal>,
    pub retention_percentage: Option<Decimal>,
    pub vat_percentage: Option<Decimal>,
    pub items: Option<Vec<FinalAccountItemInput>>,
}

/// Final account header for listings
#[derive(Debug, Serialize)]
pub struct FinalAccountSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub contractor: String,
    pub status: DocumentStatus,
    pub adjusted_contract_value: Decimal,
    pub final_payment_amount: Decimal,
}

impl FinalAccountService {
    /// Create a new FinalAccountService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a draft final account, capturing variation and payment rollups
    pub async fn create_final_account(
        &self,
        _user: &AuthUser,
        input: CreateFinalAccountInput,
    ) -> AppResult<FinalAccount> {
        self.validate_project(input.project_id).await?;

        if input.contractor.trim().is_empty() {
            return Err(AppError::validation("contractor", "Contractor is required"));
        }

        let mut account = FinalAccount {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            contractor: input.contractor,
            account_date: input.account_date.unwrap_or_else(|| Utc::now().date_naive()),
            docstatus: DocStatus::Draft,
            status: DocumentStatus::Draft,
            original_contract_value: input.original_contract_value,
            approved_variations_total: Decimal::ZERO,
            claims_amount: input.claims_amount,
            contra_charges: input.contra_charges,
            adjusted_contract_value: Decimal::ZERO,
            work_done_to_date: input.work_done_to_date,
            materials_on_site: input.materials_on_site,
            previous_payments: Decimal::ZERO,
            current_payment_due: Decimal::ZERO,
            total_certified_value: Decimal::ZERO,
            retention_percentage: input.retention_percentage,
            retention_amount: Decimal::ZERO,
            net_amount_due: Decimal::ZERO,
            vat_percentage: input.vat_percentage,
            vat_amount: Decimal::ZERO,
            gross_amount_payable: Decimal::ZERO,
            final_payment_amount: Decimal::ZERO,
            items: input.items.into_iter().map(item_from_input).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.capture_rollups(&mut account).await?;
        account.recalculate();
        account.refresh_status();

        let mut tx = self.db.begin().await?;
        self.insert_header(&mut tx, &account).await?;
        insert_items(&mut tx, account.id, &account.items).await?;
        tx.commit().await?;

        tracing::info!(
            "Created final account {} for project {}",
            account.id,
            account.project_id
        );
        self.get_final_account(account.id).await
    }

    /// Get a final account with its items
    pub async fn get_final_account(&self, account_id: Uuid) -> AppResult<FinalAccount> {
        let row = sqlx::query_as::<_, FinalAccountRow>(
            r#"
            SELECT id, project_id, contractor, account_date, docstatus, status,
                   original_contract_value, approved_variations_total, claims_amount,
                   contra_charges, adjusted_contract_value, work_done_to_date,
                   materials_on_site, previous_payments, current_payment_due,
                   total_certified_value, retention_percentage, retention_amount,
                   net_amount_due, vat_percentage, vat_amount, gross_amount_payable,
                   final_payment_amount, created_at, updated_at
            FROM final_accounts
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Final account".to_string()))?;

        let items = sqlx::query_as::<_, FinalAccountItemRow>(
            r#"
            SELECT id, item_code, item_name, description, uom, item_category,
                   original_quantity, original_rate, original_amount,
                   final_quantity, final_rate, final_amount,
                   quantity_variance, rate_variance, amount_variance
            FROM final_account_items
            WHERE final_account_id = $1
            ORDER BY idx
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await?;

        Ok(row.into_entity(items.into_iter().map(|r| r.into()).collect()))
    }

    /// List final account headers, optionally by project
    pub async fn list_final_accounts(
        &self,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<FinalAccountSummary>> {
        let rows = sqlx::query_as::<_, FinalAccountRow>(
            r#"
            SELECT id, project_id, contractor, account_date, docstatus, status,
                   original_contract_value, approved_variations_total, claims_amount,
                   contra_charges, adjusted_contract_value, work_done_to_date,
                   materials_on_site, previous_payments, current_payment_due,
                   total_certified_value, retention_percentage, retention_amount,
                   net_amount_due, vat_percentage, vat_amount, gross_amount_payable,
                   final_payment_amount, created_at, updated_at
            FROM final_accounts
            WHERE ($1::uuid IS NULL OR project_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FinalAccountSummary {
                id: row.id,
                project_id: row.project_id,
                contractor: row.contractor,
                status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Draft),
                adjusted_contract_value: row.adjusted_contract_value,
                final_payment_amount: row.final_payment_amount,
            })
            .collect())
    }

    /// Update a draft final account, refreshing the rollups
    pub async fn update_final_account(
        &self,
        _user: &AuthUser,
        account_id: Uuid,
        input: UpdateFinalAccountInput,
    ) -> AppResult<FinalAccount> {
        let mut account = self.get_final_account(account_id).await?;

        if !account.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(
                "Only draft final accounts can be modified".to_string(),
            ));
        }

        if let Some(date) = input.account_date {
            account.account_date = date;
        }
        if let Some(value) = input.original_contract_value {
            account.original_contract_value = value;
        }
        if let Some(value) = input.claims_amount {
            account.claims_amount = value;
        }
        if let Some(value) = input.contra_charges {
            account.contra_charges = value;
        }
        if let Some(value) = input.work_done_to_date {
            account.work_done_to_date = value;
        }
        if let Some(value) = input.materials_on_site {
            account.materials_on_site = value;
        }
        if let Some(pct) = input.retention_percentage {
            account.retention_percentage = pct;
        }
        if let Some(pct) = input.vat_percentage {
            account.vat_percentage = pct;
        }
        if let Some(items) = input.items {
            account.items = items.into_iter().map(item_from_input).collect();
        }

        self.capture_rollups(&mut account).await?;
        account.recalculate();
        account.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &account).await?;
        sqlx::query("DELETE FROM final_account_items WHERE final_account_id = $1")
            .bind(account.id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, account.id, &account.items).await?;
        tx.commit().await?;

        self.get_final_account(account_id).await
    }

    /// Submit the final account for review and mark the project completed
    pub async fn submit_final_account(
        &self,
        _user: &AuthUser,
        account_id: Uuid,
    ) -> AppResult<FinalAccount> {
        let mut account = self.get_final_account(account_id).await?;

        if !account.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot submit final account in state {}",
                account.docstatus
            )));
        }

        self.capture_rollups(&mut account).await?;
        account.recalculate();
        account.docstatus = DocStatus::Submitted;
        account.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &account).await?;
        update_item_amounts(&mut tx, &account.items).await?;
        tx.commit().await?;

        tracing::info!("Submitted final account {}", account.id);

        soft(
            "Marking project completed",
            self.complete_project(account.project_id).await,
        );

        self.get_final_account(account_id).await
    }

    /// Record agreement of a final account under review
    pub async fn agree_final_account(
        &self,
        _user: &AuthUser,
        account_id: Uuid,
    ) -> AppResult<FinalAccount> {
        let account = self.get_final_account(account_id).await?;

        if !account.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(
                "Only submitted final accounts can be agreed".to_string(),
            ));
        }
        if account.status == DocumentStatus::Agreed {
            return Err(AppError::Conflict(
                "Final account is already agreed".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE final_accounts SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(account_id)
        .bind(DocumentStatus::Agreed.as_str())
        .execute(&self.db)
        .await?;

        tracing::info!("Agreed final account {}", account_id);
        self.get_final_account(account_id).await
    }

    /// Cancel a submitted final account; cancellation is terminal
    pub async fn cancel_final_account(
        &self,
        _user: &AuthUser,
        account_id: Uuid,
    ) -> AppResult<FinalAccount> {
        let mut account = self.get_final_account(account_id).await?;

        if !account.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot cancel final account in state {}",
                account.docstatus
            )));
        }

        account.docstatus = DocStatus::Cancelled;
        account.refresh_status();

        let mut tx = self.db.begin().await?;
        self.persist_header(&mut tx, &account).await?;
        tx.commit().await?;

        tracing::info!("Cancelled final account {}", account_id);
        self.get_final_account(account_id).await
    }

    /// Replace the items with the project's submitted BoQ lines and refresh
    /// the rollups
    pub async fn load_project_data(
        &self,
        user: &AuthUser,
        account_id: Uuid,
    ) -> AppResult<FinalAccount> {
        let account = self.get_final_account(account_id).await?;

        if !account.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(
                "Only draft final accounts can load project data".to_string(),
            ));
        }

        let boq_items = sqlx::query_as::<_, (String, Option<String>, Option<String>, String, Decimal, Decimal, Decimal)>(
            r#"
            SELECT bi.item_code, bi.item_name, bi.description, bi.uom,
                   bi.quantity, bi.rate, bi.amount
            FROM boq_items bi
            INNER JOIN boqs b ON b.id = bi.boq_id
            WHERE b.project_id = $1 AND b.docstatus = 1
            ORDER BY b.created_at, bi.idx
            "#,
        )
        .bind(account.project_id)
        .fetch_all(&self.db)
        .await?;

        let items: Vec<FinalAccountItemInput> = boq_items
            .into_iter()
            .map(
                |(item_code, item_name, description, uom, quantity, rate, amount)| {
                    FinalAccountItemInput {
                        item_code,
                        item_name,
                        description,
                        uom,
                        item_category: None,
                        original_quantity: quantity,
                        original_rate: rate,
                        original_amount: amount,
                        // Starting point for measurement, adjusted during
                        // reconciliation
                        final_quantity: quantity,
                        final_rate: rate,
                        final_amount: amount,
                    }
                },
            )
            .collect();

        self.update_final_account(
            user,
            account_id,
            UpdateFinalAccountInput {
                account_date: None,
                original_contract_value: None,
                claims_amount: None,
                contra_charges: None,
                work_done_to_date: None,
                materials_on_site: None,
                retention_percentage: None,
                vat_percentage: None,
                items: Some(items),
            },
        )
        .await
    }

    /// Cost variance analysis with per-category breakdown
    pub async fn cost_analysis(&self, account_id: Uuid) -> AppResult<FinalAccountAnalysis> {
        let account = self.get_final_account(account_id).await?;
        Ok(account.cost_analysis())
    }

    /// Create the closing payment certificate from an agreed final account
    pub async fn create_final_payment(
        &self,
        user: &AuthUser,
        account_id: Uuid,
    ) -> AppResult<PaymentCertificate> {
        let account = self.get_final_account(account_id).await?;

        if account.status != DocumentStatus::Agreed {
            return Err(AppError::InvalidStateTransition(
                "Final account must be agreed before creating payment".to_string(),
            ));
        }
        if account.final_payment_amount <= Decimal::ZERO {
            return Err(AppError::ValidationError("No payment amount due".to_string()));
        }

        let input = CreateCertificateInput {
            project_id: account.project_id,
            valuation_id: None,
            contractor: Some(account.contractor.clone()),
            certificate_type: CertificateType::Final,
            certificate_date: Some(account.account_date),
            payment_due_date: None,
            gross_amount: account.gross_amount_payable,
            retention_percentage: Decimal::ZERO,
            advance_recovery: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
            previous_payments: Some(account.previous_payments),
            remarks: Some(format!("Final payment based on final account {}", account.id)),
        };

        PaymentCertificateService::new(self.db.clone())
            .create_certificate(user, input)
            .await
    }

    /// Capture the cross-document rollups this account depends on
    async fn capture_rollups(&self, account: &mut FinalAccount) -> AppResult<()> {
        let variations = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(total_variation_amount)
            FROM variation_orders
            WHERE project_id = $1 AND docstatus = 1 AND approval_status = 'approved'
            "#,
        )
        .bind(account.project_id)
        .fetch_one(&self.db)
        .await?;
        account.approved_variations_total = round2(variations.unwrap_or_default());

        let payments = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(net_payment_amount)
            FROM payment_certificates
            WHERE project_id = $1 AND contractor = $2 AND docstatus = 1
            "#,
        )
        .bind(account.project_id)
        .bind(&account.contractor)
        .fetch_one(&self.db)
        .await?;
        account.previous_payments = round2(payments.unwrap_or_default());

        Ok(())
    }

    /// Mark the project completed when the final account is submitted
    async fn complete_project(&self, project_id: Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE projects
            SET status = $2, percent_complete = 100, updated_at = NOW()
            WHERE id = $1 AND status != $2
            "#,
        )
        .bind(project_id)
        .bind(ProjectStatus::Completed.as_str())
        .execute(&self.db)
        .await?;
        Ok(())
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

    async fn insert_header(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        account: &FinalAccount,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO final_accounts (
                id, project_id, contractor, account_date, docstatus, status,
                original_contract_value, approved_variations_total, claims_amount,
                contra_charges, adjusted_contract_value, work_done_to_date,
                materials_on_site, previous_payments, current_payment_due,
                total_certified_value, retention_percentage, retention_amount,
                net_amount_due, vat_percentage, vat_amount, gross_amount_payable,
                final_payment_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(account.id)
        .bind(account.project_id)
        .bind(&account.contractor)
        .bind(account.account_date)
        .bind(account.docstatus.as_i16())
        .bind(account.status.as_str())
        .bind(account.original_contract_value)
        .bind(account.approved_variations_total)
        .bind(account.claims_amount)
        .bind(account.contra_charges)
        .bind(account.adjusted_contract_value)
        .bind(account.work_done_to_date)
        .bind(account.materials_on_site)
        .bind(account.previous_payments)
        .bind(account.current_payment_due)
        .bind(account.total_certified_value)
        .bind(account.retention_percentage)
        .bind(account.retention_amount)
        .bind(account.net_amount_due)
        .bind(account.vat_percentage)
        .bind(account.vat_amount)
        .bind(account.gross_amount_payable)
        .bind(account.final_payment_amount)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn persist_header(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        account: &FinalAccount,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE final_accounts
            SET account_date = $2, docstatus = $3, status = $4,
                original_contract_value = $5, approved_variations_total = $6,
                claims_amount = $7, contra_charges = $8, adjusted_contract_value = $9,
                work_done_to_date = $10, materials_on_site = $11,
                previous_payments = $12, current_payment_due = $13,
                total_certified_value = $14, retention_percentage = $15,
                retention_amount = $16, net_amount_due = $17, vat_percentage = $18,
                vat_amount = $19, gross_amount_payable = $20,
                final_payment_amount = $21, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(account.id)
        .bind(account.account_date)
        .bind(account.docstatus.as_i16())
        .bind(account.status.as_str())
        .bind(account.original_contract_value)
        .bind(account.approved_variations_total)
        .bind(account.claims_amount)
        .bind(account.contra_charges)
        .bind(account.adjusted_contract_value)
        .bind(account.work_done_to_date)
        .bind(account.materials_on_site)
        .bind(account.previous_payments)
        .bind(account.current_payment_due)
        .bind(account.total_certified_value)
        .bind(account.retention_percentage)
        .bind(account.retention_amount)
        .bind(account.net_amount_due)
        .bind(account.vat_percentage)
        .bind(account.vat_amount)
        .bind(account.gross_amount_payable)
        .bind(account.final_payment_amount)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn item_from_input(input: FinalAccountItemInput) -> FinalAccountItem {
    FinalAccountItem {
        id: Uuid::new_v4(),
        item_code: input.item_code,
        item_name: input.item_name,
        description: input.description,
        uom: input.uom,
        item_category: input.item_category,
        original_quantity: input.original_quantity,
        original_rate: input.original_rate,
        original_amount: input.original_amount,
        final_quantity: input.final_quantity,
        final_rate: input.final_rate,
        final_amount: input.final_amount,
        quantity_variance: Decimal::ZERO,
        rate_variance: Decimal::ZERO,
        amount_variance: Decimal::ZERO,
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    final_account_id: Uuid,
    items: &[FinalAccountItem],
) -> AppResult<()> {
    for (idx, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO final_account_items (
                id, final_account_id, idx, item_code, item_name, description, uom,
                item_category, original_quantity, original_rate, original_amount,
                final_quantity, final_rate, final_amount, quantity_variance,
                rate_variance, amount_variance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17)
            "#,
        )
        .bind(item.id)
        .bind(final_account_id)
        .bind(idx as i32)
        .bind(&item.item_code)
        .bind(&item.item_name)
        .bind(&item.description)
        .bind(&item.uom)
        .bind(&item.item_category)
        .bind(item.original_quantity)
        .bind(item.original_rate)
        .bind(item.original_amount)
        .bind(item.final_quantity)
        .bind(item.final_rate)
        .bind(item.final_amount)
        .bind(item.quantity_variance)
        .bind(item.rate_variance)
        .bind(item.amount_variance)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn update_item_amounts(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    items: &[FinalAccountItem],
) -> AppResult<()> {
    for item in items {
        sqlx::query(
            r#"
            UPDATE final_account_items
            SET final_amount = $2, quantity_variance = $3, rate_variance = $4,
                amount_variance = $5
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .bind(item.final_amount)
        .bind(item.quantity_variance)
        .bind(item.rate_variance)
        .bind(item.amount_variance)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

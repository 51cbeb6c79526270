//! Payment certificate service

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::notification::NotificationService;
use crate::services::settings::SettingsService;
use crate::services::soft;
use shared::{
    capped_progress, certificate_submitted_notification, round2, CertificateType, DocStatus,
    DocumentStatus, PaymentCertificate, ProjectStatus, QuantitySurveySettings,
};

/// Service for interim and final payment certificates
#[derive(Clone)]
pub struct PaymentCertificateService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct CertificateRow {
    id: Uuid,
    project_id: Uuid,
    valuation_id: Option<Uuid>,
    contractor: Option<String>,
    certificate_type: String,
    certificate_date: NaiveDate,
    payment_due_date: Option<NaiveDate>,
    docstatus: i16,
    status: String,
    gross_amount: Decimal,
    retention_percentage: Decimal,
    retention_amount: Decimal,
    advance_recovery: Decimal,
    other_deductions: Decimal,
    previous_payments: Decimal,
    previous_retention: Decimal,
    net_payment_amount: Decimal,
    cumulative_gross_amount: Decimal,
    cumulative_retention: Decimal,
    remarks: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CertificateRow> for PaymentCertificate {
    fn from(row: CertificateRow) -> Self {
        PaymentCertificate {
            id: row.id,
            project_id: row.project_id,
            valuation_id: row.valuation_id,
            contractor: row.contractor,
            certificate_type: CertificateType::from_str(&row.certificate_type)
                .unwrap_or_default(),
            certificate_date: row.certificate_date,
            payment_due_date: row.payment_due_date,
            docstatus: DocStatus::from_i16(row.docstatus).unwrap_or_default(),
            status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Draft),
            gross_amount: row.gross_amount,
            retention_percentage: row.retention_percentage,
            retention_amount: row.retention_amount,
            advance_recovery: row.advance_recovery,
            other_deductions: row.other_deductions,
            previous_payments: row.previous_payments,
            previous_retention: row.previous_retention,
            net_payment_amount: row.net_payment_amount,
            cumulative_gross_amount: row.cumulative_gross_amount,
            cumulative_retention: row.cumulative_retention,
            remarks: row.remarks,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a payment certificate
#[derive(Debug, Deserialize)]
pub struct CreateCertificateInput {
    pub project_id: Uuid,
    pub valuation_id: Option<Uuid>,
    pub contractor: Option<String>,
    #[serde(default)]
    pub certificate_type: CertificateType,
    pub certificate_date: Option<NaiveDate>,
    pub payment_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub gross_amount: Decimal,
    #[serde(default)]
    pub retention_percentage: Decimal,
    #[serde(default)]
    pub advance_recovery: Decimal,
    #[serde(default)]
    pub other_deductions: Decimal,
    /// Previous certified payments; captured from submitted certificates
    /// of the project when omitted
    pub previous_payments: Option<Decimal>,
    pub remarks: Option<String>,
}

/// Input for updating a draft certificate
#[derive(Debug, Deserialize)]
pub struct UpdateCertificateInput {
    pub certificate_date: Option<NaiveDate>,
    pub payment_due_date: Option<NaiveDate>,
    pub contractor: Option<String>,
    pub gross_amount: Option<Decimal>,
    pub retention_percentage: Option<Decimal>,
    pub advance_recovery: Option<Decimal>,
    pub other_deductions: Option<Decimal>,
    pub remarks: Option<String>,
}

/// Certificate header for listings
#[derive(Debug, Serialize)]
pub struct CertificateSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub contractor: Option<String>,
    pub certificate_date: NaiveDate,
    pub status: DocumentStatus,
    pub gross_amount: Decimal,
    pub net_payment_amount: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRef {
    name: String,
    status: String,
    contract_value: Decimal,
    retention_percentage: Decimal,
    manager_email: Option<String>,
}

impl PaymentCertificateService {
    /// Create a new PaymentCertificateService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a draft payment certificate
    pub async fn create_certificate(
        &self,
        _user: &AuthUser,
        input: CreateCertificateInput,
    ) -> AppResult<PaymentCertificate> {
        let certificate_date = input.certificate_date.unwrap_or_else(|| Utc::now().date_naive());
        // Payment falls due 30 days after certification unless stated
        let payment_due_date = input
            .payment_due_date
            .or_else(|| Some(certificate_date + Duration::days(30)));

        let previous_payments = match input.previous_payments {
            Some(amount) => amount,
            None => self.previous_payments(input.project_id).await?,
        };
        let previous_retention = self.previous_retention(input.project_id).await?;

        let mut certificate = PaymentCertificate {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            valuation_id: input.valuation_id,
            contractor: input.contractor,
            certificate_type: input.certificate_type,
            certificate_date,
            payment_due_date,
            docstatus: DocStatus::Draft,
            status: DocumentStatus::Draft,
            gross_amount: input.gross_amount,
            retention_percentage: input.retention_percentage,
            retention_amount: Decimal::ZERO,
            advance_recovery: input.advance_recovery,
            other_deductions: input.other_deductions,
            previous_payments,
            previous_retention,
            net_payment_amount: Decimal::ZERO,
            cumulative_gross_amount: Decimal::ZERO,
            cumulative_retention: Decimal::ZERO,
            remarks: input.remarks,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.validate_certificate(&mut certificate).await?;

        sqlx::query(
            r#"
            INSERT INTO payment_certificates (
                id, project_id, valuation_id, contractor, certificate_type,
                certificate_date, payment_due_date, docstatus, status, gross_amount,
                retention_percentage, retention_amount, advance_recovery,
                other_deductions, previous_payments, previous_retention,
                net_payment_amount, cumulative_gross_amount, cumulative_retention, remarks
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(certificate.id)
        .bind(certificate.project_id)
        .bind(certificate.valuation_id)
        .bind(&certificate.contractor)
        .bind(certificate.certificate_type.as_str())
        .bind(certificate.certificate_date)
        .bind(certificate.payment_due_date)
        .bind(certificate.docstatus.as_i16())
        .bind(certificate.status.as_str())
        .bind(certificate.gross_amount)
        .bind(certificate.retention_percentage)
        .bind(certificate.retention_amount)
        .bind(certificate.advance_recovery)
        .bind(certificate.other_deductions)
        .bind(certificate.previous_payments)
        .bind(certificate.previous_retention)
        .bind(certificate.net_payment_amount)
        .bind(certificate.cumulative_gross_amount)
        .bind(certificate.cumulative_retention)
        .bind(&certificate.remarks)
        .execute(&self.db)
        .await?;

        tracing::info!(
            "Created payment certificate {} for project {}",
            certificate.id,
            certificate.project_id
        );
        self.get_certificate(certificate.id).await
    }

    /// Get a payment certificate by ID
    pub async fn get_certificate(&self, certificate_id: Uuid) -> AppResult<PaymentCertificate> {
        let row = sqlx::query_as::<_, CertificateRow>(
            r#"
            SELECT id, project_id, valuation_id, contractor, certificate_type,
                   certificate_date, payment_due_date, docstatus, status, gross_amount,
                   retention_percentage, retention_amount, advance_recovery,
                   other_deductions, previous_payments, previous_retention,
                   net_payment_amount, cumulative_gross_amount, cumulative_retention,
                   remarks, created_at, updated_at
            FROM payment_certificates
            WHERE id = $1
            "#,
        )
        .bind(certificate_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment certificate".to_string()))?;

        Ok(row.into())
    }

    /// List certificate headers, optionally by project
    pub async fn list_certificates(
        &self,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<CertificateSummary>> {
        let rows = sqlx::query_as::<_, CertificateRow>(
            r#"
            SELECT id, project_id, valuation_id, contractor, certificate_type,
                   certificate_date, payment_due_date, docstatus, status, gross_amount,
                   retention_percentage, retention_amount, advance_recovery,
                   other_deductions, previous_payments, previous_retention,
                   net_payment_amount, cumulative_gross_amount, cumulative_retention,
                   remarks, created_at, updated_at
            FROM payment_certificates
            WHERE ($1::uuid IS NULL OR project_id = $1)
            ORDER BY certificate_date DESC, created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CertificateSummary {
                id: row.id,
                project_id: row.project_id,
                contractor: row.contractor,
                certificate_date: row.certificate_date,
                status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Draft),
                gross_amount: row.gross_amount,
                net_payment_amount: row.net_payment_amount,
            })
            .collect())
    }

    /// Update a draft certificate
    pub async fn update_certificate(
        &self,
        _user: &AuthUser,
        certificate_id: Uuid,
        input: UpdateCertificateInput,
    ) -> AppResult<PaymentCertificate> {
        let mut certificate = self.get_certificate(certificate_id).await?;

        if !certificate.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(
                "Only draft payment certificates can be modified".to_string(),
            ));
        }

        if let Some(date) = input.certificate_date {
            certificate.certificate_date = date;
        }
        if let Some(date) = input.payment_due_date {
            certificate.payment_due_date = Some(date);
        }
        if let Some(contractor) = input.contractor {
            certificate.contractor = Some(contractor);
        }
        if let Some(amount) = input.gross_amount {
            certificate.gross_amount = amount;
        }
        if let Some(pct) = input.retention_percentage {
            certificate.retention_percentage = pct;
        }
        if let Some(amount) = input.advance_recovery {
            certificate.advance_recovery = amount;
        }
        if let Some(amount) = input.other_deductions {
            certificate.other_deductions = amount;
        }
        if let Some(remarks) = input.remarks {
            certificate.remarks = Some(remarks);
        }

        self.validate_certificate(&mut certificate).await?;
        self.persist(&certificate).await?;

        self.get_certificate(certificate_id).await
    }

    /// Submit a certificate. Ledger entries, project progress and
    /// notifications are secondary effects: their failures are logged and
    /// never block the submission.
    pub async fn submit_certificate(
        &self,
        _user: &AuthUser,
        certificate_id: Uuid,
    ) -> AppResult<PaymentCertificate> {
        let mut certificate = self.get_certificate(certificate_id).await?;

        if !certificate.docstatus.is_draft() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot submit payment certificate in state {}",
                certificate.docstatus
            )));
        }

        self.validate_certificate(&mut certificate).await?;
        certificate.docstatus = DocStatus::Submitted;
        certificate.refresh_status();
        self.persist(&certificate).await?;

        tracing::info!("Submitted payment certificate {}", certificate.id);

        soft(
            "Updating project progress",
            self.update_project_progress(certificate.project_id).await,
        );
        soft(
            "Creating ledger entries",
            self.create_ledger_entries(&certificate).await,
        );
        soft(
            "Sending certificate notification",
            self.notify_stakeholders(&certificate).await,
        );

        self.get_certificate(certificate_id).await
    }

    /// Cancel a submitted certificate, reversing its ledger entries
    pub async fn cancel_certificate(
        &self,
        _user: &AuthUser,
        certificate_id: Uuid,
    ) -> AppResult<PaymentCertificate> {
        let mut certificate = self.get_certificate(certificate_id).await?;

        if !certificate.docstatus.is_submitted() {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot cancel payment certificate in state {}",
                certificate.docstatus
            )));
        }

        certificate.docstatus = DocStatus::Cancelled;
        certificate.refresh_status();
        self.persist(&certificate).await?;

        tracing::info!("Cancelled payment certificate {}", certificate.id);

        soft(
            "Reversing ledger entries",
            self.reverse_ledger_entries(&certificate).await,
        );
        soft(
            "Updating project progress",
            self.update_project_progress(certificate.project_id).await,
        );

        self.get_certificate(certificate_id).await
    }

    /// Total net payments already certified for the project
    pub async fn previous_payments(&self, project_id: Uuid) -> AppResult<Decimal> {
        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(net_payment_amount)
            FROM payment_certificates
            WHERE project_id = $1 AND docstatus = 1
            "#,
        )
        .bind(project_id)
        .fetch_one(&self.db)
        .await?;

        Ok(round2(total.unwrap_or_default()))
    }

    /// Total retention already withheld for the project
    pub async fn previous_retention(&self, project_id: Uuid) -> AppResult<Decimal> {
        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(retention_amount)
            FROM payment_certificates
            WHERE project_id = $1 AND docstatus = 1
            "#,
        )
        .bind(project_id)
        .fetch_one(&self.db)
        .await?;

        Ok(round2(total.unwrap_or_default()))
    }

    /// Retention rate for a project, falling back to the module default
    pub async fn project_retention_rate(&self, project_id: Uuid) -> AppResult<Decimal> {
        let project = self.load_project(project_id).await?;
        if !project.retention_percentage.is_zero() {
            return Ok(project.retention_percentage);
        }

        let settings = SettingsService::new(self.db.clone()).get_settings().await?;
        Ok(settings.default_retention_percentage)
    }

    /// Validate references, dates and amounts, recomputing derived figures
    async fn validate_certificate(
        &self,
        certificate: &mut PaymentCertificate,
    ) -> AppResult<()> {
        // Dates
        if !shared::validate_date_order(
            Some(certificate.certificate_date),
            certificate.payment_due_date,
        ) {
            return Err(AppError::validation(
                "payment_due_date",
                "Payment due date cannot be before certificate date",
            ));
        }

        // Project must exist and not be cancelled
        let project = self.load_project(certificate.project_id).await?;
        if project.status == ProjectStatus::Cancelled.as_str() {
            return Err(AppError::validation(
                "project_id",
                "Cannot create payment certificate for cancelled project",
            ));
        }

        // Referenced valuation must be submitted and belong to the project
        if let Some(valuation_id) = certificate.valuation_id {
            let valuation = sqlx::query_as::<_, (Uuid, i16, Uuid)>(
                "SELECT id, docstatus, project_id FROM valuations WHERE id = $1",
            )
            .bind(valuation_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Valuation".to_string()))?;

            if valuation.1 != DocStatus::Submitted.as_i16() {
                return Err(AppError::validation(
                    "valuation_id",
                    "Referenced valuation must be submitted",
                ));
            }
            if valuation.2 != certificate.project_id {
                return Err(AppError::validation(
                    "valuation_id",
                    "Valuation project must match payment certificate project",
                ));
            }
        }

        if !certificate.retention_percentage.is_zero() {
            shared::validate_retention_percentage(certificate.retention_percentage)
                .map_err(|msg| AppError::validation("retention_percentage", msg))?;
        }

        certificate.recalculate();

        shared::validate_net_payment(certificate.net_payment_amount)
            .map_err(|msg| AppError::validation("net_payment_amount", msg))?;

        certificate.refresh_status();
        Ok(())
    }

    /// Recompute the project's certified total and capped progress
    async fn update_project_progress(&self, project_id: Uuid) -> AppResult<()> {
        let total_certified = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(gross_amount)
            FROM payment_certificates
            WHERE project_id = $1 AND docstatus = 1
            "#,
        )
        .bind(project_id)
        .fetch_one(&self.db)
        .await?
        .unwrap_or_default();

        let project = self.load_project(project_id).await?;
        if project.contract_value.is_zero() {
            return Ok(());
        }

        let progress = capped_progress(project.contract_value, total_certified);

        sqlx::query(
            r#"
            UPDATE projects
            SET percent_complete = $2, total_certified_amount = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .bind(progress)
        .bind(round2(total_certified))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Write double-entry ledger rows for the certificate when enabled
    async fn create_ledger_entries(&self, certificate: &PaymentCertificate) -> AppResult<()> {
        let settings = SettingsService::new(self.db.clone()).get_settings().await?;
        if !settings.create_ledger_entries {
            return Ok(());
        }

        let entries = prepare_ledger_entries(certificate, &settings)?;

        let mut tx = self.db.begin().await?;
        for entry in &entries {
            insert_ledger_entry(&mut tx, certificate, entry).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Reverse the certificate's ledger rows by writing mirrored entries
    async fn reverse_ledger_entries(&self, certificate: &PaymentCertificate) -> AppResult<()> {
        let existing = sqlx::query_as::<_, (String, Decimal, Decimal, String, String)>(
            r#"
            SELECT account, debit, credit, against_account, remarks
            FROM ledger_entries
            WHERE voucher_type = 'payment_certificate' AND voucher_no = $1
              AND is_reversal = FALSE
            "#,
        )
        .bind(certificate.id)
        .fetch_all(&self.db)
        .await?;

        if existing.is_empty() {
            return Ok(());
        }

        let mut tx = self.db.begin().await?;
        for (account, debit, credit, against_account, remarks) in &existing {
            sqlx::query(
                r#"
                INSERT INTO ledger_entries (
                    id, account, debit, credit, against_account, project_id,
                    voucher_type, voucher_no, posting_date, remarks, is_reversal
                )
                VALUES ($1, $2, $3, $4, $5, $6, 'payment_certificate', $7, $8, $9, TRUE)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(account)
            .bind(credit)
            .bind(debit)
            .bind(against_account)
            .bind(certificate.project_id)
            .bind(certificate.id)
            .bind(Utc::now().date_naive())
            .bind(format!("Reversal: {}", remarks))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Queue an in-app notification to the project manager
    async fn notify_stakeholders(&self, certificate: &PaymentCertificate) -> AppResult<()> {
        let project = self.load_project(certificate.project_id).await?;

        let Some(manager_email) = project.manager_email else {
            return Ok(());
        };

        let message = certificate_submitted_notification(
            &manager_email,
            certificate.id,
            &project.name,
            certificate.net_payment_amount,
        );

        NotificationService::new(self.db.clone()).queue(message).await?;
        Ok(())
    }

    async fn load_project(&self, project_id: Uuid) -> AppResult<ProjectRef> {
        sqlx::query_as::<_, ProjectRef>(
            r#"
            SELECT name, status, contract_value, retention_percentage, manager_email
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::validation("project_id", "Project is mandatory"))
    }

    async fn persist(&self, certificate: &PaymentCertificate) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE payment_certificates
            SET contractor = $2, certificate_date = $3, payment_due_date = $4,
                docstatus = $5, status = $6, gross_amount = $7,
                retention_percentage = $8, retention_amount = $9, advance_recovery = $10,
                other_deductions = $11, previous_payments = $12, previous_retention = $13,
                net_payment_amount = $14, cumulative_gross_amount = $15,
                cumulative_retention = $16, remarks = $17, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(certificate.id)
        .bind(&certificate.contractor)
        .bind(certificate.certificate_date)
        .bind(certificate.payment_due_date)
        .bind(certificate.docstatus.as_i16())
        .bind(certificate.status.as_str())
        .bind(certificate.gross_amount)
        .bind(certificate.retention_percentage)
        .bind(certificate.retention_amount)
        .bind(certificate.advance_recovery)
        .bind(certificate.other_deductions)
        .bind(certificate.previous_payments)
        .bind(certificate.previous_retention)
        .bind(certificate.net_payment_amount)
        .bind(certificate.cumulative_gross_amount)
        .bind(certificate.cumulative_retention)
        .bind(&certificate.remarks)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

/// A ledger posting derived from a certificate
#[derive(Debug, Clone)]
pub struct LedgerPosting {
    pub account: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub against_account: String,
    pub remarks: String,
}

/// Prepare the double-entry rows for a certificate: work-in-progress
/// debit, creditor credit for the net payment, retention payable credit.
fn prepare_ledger_entries(
    certificate: &PaymentCertificate,
    settings: &QuantitySurveySettings,
) -> AppResult<Vec<LedgerPosting>> {
    let wip = settings
        .default_wip_account
        .clone()
        .ok_or_else(|| AppError::Configuration("Default WIP account is not set".to_string()))?;
    let creditors = settings.default_creditors_account.clone().ok_or_else(|| {
        AppError::Configuration("Default creditors account is not set".to_string())
    })?;
    let retention = settings.default_retention_account.clone().ok_or_else(|| {
        AppError::Configuration("Default retention account is not set".to_string())
    })?;

    let mut entries = Vec::new();

    if !certificate.gross_amount.is_zero() {
        entries.push(LedgerPosting {
            account: wip.clone(),
            debit: certificate.gross_amount,
            credit: Decimal::ZERO,
            against_account: creditors.clone(),
            remarks: format!("Work in progress for project {}", certificate.project_id),
        });
    }

    if !certificate.net_payment_amount.is_zero() {
        entries.push(LedgerPosting {
            account: creditors,
            debit: Decimal::ZERO,
            credit: certificate.net_payment_amount,
            against_account: wip.clone(),
            remarks: format!("Payment due to contractor for project {}", certificate.project_id),
        });
    }

    if !certificate.retention_amount.is_zero() {
        entries.push(LedgerPosting {
            account: retention,
            debit: Decimal::ZERO,
            credit: certificate.retention_amount,
            against_account: wip,
            remarks: format!("Retention payable for project {}", certificate.project_id),
        });
    }

    Ok(entries)
}

async fn insert_ledger_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    certificate: &PaymentCertificate,
    entry: &LedgerPosting,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, account, debit, credit, against_account, project_id,
            voucher_type, voucher_no, posting_date, remarks, is_reversal
        )
        VALUES ($1, $2, $3, $4, $5, $6, 'payment_certificate', $7, $8, $9, FALSE)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&entry.account)
    .bind(entry.debit)
    .bind(entry.credit)
    .bind(&entry.against_account)
    .bind(certificate.project_id)
    .bind(certificate.id)
    .bind(certificate.certificate_date)
    .bind(&entry.remarks)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

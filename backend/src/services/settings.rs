//! Module settings service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::QuantitySurveySettings;

/// Service for the module settings singleton
#[derive(Clone)]
pub struct SettingsService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    create_ledger_entries: bool,
    default_wip_account: Option<String>,
    default_creditors_account: Option<String>,
    default_retention_account: Option<String>,
    default_retention_percentage: Decimal,
    budget_alert_threshold: Decimal,
    updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for QuantitySurveySettings {
    fn from(row: SettingsRow) -> Self {
        QuantitySurveySettings {
            create_ledger_entries: row.create_ledger_entries,
            default_wip_account: row.default_wip_account,
            default_creditors_account: row.default_creditors_account,
            default_retention_account: row.default_retention_account,
            default_retention_percentage: row.default_retention_percentage,
            budget_alert_threshold: row.budget_alert_threshold,
            updated_at: row.updated_at,
        }
    }
}

/// Input for updating settings; absent fields keep their current value
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsInput {
    pub create_ledger_entries: Option<bool>,
    pub default_wip_account: Option<String>,
    pub default_creditors_account: Option<String>,
    pub default_retention_account: Option<String>,
    pub default_retention_percentage: Option<Decimal>,
    pub budget_alert_threshold: Option<Decimal>,
}

impl SettingsService {
    /// Create a new SettingsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get the settings singleton, falling back to defaults
    pub async fn get_settings(&self) -> AppResult<QuantitySurveySettings> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT create_ledger_entries, default_wip_account,
                   default_creditors_account, default_retention_account,
                   default_retention_percentage, budget_alert_threshold, updated_at
            FROM quantity_survey_settings
            WHERE singleton = TRUE
            "#,
        )
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| r.into()).unwrap_or_default())
    }

    /// Update the settings singleton after validation
    pub async fn update_settings(
        &self,
        _user: &AuthUser,
        input: UpdateSettingsInput,
    ) -> AppResult<QuantitySurveySettings> {
        let mut settings = self.get_settings().await?;

        if let Some(enabled) = input.create_ledger_entries {
            settings.create_ledger_entries = enabled;
        }
        if let Some(account) = input.default_wip_account {
            settings.default_wip_account = Some(account);
        }
        if let Some(account) = input.default_creditors_account {
            settings.default_creditors_account = Some(account);
        }
        if let Some(account) = input.default_retention_account {
            settings.default_retention_account = Some(account);
        }
        if let Some(pct) = input.default_retention_percentage {
            settings.default_retention_percentage = pct;
        }
        if let Some(pct) = input.budget_alert_threshold {
            settings.budget_alert_threshold = pct;
        }

        settings
            .validate()
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO quantity_survey_settings (
                singleton, create_ledger_entries, default_wip_account,
                default_creditors_account, default_retention_account,
                default_retention_percentage, budget_alert_threshold, updated_at
            )
            VALUES (TRUE, $1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (singleton) DO UPDATE
            SET create_ledger_entries = EXCLUDED.create_ledger_entries,
                default_wip_account = EXCLUDED.default_wip_account,
                default_creditors_account = EXCLUDED.default_creditors_account,
                default_retention_account = EXCLUDED.default_retention_account,
                default_retention_percentage = EXCLUDED.default_retention_percentage,
                budget_alert_threshold = EXCLUDED.budget_alert_threshold,
                updated_at = NOW()
            "#,
        )
        .bind(settings.create_ledger_entries)
        .bind(&settings.default_wip_account)
        .bind(&settings.default_creditors_account)
        .bind(&settings.default_retention_account)
        .bind(settings.default_retention_percentage)
        .bind(settings.budget_alert_threshold)
        .execute(&self.db)
        .await?;

        tracing::info!("Updated quantity survey settings");
        self.get_settings().await
    }
}

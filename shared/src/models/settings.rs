//! Module settings

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::{validate_percentage_range, validate_retention_percentage};

/// Typed module settings, persisted as a singleton row.
///
/// The recognized options are enumerated here; there is no free-form
/// key/value lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantitySurveySettings {
    /// Write double-entry ledger rows when certificates are submitted
    pub create_ledger_entries: bool,
    pub default_wip_account: Option<String>,
    pub default_creditors_account: Option<String>,
    pub default_retention_account: Option<String>,
    pub default_retention_percentage: Decimal,
    /// Budget consumption (percent of approved budget) above which a
    /// budget alert notification is raised
    pub budget_alert_threshold: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl Default for QuantitySurveySettings {
    fn default() -> Self {
        Self {
            create_ledger_entries: false,
            default_wip_account: None,
            default_creditors_account: None,
            default_retention_account: None,
            default_retention_percentage: Decimal::from(5),
            budget_alert_threshold: Decimal::from(90),
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

impl QuantitySurveySettings {
    /// Validate option bounds and account requirements.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.create_ledger_entries {
            if self.default_wip_account.is_none() {
                return Err("Work in Progress account is mandatory when ledger entries are enabled");
            }
            if self.default_creditors_account.is_none() {
                return Err("Creditors account is mandatory when ledger entries are enabled");
            }
            if self.default_retention_account.is_none() {
                return Err("Retention account is mandatory when ledger entries are enabled");
            }
        }

        if !self.default_retention_percentage.is_zero() {
            validate_retention_percentage(self.default_retention_percentage)
                .map_err(|_| "Default retention percentage should be between 0 and 50")?;
        }

        if !self.budget_alert_threshold.is_zero() {
            validate_percentage_range(self.budget_alert_threshold)
                .map_err(|_| "Budget alert threshold should be between 0 and 100")?;
        }

        Ok(())
    }
}

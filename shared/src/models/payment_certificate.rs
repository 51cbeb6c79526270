//! Payment certificate models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{derive_status, percentage_of, round2, DocStatus, DocumentStatus};

/// Interim or final certificate authorising payment to a contractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCertificate {
    pub id: Uuid,
    pub project_id: Uuid,
    pub valuation_id: Option<Uuid>,
    pub contractor: Option<String>,
    pub certificate_type: CertificateType,
    pub certificate_date: NaiveDate,
    pub payment_due_date: Option<NaiveDate>,
    pub docstatus: DocStatus,
    pub status: DocumentStatus,
    pub gross_amount: Decimal,
    pub retention_percentage: Decimal,
    pub retention_amount: Decimal,
    pub advance_recovery: Decimal,
    pub other_deductions: Decimal,
    /// Net amounts already certified for the project; captured by the
    /// cross-document rollup when the certificate is created
    pub previous_payments: Decimal,
    /// Retention already withheld on earlier certificates for the project
    pub previous_retention: Decimal,
    pub net_payment_amount: Decimal,
    pub cumulative_gross_amount: Decimal,
    pub cumulative_retention: Decimal,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CertificateType {
    #[default]
    Interim,
    Final,
}

impl CertificateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateType::Interim => "interim",
            CertificateType::Final => "final",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "interim" => Some(CertificateType::Interim),
            "final" => Some(CertificateType::Final),
            _ => None,
        }
    }
}

impl PaymentCertificate {
    /// Recompute retention, net payment and cumulative figures.
    ///
    /// A certificate without a gross amount is left untouched.
    pub fn recalculate(&mut self) {
        if self.gross_amount.is_zero() {
            return;
        }

        if !self.retention_percentage.is_zero() {
            self.retention_amount = percentage_of(self.gross_amount, self.retention_percentage);
        }

        self.net_payment_amount = round2(
            self.gross_amount
                - self.retention_amount
                - self.advance_recovery
                - self.other_deductions
                - self.previous_payments,
        );

        self.cumulative_gross_amount = round2(self.previous_payments + self.gross_amount);
        self.cumulative_retention = round2(self.previous_retention + self.retention_amount);
    }

    pub fn refresh_status(&mut self) {
        self.status = derive_status(self.docstatus, None);
    }
}

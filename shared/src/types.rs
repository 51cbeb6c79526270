//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Round a monetary or quantity value to 2 decimal places.
///
/// All derived figures are rounded at the point of calculation, not at
/// display time, so persisted totals are reproducible.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// `base * pct / 100`, rounded.
pub fn percentage_of(base: Decimal, pct: Decimal) -> Decimal {
    round2(base * pct / Decimal::ONE_HUNDRED)
}

/// Tri-state submission flag carried by every controlled document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    #[default]
    Draft,
    Submitted,
    Cancelled,
}

impl DocStatus {
    /// Database representation (0 = draft, 1 = submitted, 2 = cancelled).
    pub fn as_i16(&self) -> i16 {
        match self {
            DocStatus::Draft => 0,
            DocStatus::Submitted => 1,
            DocStatus::Cancelled => 2,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(DocStatus::Draft),
            1 => Some(DocStatus::Submitted),
            2 => Some(DocStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_draft(&self) -> bool {
        *self == DocStatus::Draft
    }

    pub fn is_submitted(&self) -> bool {
        *self == DocStatus::Submitted
    }

    pub fn is_cancelled(&self) -> bool {
        *self == DocStatus::Cancelled
    }
}

impl std::fmt::Display for DocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocStatus::Draft => write!(f, "Draft"),
            DocStatus::Submitted => write!(f, "Submitted"),
            DocStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Approval decision for approval-gated documents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

/// Human-facing status label derived from the submission flag and, where
/// applicable, the approval decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    Cancelled,
    UnderReview,
    Agreed,
    Published,
    Awarded,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Submitted => "submitted",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Cancelled => "cancelled",
            DocumentStatus::UnderReview => "under_review",
            DocumentStatus::Agreed => "agreed",
            DocumentStatus::Published => "published",
            DocumentStatus::Awarded => "awarded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(DocumentStatus::Draft),
            "submitted" => Some(DocumentStatus::Submitted),
            "approved" => Some(DocumentStatus::Approved),
            "rejected" => Some(DocumentStatus::Rejected),
            "cancelled" => Some(DocumentStatus::Cancelled),
            "under_review" => Some(DocumentStatus::UnderReview),
            "agreed" => Some(DocumentStatus::Agreed),
            "published" => Some(DocumentStatus::Published),
            "awarded" => Some(DocumentStatus::Awarded),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map the submission flag (and approval decision, where the document has
/// one) to a status label.
///
/// Cancelled is terminal; callers must refuse transitions out of it.
pub fn derive_status(docstatus: DocStatus, approval: Option<ApprovalStatus>) -> DocumentStatus {
    match docstatus {
        DocStatus::Draft => DocumentStatus::Draft,
        DocStatus::Cancelled => DocumentStatus::Cancelled,
        DocStatus::Submitted => match approval {
            Some(ApprovalStatus::Approved) => DocumentStatus::Approved,
            Some(ApprovalStatus::Rejected) => DocumentStatus::Rejected,
            Some(ApprovalStatus::Pending) | None => DocumentStatus::Submitted,
        },
    }
}

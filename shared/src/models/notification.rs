//! In-app notification models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An in-app notification row addressed to a user by email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Content of a notification before it is queued
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
}

/// Notify stakeholders that a payment certificate was issued.
pub fn certificate_submitted_notification(
    recipient: &str,
    certificate_id: Uuid,
    project_name: &str,
    net_payment_amount: Decimal,
) -> NotificationMessage {
    NotificationMessage {
        recipient: recipient.to_string(),
        subject: format!("Payment Certificate issued for {}", project_name),
        body: format!(
            "A payment certificate for {} has been submitted with a net payment of {}.",
            project_name, net_payment_amount
        ),
        reference_type: Some("payment_certificate".to_string()),
        reference_id: Some(certificate_id),
    }
}

/// Notify the originator that their variation order was approved.
pub fn variation_approved_notification(
    recipient: &str,
    variation_id: Uuid,
    project_name: &str,
) -> NotificationMessage {
    NotificationMessage {
        recipient: recipient.to_string(),
        subject: format!("Variation Order approved for {}", project_name),
        body: format!(
            "Your variation order for project {} has been approved.",
            project_name
        ),
        reference_type: Some("variation_order".to_string()),
        reference_id: Some(variation_id),
    }
}

/// Notify the originator that their variation order was rejected.
pub fn variation_rejected_notification(
    recipient: &str,
    variation_id: Uuid,
    project_name: &str,
    reason: Option<&str>,
) -> NotificationMessage {
    let mut body = format!(
        "Your variation order for project {} has been rejected.",
        project_name
    );
    if let Some(reason) = reason {
        body.push_str(&format!("\n\nReason: {}", reason));
    }
    NotificationMessage {
        recipient: recipient.to_string(),
        subject: format!("Variation Order rejected for {}", project_name),
        body,
        reference_type: Some("variation_order".to_string()),
        reference_id: Some(variation_id),
    }
}

/// Remind the project manager about an overdue certificate.
pub fn payment_reminder_notification(
    recipient: &str,
    certificate_id: Uuid,
    project_name: &str,
    net_payment_amount: Decimal,
    due_date: NaiveDate,
    days_overdue: i64,
) -> NotificationMessage {
    NotificationMessage {
        recipient: recipient.to_string(),
        subject: format!("Payment reminder for {}", project_name),
        body: format!(
            "Payment of {} for project {} was due on {} and is {} day(s) overdue.",
            net_payment_amount, project_name, due_date, days_overdue
        ),
        reference_type: Some("payment_certificate".to_string()),
        reference_id: Some(certificate_id),
    }
}

/// Warn that a cost plan is consuming the approved budget.
pub fn budget_alert_notification(
    recipient: &str,
    cost_plan_id: Uuid,
    project_name: &str,
    consumed_percentage: Decimal,
) -> NotificationMessage {
    NotificationMessage {
        recipient: recipient.to_string(),
        subject: format!("Budget alert for {}", project_name),
        body: format!(
            "Projected cost for {} has reached {}% of the approved budget.",
            project_name, consumed_percentage
        ),
        reference_type: Some("cost_plan".to_string()),
        reference_id: Some(cost_plan_id),
    }
}

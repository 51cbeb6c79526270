//! Tests for notification message builders

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{
    budget_alert_notification, certificate_submitted_notification,
    payment_reminder_notification, variation_approved_notification,
    variation_rejected_notification,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn certificate_notification_references_the_certificate() {
    let certificate_id = Uuid::new_v4();
    let message = certificate_submitted_notification(
        "pm@example.com",
        certificate_id,
        "Riverside Towers",
        dec("9500.00"),
    );

    assert_eq!(message.recipient, "pm@example.com");
    assert!(message.subject.contains("Riverside Towers"));
    assert!(message.body.contains("9500.00"));
    assert_eq!(message.reference_type.as_deref(), Some("payment_certificate"));
    assert_eq!(message.reference_id, Some(certificate_id));
}

#[test]
fn approval_and_rejection_messages_differ() {
    let variation_id = Uuid::new_v4();
    let approved =
        variation_approved_notification("pm@example.com", variation_id, "Riverside Towers");
    let rejected = variation_rejected_notification(
        "pm@example.com",
        variation_id,
        "Riverside Towers",
        Some("scope already covered"),
    );

    assert!(approved.body.contains("approved"));
    assert!(rejected.body.contains("rejected"));
    assert!(rejected.body.contains("scope already covered"));
}

#[test]
fn rejection_without_reason_omits_the_reason_line() {
    let message = variation_rejected_notification(
        "pm@example.com",
        Uuid::new_v4(),
        "Riverside Towers",
        None,
    );
    assert!(!message.body.contains("Reason:"));
}

#[test]
fn payment_reminder_carries_overdue_details() {
    let due = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    let message = payment_reminder_notification(
        "pm@example.com",
        Uuid::new_v4(),
        "Riverside Towers",
        dec("12000.00"),
        due,
        14,
    );

    assert!(message.body.contains("12000.00"));
    assert!(message.body.contains("2025-07-01"));
    assert!(message.body.contains("14 day(s)"));
}

#[test]
fn budget_alert_reports_consumption() {
    let message = budget_alert_notification(
        "pm@example.com",
        Uuid::new_v4(),
        "Riverside Towers",
        dec("95.50"),
    );

    assert!(message.body.contains("95.50%"));
    assert_eq!(message.reference_type.as_deref(), Some("cost_plan"));
}

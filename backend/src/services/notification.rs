//! In-app notification service
//!
//! Notifications are rows, not emails; delivery failures in callers are
//! soft. The trigger methods cover the recurring checks (overdue
//! certificates, budget consumption) that used to run on a schedule.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::settings::SettingsService;
use shared::{
    budget_alert_notification, payment_reminder_notification, round2, Notification,
    NotificationMessage,
};

/// Service for in-app notifications
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient: String,
    subject: String,
    body: String,
    reference_type: Option<String>,
    reference_id: Option<Uuid>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            recipient: row.recipient,
            subject: row.subject,
            body: row.body,
            reference_type: row.reference_type,
            reference_id: row.reference_id,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Queue an in-app notification
    pub async fn queue(&self, message: NotificationMessage) -> AppResult<Notification> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, recipient, subject, body, reference_type, reference_id, read
            )
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            "#,
        )
        .bind(id)
        .bind(&message.recipient)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(&message.reference_type)
        .bind(message.reference_id)
        .execute(&self.db)
        .await?;

        self.get_notification(id).await
    }

    /// Get a notification by ID
    pub async fn get_notification(&self, notification_id: Uuid) -> AppResult<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, recipient, subject, body, reference_type, reference_id, read,
                   created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(notification_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification".to_string()))?;

        Ok(row.into())
    }

    /// List a recipient's notifications, newest first
    pub async fn list_notifications(&self, recipient: &str) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, recipient, subject, body, reference_type, reference_id, read,
                   created_at
            FROM notifications
            WHERE recipient = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(recipient)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Count unread notifications for a recipient
    pub async fn unread_count(&self, recipient: &str) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient = $1 AND read = FALSE",
        )
        .bind(recipient)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Mark a notification as read
    pub async fn mark_as_read(&self, recipient: &str, notification_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND recipient = $2",
        )
        .bind(notification_id)
        .bind(recipient)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification".to_string()));
        }
        Ok(())
    }

    /// Mark all of a recipient's notifications as read
    pub async fn mark_all_as_read(&self, recipient: &str) -> AppResult<i64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient = $1 AND read = FALSE",
        )
        .bind(recipient)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() as i64)
    }

    /// Remind project managers about submitted certificates past their due
    /// date. Returns the number of reminders queued.
    pub async fn trigger_payment_reminders(&self) -> AppResult<i32> {
        let today = Utc::now().date_naive();

        let overdue = sqlx::query_as::<_, (Uuid, Uuid, Decimal, chrono::NaiveDate)>(
            r#"
            SELECT id, project_id, net_payment_amount, payment_due_date
            FROM payment_certificates
            WHERE docstatus = 1 AND payment_due_date IS NOT NULL
              AND payment_due_date < $1
            "#,
        )
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        let mut sent = 0;
        for (certificate_id, project_id, net_payment_amount, due_date) in overdue {
            let project = sqlx::query_as::<_, (String, Option<String>)>(
                "SELECT name, manager_email FROM projects WHERE id = $1",
            )
            .bind(project_id)
            .fetch_optional(&self.db)
            .await?;

            let Some((project_name, Some(manager_email))) = project else {
                continue;
            };

            let days_overdue = (today - due_date).num_days();
            let message = payment_reminder_notification(
                &manager_email,
                certificate_id,
                &project_name,
                net_payment_amount,
                due_date,
                days_overdue,
            );
            self.queue(message).await?;
            sent += 1;
        }

        if sent > 0 {
            tracing::info!("Queued {} payment reminders", sent);
        }
        Ok(sent)
    }

    /// Warn project managers when a submitted cost plan consumes more of
    /// the approved budget than the configured threshold. Returns the
    /// number of alerts queued.
    pub async fn trigger_budget_alerts(&self) -> AppResult<i32> {
        let settings = SettingsService::new(self.db.clone()).get_settings().await?;
        if settings.budget_alert_threshold.is_zero() {
            return Ok(0);
        }

        let plans = sqlx::query_as::<_, (Uuid, Uuid, Decimal, Decimal)>(
            r#"
            SELECT id, project_id, total_project_cost, approved_budget
            FROM cost_plans
            WHERE docstatus = 1 AND approved_budget > 0
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut sent = 0;
        for (plan_id, project_id, total_project_cost, approved_budget) in plans {
            let consumed = round2(total_project_cost / approved_budget * Decimal::ONE_HUNDRED);
            if consumed < settings.budget_alert_threshold {
                continue;
            }

            let project = sqlx::query_as::<_, (String, Option<String>)>(
                "SELECT name, manager_email FROM projects WHERE id = $1",
            )
            .bind(project_id)
            .fetch_optional(&self.db)
            .await?;

            let Some((project_name, Some(manager_email))) = project else {
                continue;
            };

            let message =
                budget_alert_notification(&manager_email, plan_id, &project_name, consumed);
            self.queue(message).await?;
            sent += 1;
        }

        if sent > 0 {
            tracing::info!("Queued {} budget alerts", sent);
        }
        Ok(sent)
    }
}

//! HTTP handlers for in-app notifications

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::notification::NotificationService;
use crate::AppState;
use shared::Notification;

/// Unread count response
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// Trigger outcome response
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub queued: i32,
}

/// List the caller's notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    let service = NotificationService::new(state.db);
    let notifications = service.list_notifications(&current_user.0.email).await?;
    Ok(Json(notifications))
}

/// Count the caller's unread notifications
pub async fn unread_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.db);
    let unread = service.unread_count(&current_user.0.email).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// Mark one notification as read
pub async fn mark_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let service = NotificationService::new(state.db);
    service
        .mark_as_read(&current_user.0.email, notification_id)
        .await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// Mark all of the caller's notifications as read
pub async fn mark_all_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<serde_json::Value>> {
    let service = NotificationService::new(state.db);
    let updated = service.mark_all_as_read(&current_user.0.email).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}

/// Queue reminders for overdue payment certificates
pub async fn trigger_payment_reminders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<TriggerResponse>> {
    let service = NotificationService::new(state.db);
    let queued = service.trigger_payment_reminders().await?;
    Ok(Json(TriggerResponse { queued }))
}

/// Queue budget alerts for cost plans over the configured threshold
pub async fn trigger_budget_alerts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<TriggerResponse>> {
    let service = NotificationService::new(state.db);
    let queued = service.trigger_budget_alerts().await?;
    Ok(Json(TriggerResponse { queued }))
}

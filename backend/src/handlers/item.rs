//! HTTP handlers for the construction item catalog

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::item::{CreateItemInput, ItemService};
use crate::AppState;
use shared::{ConstructionItem, ItemRateHistoryEntry};

/// Filters for rate history
#[derive(Debug, Deserialize)]
pub struct RateHistoryQuery {
    pub project_id: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Create a catalog item
pub async fn create_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateItemInput>,
) -> AppResult<Json<ConstructionItem>> {
    let service = ItemService::new(state.db);
    let item = service.create_item(&current_user.0, input).await?;
    Ok(Json(item))
}

/// Get a catalog item
pub async fn get_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(item_code): Path<String>,
) -> AppResult<Json<ConstructionItem>> {
    let service = ItemService::new(state.db);
    let item = service.get_item(&item_code).await?;
    Ok(Json(item))
}

/// List enabled catalog items
pub async fn list_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<ConstructionItem>>> {
    let service = ItemService::new(state.db);
    let items = service.list_items().await?;
    Ok(Json(items))
}

/// Rate history for an item
pub async fn item_rate_history(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(item_code): Path<String>,
    Query(query): Query<RateHistoryQuery>,
) -> AppResult<Json<Vec<ItemRateHistoryEntry>>> {
    let service = ItemService::new(state.db);
    let history = service
        .rate_history(&item_code, query.project_id, query.limit.unwrap_or(10))
        .await?;
    Ok(Json(history))
}

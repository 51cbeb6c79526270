//! HTTP handlers for variation order endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::variation_order::{
    CreateVariationInput, UpdateVariationInput, VariationOrderService, VariationSummary,
};
use crate::AppState;
use shared::{BoqItem, VariationOrder};

/// Filters for listing variation orders
#[derive(Debug, Deserialize)]
pub struct VariationListQuery {
    pub project_id: Option<Uuid>,
}

/// Rejection payload
#[derive(Debug, Deserialize)]
pub struct RejectVariationInput {
    pub reason: Option<String>,
}

/// Create a draft variation order
pub async fn create_variation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateVariationInput>,
) -> AppResult<Json<VariationOrder>> {
    let service = VariationOrderService::new(state.db);
    let variation = service.create_variation(&current_user.0, input).await?;
    Ok(Json(variation))
}

/// Get a variation order with its items
pub async fn get_variation(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(variation_id): Path<Uuid>,
) -> AppResult<Json<VariationOrder>> {
    let service = VariationOrderService::new(state.db);
    let variation = service.get_variation(variation_id).await?;
    Ok(Json(variation))
}

/// List variation order headers
pub async fn list_variations(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<VariationListQuery>,
) -> AppResult<Json<Vec<VariationSummary>>> {
    let service = VariationOrderService::new(state.db);
    let variations = service.list_variations(query.project_id).await?;
    Ok(Json(variations))
}

/// Update a draft variation order
pub async fn update_variation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(variation_id): Path<Uuid>,
    Json(input): Json<UpdateVariationInput>,
) -> AppResult<Json<VariationOrder>> {
    let service = VariationOrderService::new(state.db);
    let variation = service
        .update_variation(&current_user.0, variation_id, input)
        .await?;
    Ok(Json(variation))
}

/// Submit a draft variation order
pub async fn submit_variation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(variation_id): Path<Uuid>,
) -> AppResult<Json<VariationOrder>> {
    let service = VariationOrderService::new(state.db);
    let variation = service.submit_variation(&current_user.0, variation_id).await?;
    Ok(Json(variation))
}

/// Cancel a submitted variation order
pub async fn cancel_variation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(variation_id): Path<Uuid>,
) -> AppResult<Json<VariationOrder>> {
    let service = VariationOrderService::new(state.db);
    let variation = service.cancel_variation(&current_user.0, variation_id).await?;
    Ok(Json(variation))
}

/// Approve a submitted variation order
pub async fn approve_variation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(variation_id): Path<Uuid>,
) -> AppResult<Json<VariationOrder>> {
    let service = VariationOrderService::new(state.db);
    let variation = service.approve_variation(&current_user.0, variation_id).await?;
    Ok(Json(variation))
}

/// Reject a submitted variation order
pub async fn reject_variation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(variation_id): Path<Uuid>,
    Json(input): Json<RejectVariationInput>,
) -> AppResult<Json<VariationOrder>> {
    let service = VariationOrderService::new(state.db);
    let variation = service
        .reject_variation(&current_user.0, variation_id, input.reason)
        .await?;
    Ok(Json(variation))
}

/// BoQ items available for pricing a variation
pub async fn boq_items_for_variation(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
) -> AppResult<Json<Vec<BoqItem>>> {
    let service = VariationOrderService::new(state.db);
    let items = service.boq_items_for_variation(boq_id).await?;
    Ok(Json(items))
}

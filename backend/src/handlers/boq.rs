//! HTTP handlers for Bill of Quantities endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::boq::{BoqService, BoqSummary, CreateBoqInput, UpdateBoqInput};
use crate::AppState;
use shared::{BillOfQuantities, BoqItem};

/// Filters for listing BoQs
#[derive(Debug, Deserialize)]
pub struct BoqListQuery {
    pub project_id: Option<Uuid>,
}

/// Create a draft BoQ
pub async fn create_boq(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateBoqInput>,
) -> AppResult<Json<BillOfQuantities>> {
    let service = BoqService::new(state.db);
    let boq = service.create_boq(&current_user.0, input).await?;
    Ok(Json(boq))
}

/// Get a BoQ with its items
pub async fn get_boq(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
) -> AppResult<Json<BillOfQuantities>> {
    let service = BoqService::new(state.db);
    let boq = service.get_boq(boq_id).await?;
    Ok(Json(boq))
}

/// List BoQ headers
pub async fn list_boqs(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<BoqListQuery>,
) -> AppResult<Json<Vec<BoqSummary>>> {
    let service = BoqService::new(state.db);
    let boqs = service.list_boqs(query.project_id).await?;
    Ok(Json(boqs))
}

/// Update a draft BoQ
pub async fn update_boq(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
    Json(input): Json<UpdateBoqInput>,
) -> AppResult<Json<BillOfQuantities>> {
    let service = BoqService::new(state.db);
    let boq = service.update_boq(&current_user.0, boq_id, input).await?;
    Ok(Json(boq))
}

/// Submit a draft BoQ
pub async fn submit_boq(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
) -> AppResult<Json<BillOfQuantities>> {
    let service = BoqService::new(state.db);
    let boq = service.submit_boq(&current_user.0, boq_id).await?;
    Ok(Json(boq))
}

/// Cancel a submitted BoQ
pub async fn cancel_boq(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
) -> AppResult<Json<BillOfQuantities>> {
    let service = BoqService::new(state.db);
    let boq = service.cancel_boq(&current_user.0, boq_id).await?;
    Ok(Json(boq))
}

/// Duplicate a BoQ as a new draft with quantities reset
pub async fn duplicate_boq(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
) -> AppResult<Json<BillOfQuantities>> {
    let service = BoqService::new(state.db);
    let boq = service.duplicate_boq(&current_user.0, boq_id).await?;
    Ok(Json(boq))
}

/// Get the line items of a BoQ
pub async fn get_boq_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
) -> AppResult<Json<Vec<BoqItem>>> {
    let service = BoqService::new(state.db);
    let items = service.get_boq_items(boq_id).await?;
    Ok(Json(items))
}

//! HTTP handlers for valuation endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::valuation::{
    BoqItemForValuation, CreateValuationInput, UpdateValuationInput, ValuationService,
    ValuationSummary,
};
use crate::AppState;
use shared::{PreviousItemTotals, Valuation};

/// Filters for listing valuations
#[derive(Debug, Deserialize)]
pub struct ValuationListQuery {
    pub boq_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

/// Filters for previous valuation data
#[derive(Debug, Deserialize)]
pub struct PreviousDataQuery {
    pub exclude: Option<Uuid>,
}

/// Previous total response
#[derive(Debug, Serialize)]
pub struct PreviousTotalResponse {
    pub previous_total: Decimal,
}

/// Create a draft valuation
pub async fn create_valuation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateValuationInput>,
) -> AppResult<Json<Valuation>> {
    let service = ValuationService::new(state.db);
    let valuation = service.create_valuation(&current_user.0, input).await?;
    Ok(Json(valuation))
}

/// Get a valuation with its items
pub async fn get_valuation(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(valuation_id): Path<Uuid>,
) -> AppResult<Json<Valuation>> {
    let service = ValuationService::new(state.db);
    let valuation = service.get_valuation(valuation_id).await?;
    Ok(Json(valuation))
}

/// List valuation headers
pub async fn list_valuations(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ValuationListQuery>,
) -> AppResult<Json<Vec<ValuationSummary>>> {
    let service = ValuationService::new(state.db);
    let valuations = service.list_valuations(query.boq_id, query.project_id).await?;
    Ok(Json(valuations))
}

/// Update a draft valuation
pub async fn update_valuation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(valuation_id): Path<Uuid>,
    Json(input): Json<UpdateValuationInput>,
) -> AppResult<Json<Valuation>> {
    let service = ValuationService::new(state.db);
    let valuation = service
        .update_valuation(&current_user.0, valuation_id, input)
        .await?;
    Ok(Json(valuation))
}

/// Submit a draft valuation
pub async fn submit_valuation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(valuation_id): Path<Uuid>,
) -> AppResult<Json<Valuation>> {
    let service = ValuationService::new(state.db);
    let valuation = service.submit_valuation(&current_user.0, valuation_id).await?;
    Ok(Json(valuation))
}

/// Cancel a submitted valuation
pub async fn cancel_valuation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(valuation_id): Path<Uuid>,
) -> AppResult<Json<Valuation>> {
    let service = ValuationService::new(state.db);
    let valuation = service.cancel_valuation(&current_user.0, valuation_id).await?;
    Ok(Json(valuation))
}

/// BoQ items with contract quantities for valuation entry
pub async fn boq_items_for_valuation(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
) -> AppResult<Json<Vec<BoqItemForValuation>>> {
    let service = ValuationService::new(state.db);
    let items = service.boq_items_for_valuation(boq_id).await?;
    Ok(Json(items))
}

/// Sum of current valuations of other submitted valuations on the BoQ
pub async fn previous_valuation_total(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
    Query(query): Query<PreviousDataQuery>,
) -> AppResult<Json<PreviousTotalResponse>> {
    let service = ValuationService::new(state.db);
    let previous_total = service.previous_total(boq_id, query.exclude).await?;
    Ok(Json(PreviousTotalResponse { previous_total }))
}

/// Previous cumulative measurements per item code on the BoQ
pub async fn previous_valuation_data(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
    Query(query): Query<PreviousDataQuery>,
) -> AppResult<Json<Vec<PreviousItemTotals>>> {
    let service = ValuationService::new(state.db);
    let data = service.previous_item_totals(boq_id, query.exclude).await?;
    Ok(Json(data))
}

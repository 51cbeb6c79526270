//! HTTP handlers for cost plan endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::cost_plan::{
    CostPlanService, CostPlanSummary, CreateCostPlanInput, UpdateCostPlanInput,
};
use crate::AppState;
use shared::{BillOfQuantities, CostAnalysisRow, CostPlan};

/// Filters for listing cost plans
#[derive(Debug, Deserialize)]
pub struct CostPlanListQuery {
    pub project_id: Option<Uuid>,
}

/// Create a draft cost plan
pub async fn create_cost_plan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCostPlanInput>,
) -> AppResult<Json<CostPlan>> {
    let service = CostPlanService::new(state.db);
    let plan = service.create_cost_plan(&current_user.0, input).await?;
    Ok(Json(plan))
}

/// Get a cost plan with its items
pub async fn get_cost_plan(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(plan_id): Path<Uuid>,
) -> AppResult<Json<CostPlan>> {
    let service = CostPlanService::new(state.db);
    let plan = service.get_cost_plan(plan_id).await?;
    Ok(Json(plan))
}

/// List cost plan headers
pub async fn list_cost_plans(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<CostPlanListQuery>,
) -> AppResult<Json<Vec<CostPlanSummary>>> {
    let service = CostPlanService::new(state.db);
    let plans = service.list_cost_plans(query.project_id).await?;
    Ok(Json(plans))
}

/// Update a draft cost plan
pub async fn update_cost_plan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plan_id): Path<Uuid>,
    Json(input): Json<UpdateCostPlanInput>,
) -> AppResult<Json<CostPlan>> {
    let service = CostPlanService::new(state.db);
    let plan = service.update_cost_plan(&current_user.0, plan_id, input).await?;
    Ok(Json(plan))
}

/// Submit a draft cost plan
pub async fn submit_cost_plan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plan_id): Path<Uuid>,
) -> AppResult<Json<CostPlan>> {
    let service = CostPlanService::new(state.db);
    let plan = service.submit_cost_plan(&current_user.0, plan_id).await?;
    Ok(Json(plan))
}

/// Cancel a submitted cost plan
pub async fn cancel_cost_plan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plan_id): Path<Uuid>,
) -> AppResult<Json<CostPlan>> {
    let service = CostPlanService::new(state.db);
    let plan = service.cancel_cost_plan(&current_user.0, plan_id).await?;
    Ok(Json(plan))
}

/// Create a draft BoQ from a submitted cost plan
pub async fn create_boq_from_cost_plan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plan_id): Path<Uuid>,
) -> AppResult<Json<BillOfQuantities>> {
    let service = CostPlanService::new(state.db);
    let boq = service.create_boq_from_cost_plan(&current_user.0, plan_id).await?;
    Ok(Json(boq))
}

/// Plan vs contract vs certified analysis for a project
pub async fn cost_analysis(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<Vec<CostAnalysisRow>>> {
    let service = CostPlanService::new(state.db);
    let rows = service.cost_analysis(project_id).await?;
    Ok(Json(rows))
}

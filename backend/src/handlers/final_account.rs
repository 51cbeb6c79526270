//! HTTP handlers for final account endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::final_account::{
    CreateFinalAccountInput, FinalAccountService, FinalAccountSummary, UpdateFinalAccountInput,
};
use crate::AppState;
use shared::{FinalAccount, FinalAccountAnalysis, PaymentCertificate};

/// Filters for listing final accounts
#[derive(Debug, Deserialize)]
pub struct FinalAccountListQuery {
    pub project_id: Option<Uuid>,
}

/// Create a draft final account
pub async fn create_final_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateFinalAccountInput>,
) -> AppResult<Json<FinalAccount>> {
    let service = FinalAccountService::new(state.db);
    let account = service.create_final_account(&current_user.0, input).await?;
    Ok(Json(account))
}

/// Get a final account with its items
pub async fn get_final_account(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<FinalAccount>> {
    let service = FinalAccountService::new(state.db);
    let account = service.get_final_account(account_id).await?;
    Ok(Json(account))
}

/// List final account headers
pub async fn list_final_accounts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<FinalAccountListQuery>,
) -> AppResult<Json<Vec<FinalAccountSummary>>> {
    let service = FinalAccountService::new(state.db);
    let accounts = service.list_final_accounts(query.project_id).await?;
    Ok(Json(accounts))
}

/// Update a draft final account
pub async fn update_final_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
    Json(input): Json<UpdateFinalAccountInput>,
) -> AppResult<Json<FinalAccount>> {
    let service = FinalAccountService::new(state.db);
    let account = service
        .update_final_account(&current_user.0, account_id, input)
        .await?;
    Ok(Json(account))
}

/// Submit a final account for review
pub async fn submit_final_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<FinalAccount>> {
    let service = FinalAccountService::new(state.db);
    let account = service.submit_final_account(&current_user.0, account_id).await?;
    Ok(Json(account))
}

/// Record agreement of a final account
pub async fn agree_final_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<FinalAccount>> {
    let service = FinalAccountService::new(state.db);
    let account = service.agree_final_account(&current_user.0, account_id).await?;
    Ok(Json(account))
}

/// Cancel a submitted final account
pub async fn cancel_final_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<FinalAccount>> {
    let service = FinalAccountService::new(state.db);
    let account = service.cancel_final_account(&current_user.0, account_id).await?;
    Ok(Json(account))
}

/// Load the project's BoQ lines into the final account
pub async fn load_project_data(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<FinalAccount>> {
    let service = FinalAccountService::new(state.db);
    let account = service.load_project_data(&current_user.0, account_id).await?;
    Ok(Json(account))
}

/// Cost variance analysis with per-category breakdown
pub async fn final_account_analysis(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<FinalAccountAnalysis>> {
    let service = FinalAccountService::new(state.db);
    let analysis = service.cost_analysis(account_id).await?;
    Ok(Json(analysis))
}

/// Create the closing payment certificate from an agreed final account
pub async fn create_final_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<PaymentCertificate>> {
    let service = FinalAccountService::new(state.db);
    let certificate = service.create_final_payment(&current_user.0, account_id).await?;
    Ok(Json(certificate))
}

//! HTTP handlers for tender endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::tender::{
    CreatePackageInput, CreateQuoteInput, PackageSummary, TenderService, UpdatePackageInput,
    UpdateQuoteInput,
};
use crate::AppState;
use shared::{QuoteComparison, TenderPackage, TenderQuote};

/// Filters for listing tender packages
#[derive(Debug, Deserialize)]
pub struct PackageListQuery {
    pub project_id: Option<Uuid>,
}

/// Create a draft tender package
pub async fn create_tender_package(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePackageInput>,
) -> AppResult<Json<TenderPackage>> {
    let service = TenderService::new(state.db);
    let package = service.create_package(&current_user.0, input).await?;
    Ok(Json(package))
}

/// Get a tender package
pub async fn get_tender_package(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(package_id): Path<Uuid>,
) -> AppResult<Json<TenderPackage>> {
    let service = TenderService::new(state.db);
    let package = service.get_package(package_id).await?;
    Ok(Json(package))
}

/// List tender package headers
pub async fn list_tender_packages(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<PackageListQuery>,
) -> AppResult<Json<Vec<PackageSummary>>> {
    let service = TenderService::new(state.db);
    let packages = service.list_packages(query.project_id).await?;
    Ok(Json(packages))
}

/// Update a draft tender package
pub async fn update_tender_package(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(package_id): Path<Uuid>,
    Json(input): Json<UpdatePackageInput>,
) -> AppResult<Json<TenderPackage>> {
    let service = TenderService::new(state.db);
    let package = service.update_package(&current_user.0, package_id, input).await?;
    Ok(Json(package))
}

/// Publish a draft tender package
pub async fn submit_tender_package(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(package_id): Path<Uuid>,
) -> AppResult<Json<TenderPackage>> {
    let service = TenderService::new(state.db);
    let package = service.submit_package(&current_user.0, package_id).await?;
    Ok(Json(package))
}

/// Cancel a published tender package
pub async fn cancel_tender_package(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(package_id): Path<Uuid>,
) -> AppResult<Json<TenderPackage>> {
    let service = TenderService::new(state.db);
    let package = service.cancel_package(&current_user.0, package_id).await?;
    Ok(Json(package))
}

/// Award the tender to the winning contractor
pub async fn award_tender_package(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(package_id): Path<Uuid>,
) -> AppResult<Json<TenderPackage>> {
    let service = TenderService::new(state.db);
    let package = service.award_package(&current_user.0, package_id).await?;
    Ok(Json(package))
}

/// Quote comparison sorted by amount
pub async fn tender_comparison(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(package_id): Path<Uuid>,
) -> AppResult<Json<Vec<QuoteComparison>>> {
    let service = TenderService::new(state.db);
    let comparison = service.quote_comparison(package_id).await?;
    Ok(Json(comparison))
}

/// Create a draft quote against a package
pub async fn create_tender_quote(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateQuoteInput>,
) -> AppResult<Json<TenderQuote>> {
    let service = TenderService::new(state.db);
    let quote = service.create_quote(&current_user.0, input).await?;
    Ok(Json(quote))
}

/// Get a quote with its items
pub async fn get_tender_quote(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(quote_id): Path<Uuid>,
) -> AppResult<Json<TenderQuote>> {
    let service = TenderService::new(state.db);
    let quote = service.get_quote(quote_id).await?;
    Ok(Json(quote))
}

/// List quotes for a package
pub async fn list_tender_quotes(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(package_id): Path<Uuid>,
) -> AppResult<Json<Vec<TenderQuote>>> {
    let service = TenderService::new(state.db);
    let quotes = service.list_quotes(package_id).await?;
    Ok(Json(quotes))
}

/// Update a draft quote
pub async fn update_tender_quote(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(quote_id): Path<Uuid>,
    Json(input): Json<UpdateQuoteInput>,
) -> AppResult<Json<TenderQuote>> {
    let service = TenderService::new(state.db);
    let quote = service.update_quote(&current_user.0, quote_id, input).await?;
    Ok(Json(quote))
}

/// Submit a quote before the package deadline
pub async fn submit_tender_quote(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(quote_id): Path<Uuid>,
) -> AppResult<Json<TenderQuote>> {
    let service = TenderService::new(state.db);
    let quote = service.submit_quote(&current_user.0, quote_id).await?;
    Ok(Json(quote))
}

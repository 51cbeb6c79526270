//! HTTP handlers for reports and dashboard rollups

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{BoqSummaryRow, ReportingService};
use crate::AppState;
use shared::{
    PaymentCertificateSummaryRow, ProjectFinancialSummary, ValuationProgressPoint,
    VariationAnalysis,
};

/// Financial summary of a project
pub async fn project_financial_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<ProjectFinancialSummary>> {
    let service = ReportingService::new(state.db);
    let summary = service.project_financial_summary(project_id).await?;
    Ok(Json(summary))
}

/// Per-BoQ totals for a project
pub async fn boq_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<Vec<BoqSummaryRow>>> {
    let service = ReportingService::new(state.db);
    let rows = service.boq_summary(project_id).await?;
    Ok(Json(rows))
}

/// Valuation progress against a BoQ
pub async fn valuation_progress(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
) -> AppResult<Json<Vec<ValuationProgressPoint>>> {
    let service = ReportingService::new(state.db);
    let points = service.valuation_progress(boq_id).await?;
    Ok(Json(points))
}

/// Variation orders grouped by approval outcome
pub async fn variation_analysis(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<VariationAnalysis>> {
    let service = ReportingService::new(state.db);
    let analysis = service.variation_analysis(project_id).await?;
    Ok(Json(analysis))
}

/// Certificate summary rows for a project
pub async fn payment_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<Vec<PaymentCertificateSummaryRow>>> {
    let service = ReportingService::new(state.db);
    let rows = service.payment_summary(project_id).await?;
    Ok(Json(rows))
}

/// Export a project's financial summary as CSV
pub async fn export_financial_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db);
    let csv = service.export_financial_summary_csv(project_id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/csv")],
        csv,
    ))
}

/// Export a BoQ's items as CSV
pub async fn export_boq(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(boq_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db);
    let csv = service.export_boq_csv(boq_id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/csv")],
        csv,
    ))
}

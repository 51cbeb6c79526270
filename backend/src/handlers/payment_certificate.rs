//! HTTP handlers for payment certificate endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::payment_certificate::{
    CertificateSummary, CreateCertificateInput, PaymentCertificateService,
    UpdateCertificateInput,
};
use crate::AppState;
use shared::PaymentCertificate;

/// Filters for listing certificates
#[derive(Debug, Deserialize)]
pub struct CertificateListQuery {
    pub project_id: Option<Uuid>,
}

/// Previous payments response
#[derive(Debug, Serialize)]
pub struct PreviousPaymentsResponse {
    pub previous_payments: Decimal,
}

/// Retention rate response
#[derive(Debug, Serialize)]
pub struct RetentionRateResponse {
    pub retention_percentage: Decimal,
}

/// Create a draft payment certificate
pub async fn create_certificate(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCertificateInput>,
) -> AppResult<Json<PaymentCertificate>> {
    let service = PaymentCertificateService::new(state.db);
    let certificate = service.create_certificate(&current_user.0, input).await?;
    Ok(Json(certificate))
}

/// Get a payment certificate
pub async fn get_certificate(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(certificate_id): Path<Uuid>,
) -> AppResult<Json<PaymentCertificate>> {
    let service = PaymentCertificateService::new(state.db);
    let certificate = service.get_certificate(certificate_id).await?;
    Ok(Json(certificate))
}

/// List certificate headers
pub async fn list_certificates(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<CertificateListQuery>,
) -> AppResult<Json<Vec<CertificateSummary>>> {
    let service = PaymentCertificateService::new(state.db);
    let certificates = service.list_certificates(query.project_id).await?;
    Ok(Json(certificates))
}

/// Update a draft certificate
pub async fn update_certificate(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(certificate_id): Path<Uuid>,
    Json(input): Json<UpdateCertificateInput>,
) -> AppResult<Json<PaymentCertificate>> {
    let service = PaymentCertificateService::new(state.db);
    let certificate = service
        .update_certificate(&current_user.0, certificate_id, input)
        .await?;
    Ok(Json(certificate))
}

/// Submit a certificate
pub async fn submit_certificate(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(certificate_id): Path<Uuid>,
) -> AppResult<Json<PaymentCertificate>> {
    let service = PaymentCertificateService::new(state.db);
    let certificate = service
        .submit_certificate(&current_user.0, certificate_id)
        .await?;
    Ok(Json(certificate))
}

/// Cancel a submitted certificate
pub async fn cancel_certificate(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(certificate_id): Path<Uuid>,
) -> AppResult<Json<PaymentCertificate>> {
    let service = PaymentCertificateService::new(state.db);
    let certificate = service
        .cancel_certificate(&current_user.0, certificate_id)
        .await?;
    Ok(Json(certificate))
}

/// Total net payments already certified for a project
pub async fn get_previous_payments(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<PreviousPaymentsResponse>> {
    let service = PaymentCertificateService::new(state.db);
    let previous_payments = service.previous_payments(project_id).await?;
    Ok(Json(PreviousPaymentsResponse { previous_payments }))
}

/// Retention rate for a project
pub async fn get_project_retention_rate(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<RetentionRateResponse>> {
    let service = PaymentCertificateService::new(state.db);
    let retention_percentage = service.project_retention_rate(project_id).await?;
    Ok(Json(RetentionRateResponse { retention_percentage }))
}

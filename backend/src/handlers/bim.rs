//! HTTP handlers for BIM import

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::bim::{BimImportInput, BimService};
use crate::AppState;
use shared::BimImportSummary;

/// Create a draft BoQ from extracted building elements
pub async fn import_bim_elements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<BimImportInput>,
) -> AppResult<Json<BimImportSummary>> {
    let service = BimService::new(state.db);
    let summary = service.import_elements(&current_user.0, input).await?;
    Ok(Json(summary))
}

//! HTTP handlers for module settings

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::settings::{SettingsService, UpdateSettingsInput};
use crate::AppState;
use shared::QuantitySurveySettings;

/// Get the module settings
pub async fn get_settings(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<QuantitySurveySettings>> {
    let service = SettingsService::new(state.db);
    let settings = service.get_settings().await?;
    Ok(Json(settings))
}

/// Update the module settings
pub async fn update_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateSettingsInput>,
) -> AppResult<Json<QuantitySurveySettings>> {
    let service = SettingsService::new(state.db);
    let settings = service.update_settings(&current_user.0, input).await?;
    Ok(Json(settings))
}

//! HTTP handlers for rate suggestion

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::rate_suggestion::{RateSuggestionQuery, RateSuggestionService};
use crate::AppState;
use shared::RateSuggestion;

/// Suggested defaults for an item based on historical data
pub async fn intelligent_defaults(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<RateSuggestionQuery>,
) -> AppResult<Json<RateSuggestion>> {
    let service = RateSuggestionService::new(state.db);
    let suggestion = service.intelligent_defaults(query).await?;
    Ok(Json(suggestion))
}

//! HTTP handlers for project endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::project::{CreateProjectInput, ProjectService, UpdateProjectInput};
use crate::AppState;
use shared::Project;

/// Create a project
pub async fn create_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProjectInput>,
) -> AppResult<Json<Project>> {
    let service = ProjectService::new(state.db);
    let project = service.create_project(&current_user.0, input).await?;
    Ok(Json(project))
}

/// Get a project
pub async fn get_project(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<Project>> {
    let service = ProjectService::new(state.db);
    let project = service.get_project(project_id).await?;
    Ok(Json(project))
}

/// List projects
pub async fn list_projects(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Project>>> {
    let service = ProjectService::new(state.db);
    let projects = service.list_projects().await?;
    Ok(Json(projects))
}

/// Update a project
pub async fn update_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(project_id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> AppResult<Json<Project>> {
    let service = ProjectService::new(state.db);
    let project = service.update_project(&current_user.0, project_id, input).await?;
    Ok(Json(project))
}

//! Project service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::{Project, ProjectStatus};

/// Service for the projects that survey documents attach to
#[derive(Clone)]
pub struct ProjectService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    status: String,
    project_type: Option<String>,
    location: Option<String>,
    company: Option<String>,
    manager_email: Option<String>,
    contract_value: Decimal,
    retention_percentage: Decimal,
    percent_complete: Decimal,
    total_certified_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            status: ProjectStatus::from_str(&row.status).unwrap_or_default(),
            project_type: row.project_type,
            location: row.location,
            company: row.company,
            manager_email: row.manager_email,
            contract_value: row.contract_value,
            retention_percentage: row.retention_percentage,
            percent_complete: row.percent_complete,
            total_certified_amount: row.total_certified_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a project
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectInput {
    #[validate(length(min = 1, max = 140))]
    pub name: String,
    pub project_type: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    #[validate(email)]
    pub manager_email: Option<String>,
    #[serde(default)]
    pub contract_value: Decimal,
    #[serde(default)]
    pub retention_percentage: Decimal,
}

/// Input for updating a project
#[derive(Debug, Deserialize)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub project_type: Option<String>,
    pub location: Option<String>,
    pub manager_email: Option<String>,
    pub contract_value: Option<Decimal>,
    pub retention_percentage: Option<Decimal>,
}

impl ProjectService {
    /// Create a new ProjectService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a project
    pub async fn create_project(
        &self,
        user: &AuthUser,
        input: CreateProjectInput,
    ) -> AppResult<Project> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        if !input.retention_percentage.is_zero() {
            shared::validate_retention_percentage(input.retention_percentage)
                .map_err(|msg| AppError::validation("retention_percentage", msg))?;
        }

        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO projects (
                id, name, status, project_type, location, company, manager_email,
                contract_value, retention_percentage, percent_complete,
                total_certified_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, 0)
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(ProjectStatus::Open.as_str())
        .bind(&input.project_type)
        .bind(&input.location)
        .bind(input.company.as_ref().or(user.company.as_ref()))
        .bind(&input.manager_email)
        .bind(input.contract_value)
        .bind(input.retention_percentage)
        .execute(&self.db)
        .await?;

        tracing::info!("Created project {}", id);
        self.get_project(id).await
    }

    /// Get a project by ID
    pub async fn get_project(&self, project_id: Uuid) -> AppResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, status, project_type, location, company, manager_email,
                   contract_value, retention_percentage, percent_complete,
                   total_certified_amount, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

        Ok(row.into())
    }

    /// List projects
    pub async fn list_projects(&self) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, status, project_type, location, company, manager_email,
                   contract_value, retention_percentage, percent_complete,
                   total_certified_amount, created_at, updated_at
            FROM projects
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Update a project
    pub async fn update_project(
        &self,
        _user: &AuthUser,
        project_id: Uuid,
        input: UpdateProjectInput,
    ) -> AppResult<Project> {
        let mut project = self.get_project(project_id).await?;

        if let Some(name) = input.name {
            project.name = name;
        }
        if let Some(status) = input.status {
            project.status = status;
        }
        if let Some(kind) = input.project_type {
            project.project_type = Some(kind);
        }
        if let Some(location) = input.location {
            project.location = Some(location);
        }
        if let Some(email) = input.manager_email {
            shared::validate_email(&email)
                .map_err(|msg| AppError::validation("manager_email", msg))?;
            project.manager_email = Some(email);
        }
        if let Some(value) = input.contract_value {
            project.contract_value = value;
        }
        if let Some(pct) = input.retention_percentage {
            shared::validate_retention_percentage(pct)
                .map_err(|msg| AppError::validation("retention_percentage", msg))?;
            project.retention_percentage = pct;
        }

        sqlx::query(
            r#"
            UPDATE projects
            SET name = $2, status = $3, project_type = $4, location = $5,
                manager_email = $6, contract_value = $7, retention_percentage = $8,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(project.status.as_str())
        .bind(&project.project_type)
        .bind(&project.location)
        .bind(&project.manager_email)
        .bind(project.contract_value)
        .bind(project.retention_percentage)
        .execute(&self.db)
        .await?;

        self.get_project(project_id).await
    }
}

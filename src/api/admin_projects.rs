//! Admin project endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::{created, ApiResult, DataResponse};
use crate::models::{CreateProjectRequest, Project, UpdateProjectRequest};
use crate::AppState;

/// POST /api/admin/projects - Create a project.
pub async fn create_project(
    State(state): State<AppState>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, DataResponse<Project>)> {
    let Json(request) = body?;
    let project = state.projects.create(request).await?;
    Ok(created(project))
}

/// PUT /api/admin/projects/{id} - Partial update.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<DataResponse<Project>> {
    let Json(request) = body?;
    let project = state.projects.update(&id, request).await?;
    Ok(DataResponse::new(project))
}

/// DELETE /api/admin/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.projects.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Public project endpoints.

use axum::extract::{rejection::QueryRejection, Path, Query, State};

use super::{ApiResult, DataResponse, ListResponse, QueryPairs};
use crate::models::Project;
use crate::query::{FeaturedParams, ListParams, ListQuery, PageMeta};
use crate::AppState;

/// GET /api/projects - List projects.
pub async fn list_projects(
    State(state): State<AppState>,
    params: Result<QueryPairs, QueryRejection>,
) -> ApiResult<ListResponse<Project>> {
    let Query(pairs) = params?;
    let query = ListQuery::from_params(&pairs.into_iter().collect::<ListParams>());
    let (projects, total) = state.projects.list(&query).await?;
    Ok(ListResponse::new(projects, PageMeta::paged(&query, total)))
}

/// GET /api/projects/featured - Newest featured projects.
pub async fn list_featured_projects(
    State(state): State<AppState>,
    params: Result<QueryPairs, QueryRejection>,
) -> ApiResult<ListResponse<Project>> {
    let Query(pairs) = params?;
    let limit = pairs.into_iter().collect::<FeaturedParams>().limit();
    let projects = state.projects.featured(limit).await?;
    Ok(ListResponse::featured(projects, limit))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DataResponse<Project>> {
    Ok(DataResponse::new(state.projects.get_by_id(&id).await?))
}

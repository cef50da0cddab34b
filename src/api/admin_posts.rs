//! Admin post endpoints: full CRUD plus the publish transitions.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use super::{created, ApiResult, DataResponse, ListResponse, QueryPairs};
use crate::models::{CreatePostRequest, Post, UpdatePostRequest};
use crate::query::{ListParams, ListQuery, PageMeta};
use crate::AppState;

/// GET /api/admin/blog/posts - List posts of every status.
pub async fn list_all_posts(
    State(state): State<AppState>,
    params: Result<QueryPairs, QueryRejection>,
) -> ApiResult<ListResponse<Post>> {
    let Query(pairs) = params?;
    let query = ListQuery::from_params(&pairs.into_iter().collect::<ListParams>());
    let (posts, total) = state.posts.list_all(&query).await?;
    Ok(ListResponse::new(posts, PageMeta::paged(&query, total)))
}

/// GET /api/admin/blog/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DataResponse<Post>> {
    Ok(DataResponse::new(state.posts.get_by_id(&id).await?))
}

/// POST /api/admin/blog/posts - Create a post.
pub async fn create_post(
    State(state): State<AppState>,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, DataResponse<Post>)> {
    let Json(request) = body?;
    let post = state.posts.create(request).await?;
    Ok(created(post))
}

/// PUT /api/admin/blog/posts/{id} - Partial update.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> ApiResult<DataResponse<Post>> {
    let Json(request) = body?;
    let post = state.posts.update(&id, request).await?;
    Ok(DataResponse::new(post))
}

/// DELETE /api/admin/blog/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.posts.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/admin/blog/posts/{id}/publish
pub async fn publish_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DataResponse<Post>> {
    Ok(DataResponse::new(state.posts.publish(&id).await?))
}

/// PATCH /api/admin/blog/posts/{id}/unpublish
pub async fn unpublish_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DataResponse<Post>> {
    Ok(DataResponse::new(state.posts.unpublish(&id).await?))
}

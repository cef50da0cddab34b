//! Public blog endpoints. Only published posts are reachable here.

use axum::extract::{rejection::QueryRejection, Path, Query, State};

use super::{ApiResult, DataResponse, ListResponse, QueryPairs};
use crate::models::Post;
use crate::query::{FeaturedParams, ListParams, ListQuery, PageMeta};
use crate::AppState;

/// GET /api/blog/posts - List published posts.
pub async fn list_published_posts(
    State(state): State<AppState>,
    params: Result<QueryPairs, QueryRejection>,
) -> ApiResult<ListResponse<Post>> {
    let Query(pairs) = params?;
    let query = ListQuery::from_params(&pairs.into_iter().collect::<ListParams>());
    let (posts, total) = state.posts.list_published(&query).await?;
    Ok(ListResponse::new(posts, PageMeta::paged(&query, total)))
}

/// GET /api/blog/featured - Newest featured posts.
pub async fn list_featured_posts(
    State(state): State<AppState>,
    params: Result<QueryPairs, QueryRejection>,
) -> ApiResult<ListResponse<Post>> {
    let Query(pairs) = params?;
    let limit = pairs.into_iter().collect::<FeaturedParams>().limit();
    let posts = state.posts.featured(limit).await?;
    Ok(ListResponse::featured(posts, limit))
}

/// GET /api/blog/posts/{slug} - A published post by slug.
pub async fn get_published_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<DataResponse<Post>> {
    let post = state.posts.get_published_by_slug(&slug).await?;
    Ok(DataResponse::new(post))
}

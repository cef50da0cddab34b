//! REST API module.
//!
//! Public blog and project routes plus the admin routes mounted behind the
//! bearer-token guard. Handlers translate HTTP into service calls and wrap the
//! results in the response envelopes below.

mod admin_posts;
mod admin_projects;
mod posts;
mod projects;

pub use admin_posts::*;
pub use admin_projects::*;
pub use posts::*;
pub use projects::*;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::query::PageMeta;

/// Single-entity envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for DataResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Listing envelope: `{"data": [...], "meta": {...}}`.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, meta: PageMeta) -> Self {
        Self { data, meta }
    }

    /// Envelope for a featured listing, which is never paginated.
    pub fn featured(data: Vec<T>, limit: u32) -> Self {
        let meta = PageMeta::featured(data.len(), limit);
        Self { data, meta }
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Raw query string pairs, in order and with repeats. Typed parameter
/// structs are collected from these so no key shape is ever rejected.
pub type QueryPairs = Query<Vec<(String, String)>>;

/// Result type shared by every handler.
pub type ApiResult<T> = Result<T, crate::errors::AppError>;

/// 201 response for a freshly created entity.
pub fn created<T: Serialize>(data: T) -> (StatusCode, DataResponse<T>) {
    (StatusCode::CREATED, DataResponse::new(data))
}

//! Bearer-token guard for the admin routes.
//!
//! Token issuance lives elsewhere; this layer only checks the presented token
//! against the configured one, in constant time.

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Admin guard layer function that takes the expected token as a parameter.
pub async fn admin_auth_layer(
    expected_token: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // No token configured: the guard is disabled (dev mode)
    let Some(expected) = expected_token else {
        return next.run(request).await;
    };

    let verdict = bearer_token(&request).map(|token| constant_time_compare(token, &expected));

    match verdict {
        Some(true) => next.run(request).await,
        Some(false) => {
            tracing::warn!(path = %request.uri().path(), "Rejected admin request: invalid token");
            unauthorized_response("Invalid bearer token")
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "Rejected admin request: missing token");
            unauthorized_response("Missing bearer token")
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

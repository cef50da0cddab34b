//! Portfolio Backend
//!
//! REST backend for a personal portfolio: a blog with a draft/published
//! workflow and a project showcase, persisted in SQLite.

mod api;
mod auth;
mod config;
mod content;
mod db;
mod errors;
mod models;
mod query;
mod services;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, patch},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;
use services::{PostService, ProjectService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub projects: ProjectService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self {
            posts: PostService::new(repo.clone()),
            projects: ProjectService::new(repo),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();

    tracing::info!("Starting Portfolio Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_token.is_none() {
        tracing::warn!(
            "No admin token configured (PORTFOLIO_ADMIN_TOKEN). Admin routes are unprotected!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let bind_addr = config.bind_addr;
    let app = create_router(AppState::new(repo, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.cors_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let token = state.config.admin_token.clone();

    // Admin routes, guarded by the bearer token
    let admin_routes = Router::new()
        .route(
            "/blog/posts",
            get(api::list_all_posts).post(api::create_post),
        )
        .route(
            "/blog/posts/{id}",
            get(api::get_post)
                .put(api::update_post)
                .delete(api::delete_post),
        )
        .route("/blog/posts/{id}/publish", patch(api::publish_post))
        .route("/blog/posts/{id}/unpublish", patch(api::unpublish_post))
        .route(
            "/projects",
            get(api::list_projects).post(api::create_project),
        )
        .route(
            "/projects/{id}",
            get(api::get_project)
                .put(api::update_project)
                .delete(api::delete_project),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(token.clone(), req, next)
        }));

    // Public routes
    let api_routes = Router::new()
        .route("/blog/posts", get(api::list_published_posts))
        .route("/blog/posts/{slug}", get(api::get_published_post))
        .route("/blog/featured", get(api::list_featured_posts))
        .route("/projects", get(api::list_projects))
        .route("/projects/featured", get(api::list_featured_projects))
        .route("/projects/{id}", get(api::get_project))
        .nest("/admin", admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` allows any origin; otherwise only the listed ones.
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|origin| origin == "*") {
        return AllowOrigin::any();
    }

    let values = origins.iter().filter_map(|origin| match HeaderValue::from_str(origin) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
            None
        }
    });
    AllowOrigin::list(values)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;

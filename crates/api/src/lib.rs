//! # ScoutPlan API
//!
//! The API crate provides the web server for ScoutPlan: the activity
//! catalogue, scout programs with their derived schedules, and user accounts.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Authentication extractors and error mapping
//! - **Cache**: Shared query cache for assembled responses
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Query cache shared by handlers
pub mod cache;
/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eyre::{Result, WrapErr};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::cache::QueryCache;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```no_run
/// # async fn example(db_pool: sqlx::PgPool) {
/// use std::{sync::Arc, time::Duration};
/// use scoutplan_api::{ApiState, cache::QueryCache};
///
/// let state = Arc::new(ApiState {
///     db_pool,
///     cache: QueryCache::new(1000, Duration::from_secs(300)),
///     session_ttl: chrono::Duration::hours(168),
/// });
/// # }
/// ```
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Cached program details and activities
    pub cache: QueryCache,
    /// Lifetime of newly issued session tokens
    pub session_ttl: chrono::Duration,
}

impl ApiState {
    pub fn new(db_pool: PgPool, config: &config::ApiConfig) -> Self {
        Self {
            db_pool,
            cache: QueryCache::new(
                config.cache_max_capacity,
                Duration::from_secs(config.cache_ttl_seconds),
            ),
            session_ttl: chrono::Duration::hours(config.session_ttl_hours),
        }
    }
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .wrap_err_with(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true))
}

/// Builds the application router with every route and middleware layer.
pub fn build_router(state: Arc<ApiState>, config: &config::ApiConfig) -> Result<Router> {
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Accounts and sessions
        .merge(routes::auth::routes())
        // Activity catalogue and categories
        .merge(routes::activity::routes())
        // Programs and their entries
        .merge(routes::program::routes())
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    Ok(app)
}

/// Starts the API server with the provided configuration and database connection
///
/// Sets up logging, builds the router and serves until the listener fails.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState::new(db_pool, &config));
    let app = build_router(state, &config)?;

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

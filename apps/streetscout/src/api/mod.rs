//! # StreetScout HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! Under `/api/streetscout`, for each of `street`, `sign` and `xsection`:
//!
//! - `GET /{kind}?page=&size=` - Paged listing in id order
//! - `GET /{kind}/{id}` - Fetch one record
//! - `POST /{kind}/submit` - Create or merge (`?id=` for signs/intersections)
//! - `PUT /{kind}/edit/{id}` - Merge a patch into a stored record
//! - `DELETE /{kind}/delete/{id}` - Remove a record of that kind
//!
//! Plus `GET /health` and `GET /status`.
//!
//! ## Configuration (Environment Variables)
//!
//! - `STREETSCOUT_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `STREETSCOUT_RATE_LIMIT`: Requests per second (default: `[limits] rate_limit`, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use handlers::status_for;
pub use middleware::{SharedLimiter, limiter_for, rate_limit_override};
pub use types::{
    DeleteResponse, ErrorResponse, HealthResponse, IntersectionCreate, IntersectionPatch,
    IntersectionView, ListParams, SegmentView, StatusResponse, StreetCreate, StreetPatch,
    StreetSignCreate, StreetSignPatch, StreetSignView, StreetView, SubmitResponse,
};

use crate::config::Config;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use streetscout_core::{ScoutError, UpsertEngine};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected (2 MiB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The engine serializes its own writes; no outer lock is needed.
    pub engine: Arc<UpsertEngine>,
    pub default_page_size: i64,
    pub rate_limit: u32,
}

impl AppState {
    /// State over `engine`, with listing and limit settings from `config`.
    #[must_use]
    pub fn new(engine: UpsertEngine, config: &Config) -> Self {
        Self {
            engine: Arc::new(engine),
            default_page_size: config.listing.default_page_size,
            rate_limit: config.limits.rate_limit,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build CORS layer from environment configuration.
///
/// Reads `STREETSCOUT_CORS_ORIGINS`:
/// - If "*": allows all origins
/// - If not set: localhost only, including the admin UI dev server
/// - Otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("STREETSCOUT_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (STREETSCOUT_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in STREETSCOUT_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(ALLOWED_METHODS)
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No STREETSCOUT_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:5173",
        "http://localhost:3000",
        "http://localhost:8082",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8082",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Routes for all three kinds, without middleware.
fn api_routes() -> Router<AppState> {
    Router::new()
        // Streets
        .route("/api/streetscout/street", get(handlers::list_streets))
        .route("/api/streetscout/street/{id}", get(handlers::get_street))
        .route("/api/streetscout/street/submit", post(handlers::submit_street))
        .route("/api/streetscout/street/edit/{id}", put(handlers::edit_street))
        .route(
            "/api/streetscout/street/delete/{id}",
            delete(handlers::delete_street),
        )
        // Signs
        .route("/api/streetscout/sign", get(handlers::list_signs))
        .route("/api/streetscout/sign/{id}", get(handlers::get_sign))
        .route("/api/streetscout/sign/submit", post(handlers::submit_sign))
        .route("/api/streetscout/sign/edit/{id}", put(handlers::edit_sign))
        .route(
            "/api/streetscout/sign/delete/{id}",
            delete(handlers::delete_sign),
        )
        // Intersections
        .route("/api/streetscout/xsection", get(handlers::list_intersections))
        .route(
            "/api/streetscout/xsection/{id}",
            get(handlers::get_intersection),
        )
        .route(
            "/api/streetscout/xsection/submit",
            post(handlers::submit_intersection),
        )
        .route(
            "/api/streetscout/xsection/edit/{id}",
            put(handlers::edit_intersection),
        )
        .route(
            "/api/streetscout/xsection/delete/{id}",
            delete(handlers::delete_intersection),
        )
}

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
pub fn create_router(state: AppState) -> Router {
    let rate_limit = rate_limit_override().unwrap_or(state.rate_limit);

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .merge(api_routes());

    match limiter_for(rate_limit) {
        Some(limiter) => {
            tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::throttle,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Start the HTTP server and run until Ctrl-C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), ScoutError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ScoutError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("StreetScout HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ScoutError::IoError(format!("Server error: {}", e)))
}

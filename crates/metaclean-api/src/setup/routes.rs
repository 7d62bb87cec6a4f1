//! Route configuration and setup

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use metaclean_core::Config;
use metaclean_infra::{request_id_middleware, security_headers_middleware};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{api_key_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;

/// Allowance on top of the file size limit for multipart boundaries and headers
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let auth_state = Arc::new(AuthState::new(config.api_key.clone()));
    if !auth_state.enabled() {
        tracing::warn!("No API key configured; /metadata and /clean accept unauthenticated requests");
    }

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/deep", get(handlers::health::deep_health));

    // route_layer: auth runs only for matched routes, before the body is read
    let protected_routes = Router::new()
        .route("/metadata", post(handlers::metadata::extract_metadata))
        .route("/clean", post(handlers::clean::clean_file))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            api_key_middleware,
        ));

    tracing::info!(
        http_concurrency_limit = config.http_concurrency_limit,
        request_timeout_secs = config.request_timeout_secs,
        max_file_size_bytes = config.max_file_size_bytes,
        "HTTP limits configured"
    );

    let app = public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(
            config.max_file_size_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let headers = [
        axum::http::header::CONTENT_TYPE,
        HeaderName::from_static("x-api-key"),
        HeaderName::from_static("x-request-id"),
    ];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
    };
    Ok(cors)
}

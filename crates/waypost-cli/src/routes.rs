//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let rate_limiter = middleware::create_rate_limiter(state.config.rate_limit_rps);
    middleware::spawn_limiter_pruner(&rate_limiter, middleware::LIMITER_PRUNE_INTERVAL);
    let rate_limit =
        middleware::RateLimitState::new(rate_limiter, &state.config.trusted_proxies);

    let router = Router::new()
        // Service endpoints
        .route("/", get(handlers::health_check))
        // Media
        .route("/files/{*path}", get(handlers::get_file))
        // Uploads
        .route("/uploads", post(handlers::stage_uploads))
        .route("/uploads/promote", post(handlers::promote_uploads))
        .route("/uploads/{name}", delete(handlers::discard_upload))
        // Apply middleware
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            middleware::rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_upload_size));

    let router = if state.config.cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}

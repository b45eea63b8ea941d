//! HTTP listeners: cached public reads and the uncached admin surface.

pub mod api;
mod middleware;

pub use api::ApiState;
pub use middleware::{RequestContext, log_responses, set_request_context};

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::cache::{CacheState, response_cache_layer};

use api::error::{ApiError, messages};

/// Router for the public listener. Reads go through the response cache when
/// one is configured.
pub fn build_public_router(state: ApiState, cache: Option<CacheState>) -> Router {
    let cached_routes = api::build_read_router();

    let cached_routes = if let Some(cache_state) = cache {
        cached_routes.layer(axum_middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ))
    } else {
        cached_routes
    };

    cached_routes
        .route("/_health/db", get(api::handlers::db_health))
        .fallback(not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

/// Router for the admin listener.
pub fn build_admin_router(state: ApiState) -> Router {
    api::build_admin_api_router()
        .route("/_health/db", get(api::handlers::db_health))
        .fallback(not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn not_found() -> ApiError {
    ApiError::not_found(messages::NOT_FOUND)
}

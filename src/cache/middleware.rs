//! L1 response cache middleware.
//!
//! Serves repeated public GETs from the L1 store and caches fresh 200
//! responses under the pages their handlers recorded.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use tracing::{debug, instrument, warn};

use super::{
    CacheConfig, CacheRegistry, L1Store, deps,
    keys::{L1Key, PagePath},
    store::CachedResponse,
};

/// Shared cache state for middleware.
#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub l1: Arc<L1Store>,
    pub registry: Arc<CacheRegistry>,
}

impl CacheState {
    /// Store a response computed while the store was at `generation`.
    ///
    /// Returns false, leaving nothing behind, if invalidation ran since then.
    /// The generation is read after registering: a consume that advanced it
    /// first is caught here, and one that advances it later sees the key.
    pub fn commit(
        &self,
        key: L1Key,
        response: CachedResponse,
        pages: HashSet<PagePath>,
        generation: u64,
    ) -> bool {
        if let Some(evicted) = self.l1.set(key.clone(), response) {
            self.registry.unregister(&evicted);
        }
        self.registry.register(key.clone(), pages);

        if self.l1.generation() != generation {
            self.l1.invalidate(&key);
            self.registry.unregister(&key);
            return false;
        }
        true
    }
}

#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.config.enable_response_cache || request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = L1Key::new(request.uri().path(), request.uri().query().unwrap_or(""));

    if let Some(cached) = cache.l1.get(&key) {
        debug!(cache = "l1", outcome = "hit", "serving cached response");
        return build_response(cached);
    }

    debug!(cache = "l1", outcome = "miss", "cache miss, executing handler");

    let generation = cache.l1.generation();
    let (response, pages) = deps::with_collector(next.run(request)).await;

    if response.status() != StatusCode::OK || pages.is_empty() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            warn!(error = %err, "failed to buffer response body for caching");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if bytes.len() > cache.config.response_body_limit_bytes {
        debug!(cache = "l1", body_len = bytes.len(), "response too large to cache");
    } else {
        let cached = CachedResponse {
            status: parts.status.as_u16(),
            headers: parts
                .headers
                .iter()
                .filter(|(name, _)| *name != header::CONTENT_LENGTH)
                .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
                .collect(),
            body: bytes.clone(),
        };

        let deps_count = pages.len();
        if cache.commit(key, cached, pages, generation) {
            debug!(cache = "l1", deps_count, "cached response");
        } else {
            debug!(cache = "l1", "invalidation ran during request; not caching");
        }
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn build_response(cached: CachedResponse) -> Response {
    let mut builder = Response::builder().status(cached.status);

    for (name, value) in cached.headers {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, header_value);
        }
    }

    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

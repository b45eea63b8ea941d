//! Public reads are cached until an admin write invalidates the pages they feed.

mod support;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sitedesk::cache::{CacheConfig, InvalidationTarget, L1Key};
use sitedesk::infra::http::{build_admin_router, build_public_router};
use tower::ServiceExt;

use support::{MemoryRepos, TestCache, api_state, build_cache};

struct Site {
    repos: Arc<MemoryRepos>,
    cache: TestCache,
    public: Router,
    admin: Router,
}

fn site(config: CacheConfig) -> Site {
    let repos = MemoryRepos::new();
    let cache = build_cache(config);
    let state = api_state(&repos, Some(&cache));
    Site {
        public: build_public_router(state.clone(), Some(cache.state.clone())),
        admin: build_admin_router(state),
        repos,
        cache,
    }
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn public_get(site: &Site, uri: &str) -> (StatusCode, Value) {
    call(&site.public, Method::GET, uri, None).await
}

async fn admin_post(site: &Site, uri: &str, body: Value) -> Value {
    let (status, body) = call(&site.admin, Method::POST, uri, Some(body)).await;
    assert!(status.is_success(), "admin write failed: {status} {body}");
    body
}

#[tokio::test]
async fn repeated_reads_are_served_from_cache() {
    let site = site(CacheConfig::default());
    admin_post(&site, "/api/v1/aboutus", json!({ "title": "About" })).await;

    let (status, first) = public_get(&site, "/api/v1/aboutus").await;
    assert_eq!(status, StatusCode::OK);
    assert!(site.cache.l1.get(&L1Key::new("/api/v1/aboutus", "")).is_some());

    // The store is down; only the cache can answer.
    site.repos.set_unavailable(true);
    let (status, second) = public_get(&site, "/api/v1/aboutus").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn upsert_invalidates_the_kinds_pages() {
    let site = site(CacheConfig::default());
    admin_post(&site, "/api/v1/aboutus", json!({ "title": "Before" })).await;

    let (_, before) = public_get(&site, "/api/v1/aboutus").await;
    assert_eq!(before["data"]["title"], "Before");

    admin_post(&site, "/api/v1/aboutus", json!({ "title": "After" })).await;

    let (_, after) = public_get(&site, "/api/v1/aboutus").await;
    assert_eq!(after["data"]["title"], "After");
}

#[tokio::test]
async fn unrelated_responses_stay_cached() {
    let site = site(CacheConfig::default());

    public_get(&site, "/api/v1/products").await;
    public_get(&site, "/api/v1/aboutus").await;
    let products_key = L1Key::new("/api/v1/products", "");
    assert!(site.cache.l1.get(&products_key).is_some());

    admin_post(&site, "/api/v1/aboutus", json!({ "title": "About" })).await;

    assert!(site.cache.l1.get(&products_key).is_some());
    assert!(
        site.cache
            .l1
            .get(&L1Key::new("/api/v1/aboutus", ""))
            .is_none()
    );
}

#[tokio::test]
async fn product_writes_refresh_list_detail_and_homepage() {
    let site = site(CacheConfig::default());
    let created = admin_post(&site, "/api/v1/products", json!({ "title": "Valve" })).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    admin_post(
        &site,
        "/api/v1/homepage",
        json!({ "products": { "products": [id] } }),
    )
    .await;

    let detail_uri = format!("/api/v1/products/{id}");
    public_get(&site, "/api/v1/products").await;
    public_get(&site, &detail_uri).await;
    public_get(&site, "/api/v1/homepage").await;

    let (status, _) = call(
        &site.admin,
        Method::PUT,
        &detail_uri,
        Some(json!({ "title": "Gate valve" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = public_get(&site, "/api/v1/products").await;
    assert_eq!(list["data"][0]["title"], "Gate valve");
    let (_, detail) = public_get(&site, &detail_uri).await;
    assert_eq!(detail["data"]["title"], "Gate valve");
    let (_, homepage) = public_get(&site, "/api/v1/homepage").await;
    assert_eq!(homepage["data"]["products"]["products"][0]["title"], "Gate valve");
}

#[tokio::test]
async fn deleting_a_product_drops_it_from_the_cached_homepage() {
    let site = site(CacheConfig::default());
    let created = admin_post(&site, "/api/v1/products", json!({ "title": "Valve" })).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    admin_post(
        &site,
        "/api/v1/homepage",
        json!({ "products": { "title": "Featured", "products": [id] } }),
    )
    .await;

    let (_, before) = public_get(&site, "/api/v1/homepage").await;
    assert_eq!(
        before["data"]["products"]["products"].as_array().unwrap().len(),
        1
    );

    let (status, _) = call(
        &site.admin,
        Method::DELETE,
        &format!("/api/v1/products/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = public_get(&site, "/api/v1/homepage").await;
    assert!(after["data"]["products"]["products"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn shared_settings_flush_every_dashboard_page() {
    let site = site(CacheConfig::default());

    public_get(&site, "/api/v1/aboutus").await;
    public_get(&site, "/api/v1/products").await;
    assert_eq!(site.cache.l1.len(), 2);

    admin_post(&site, "/api/v1/shared", json!({ "title": "Acme" })).await;

    assert!(site.cache.l1.is_empty());
}

#[tokio::test]
async fn failed_reads_are_not_cached() {
    let site = site(CacheConfig::default());

    let (status, _) = public_get(&site, "/api/v1/products/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    site.repos.set_unavailable(true);
    let (status, _) = public_get(&site, "/api/v1/products").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert!(site.cache.l1.is_empty());
}

#[tokio::test]
async fn explicit_path_invalidation_reaches_nested_pages() {
    let site = site(CacheConfig::default());
    public_get(&site, "/api/v1/aboutus").await;
    public_get(&site, "/api/v1/homepage").await;

    site.cache
        .trigger
        .invalidate(vec![InvalidationTarget::layout("/dashboard/about-us")])
        .await;

    assert!(
        site.cache
            .l1
            .get(&L1Key::new("/api/v1/aboutus", ""))
            .is_none()
    );
    assert!(
        site.cache
            .l1
            .get(&L1Key::new("/api/v1/homepage", ""))
            .is_some()
    );
}

#[tokio::test]
async fn disabled_cache_always_reads_through() {
    let site = site(CacheConfig {
        enable_response_cache: false,
        ..CacheConfig::default()
    });

    admin_post(&site, "/api/v1/aboutus", json!({ "title": "About" })).await;
    public_get(&site, "/api/v1/aboutus").await;

    assert!(site.cache.l1.is_empty());
    assert!(site.cache.queue.is_empty());
}

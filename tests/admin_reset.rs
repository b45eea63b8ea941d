//! The `reset` command goes through a running admin listener, so the public
//! cache of that server is invalidated along with the stored document.

mod support;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sitedesk::cache::{CacheConfig, L1Key};
use sitedesk::infra::admin_client::{AdminClient, AdminClientError, ResetOutcome};
use sitedesk::infra::http::{build_admin_router, build_public_router};
use sitedesk_api_types::SingletonKind;
use tokio::net::TcpListener;
use tower::ServiceExt;

use support::{MemoryRepos, api_state, build_cache};

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

async fn spawn_admin(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn reset_through_the_admin_listener_refreshes_cached_pages() {
    let repos = MemoryRepos::new();
    let cache = build_cache(CacheConfig::default());
    let state = api_state(&repos, Some(&cache));
    let public = build_public_router(state.clone(), Some(cache.state.clone()));
    let admin = build_admin_router(state);

    let (status, _) = call(
        &admin,
        Method::POST,
        "/api/v1/shared",
        Some(json!({ "title": "Acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, before) = call(&public, Method::GET, "/api/v1/shared", None).await;
    assert_eq!(before["data"]["title"], "Acme");
    assert!(cache.l1.get(&L1Key::new("/api/v1/shared", "")).is_some());

    let client = AdminClient::new(&spawn_admin(admin).await).unwrap();
    let outcome = client.reset(SingletonKind::Shared).await.unwrap();
    assert_eq!(
        outcome,
        ResetOutcome::Removed {
            message: "Shared settings reset successfully".to_string()
        }
    );

    let (status, after) = call(&public, Method::GET, "/api/v1/shared", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["data"], json!({}));
    assert_eq!(repos.singleton_count().await, 0);

    let again = client.reset(SingletonKind::Shared).await.unwrap();
    assert_eq!(again, ResetOutcome::NothingStored);
}

#[tokio::test]
async fn reset_reports_server_failures() {
    let repos = MemoryRepos::new();
    let admin = build_admin_router(api_state(&repos, None));
    let client = AdminClient::new(&spawn_admin(admin).await).unwrap();

    repos.set_unavailable(true);
    let err = client.reset(SingletonKind::Aboutus).await.unwrap_err();

    match err {
        AdminClientError::Server { status, message } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "Internal server error");
        }
        other => panic!("expected a server error, got {other}"),
    }
}

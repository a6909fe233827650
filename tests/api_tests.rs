mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use common::{FakeFetcher, FakeLlm, alex_payload};
use glimpse::clients::{LlmClient, ProfileFetcher};
use glimpse::state::SharedState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    fetcher: Arc<FakeFetcher>,
    llm: Arc<FakeLlm>,
}

async fn spawn_app() -> TestApp {
    let fetcher = Arc::new(FakeFetcher::new(alex_payload()));
    let llm = Arc::new(FakeLlm::default());

    let shared = SharedState::with_clients(
        common::test_config(),
        fetcher.clone() as Arc<dyn ProfileFetcher>,
        llm.clone() as Arc<dyn LlmClient>,
    )
    .await
    .expect("Failed to create shared state");

    let state = glimpse::api::create_app_state(Arc::new(shared), None);
    TestApp {
        router: glimpse::api::router(state).await,
        fetcher,
        llm,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_profile_lookup() {
    let app = spawn_app().await;

    let (status, body) = send(&app.router, get("/api/profiles/@Alex")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["username"], "alex");
    assert_eq!(data["name"], "Alex");
    assert_eq!(data["followers_count"], 100);
    assert_eq!(data["insights"]["personality"]["traits"].as_array().unwrap().len(), 5);
    assert_eq!(data["pending"], json!({"insights": false, "strategy": false, "personas": false}));
    assert!(data["last_fetched_at"].is_string());

    assert_eq!(app.fetcher.calls(), 1);
    assert_eq!(app.llm.total_calls(), 3);
}

#[tokio::test]
async fn test_profile_pending_sections() {
    let app = spawn_app().await;
    app.llm.respond(glimpse::domain::InsightKind::Strategy, Err("timeout"));

    let (status, body) = send(&app.router, get("/api/profiles/alex")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pending"]["strategy"], true);
    assert_eq!(body["data"]["pending"]["insights"], false);
    assert!(body["data"]["strategy"].is_null());
}

#[tokio::test]
async fn test_profile_errors() {
    let app = spawn_app().await;

    let (status, body) = send(&app.router, get("/api/profiles/bad-name")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    app.fetcher.set_failing(true);
    let (status, body) = send(&app.router, get("/api/profiles/alex")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Profile search service is unavailable");
}

#[tokio::test]
async fn test_regenerate() {
    let app = spawn_app().await;
    send(&app.router, get("/api/profiles/alex")).await;

    let (status, _) = send(
        &app.router,
        post_json("/api/profiles/alex/regenerate?kind=strategy", &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.llm.calls(glimpse::domain::InsightKind::Strategy), 2);
    assert_eq!(app.llm.total_calls(), 4);

    let (status, _) = send(
        &app.router,
        post_json("/api/profiles/alex/regenerate?kind=vibes", &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_history() {
    let app = spawn_app().await;

    let (status, _) = send(&app.router, get("/api/history")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .uri("/api/profiles/alex")
        .header("X-Caller-Id", "user-42")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/api/history?limit=5")
        .header("X-Caller-Id", "user-42")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["username"], "alex");
    assert_eq!(entries[0]["name"], "Alex");

    let request = Request::builder()
        .uri("/api/history?limit=0")
        .header("X-Caller-Id", "user-42")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_persona_chat() {
    let app = spawn_app().await;

    let message = json!({
        "persona_id": "friendly",
        "messages": [{"role": "user", "content": "Hi there"}]
    });

    let (status, _) = send(&app.router, post_json("/api/profiles/alex/chat", &message)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.fetcher.calls(), 0);

    send(&app.router, get("/api/profiles/alex")).await;

    let (status, body) = send(&app.router, post_json("/api/profiles/alex/chat", &message)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reply"], "You said: Hi there");

    let (status, _) = send(
        &app.router,
        post_json(
            "/api/profiles/alex/chat",
            &json!({"persona_id": "grumpy", "messages": [{"role": "user", "content": "Hi"}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        post_json(
            "/api/profiles/alex/chat",
            &json!({"persona_id": "friendly", "messages": [{"role": "system", "content": "Hi"}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.llm.set_chat_failing(true);
    let (status, body) = send(&app.router, post_json("/api/profiles/alex/chat", &message)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Chat completion service is unavailable");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = spawn_app().await;

    let (status, body) = send(&app.router, get("/api/health/live")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "alive");

    let (status, body) = send(&app.router, get("/api/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["database"], true);

    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Metrics not enabled or failed to initialize");
}

//! In-process tests for the proxy endpoint, using the dummy provider.
//!
//! The dummy records invocations, so the "never attempts the outbound call"
//! properties are asserted directly.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use polymat_api::llm::Provider;
use polymat_api::llm::providers::dummy::{DummyProvider, DummyReply};
use polymat_api::llm::Recommendation;
use polymat_api::server::{AppState, build_router};

fn sample_recommendation() -> Recommendation {
    Recommendation {
        material: "PET".into(),
        grade: "PET-G".into(),
        advantages: vec!["low cost".into()],
        disadvantages: vec!["limited heat resistance".into()],
    }
}

/// Build a router around a dummy provider, keeping a handle on the dummy so
/// tests can assert its call count.
fn app(reply: DummyReply, api_key: Option<&str>) -> (Router, DummyProvider) {
    let dummy = DummyProvider::new(reply);
    let state = AppState {
        provider: Provider::Dummy(dummy.clone()),
        api_key: api_key.map(Into::into),
    };
    (build_router(state), dummy)
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/recommend")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn wrong_method_is_405_with_json_body() {
    let (app, dummy) = app(DummyReply::Recommendation(sample_recommendation()), Some("key"));
    let request = Request::builder()
        .method("GET")
        .uri("/api/recommend")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await, json!({ "error": "Method Not Allowed" }));
    assert_eq!(dummy.calls(), 0);
}

#[tokio::test]
async fn missing_query_is_400() {
    let (app, dummy) = app(DummyReply::Recommendation(sample_recommendation()), Some("key"));

    let response = app.oneshot(post_json("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Search query is required." }));
    assert_eq!(dummy.calls(), 0);
}

#[tokio::test]
async fn empty_query_is_400() {
    let (app, dummy) = app(DummyReply::Recommendation(sample_recommendation()), Some("key"));

    let response = app.oneshot(post_json(r#"{"query": ""}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Search query is required." }));
    assert_eq!(dummy.calls(), 0);
}

#[tokio::test]
async fn non_json_body_is_400() {
    let (app, dummy) = app(DummyReply::Recommendation(sample_recommendation()), Some("key"));

    let response = app.oneshot(post_json("not json at all")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(dummy.calls(), 0);
}

#[tokio::test]
async fn non_string_query_is_400() {
    let (app, dummy) = app(DummyReply::Recommendation(sample_recommendation()), Some("key"));

    let response = app.oneshot(post_json(r#"{"query": 42}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(dummy.calls(), 0);
}

#[tokio::test]
async fn missing_api_key_is_500_before_any_outbound_call() {
    let (app, dummy) = app(DummyReply::Recommendation(sample_recommendation()), None);

    let response = app.oneshot(post_json(r#"{"query": "PET bottle"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "API key is not configured on the server." })
    );
    assert_eq!(dummy.calls(), 0);
}

#[tokio::test]
async fn upstream_4xx_status_is_mirrored() {
    let (app, dummy) = app(DummyReply::Upstream(429), Some("key"));

    let response = app.oneshot(post_json(r#"{"query": "PET bottle"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Failed to get a response from the AI model." })
    );
    assert_eq!(dummy.calls(), 1);
}

#[tokio::test]
async fn upstream_5xx_status_is_mirrored() {
    let (app, _dummy) = app(DummyReply::Upstream(503), Some("key"));

    let response = app.oneshot(post_json(r#"{"query": "PET bottle"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Failed to get a response from the AI model." })
    );
}

#[tokio::test]
async fn malformed_reply_is_generic_500() {
    let (app, _dummy) = app(DummyReply::MalformedReply, Some("key"));

    let response = app.oneshot(post_json(r#"{"query": "PET bottle"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // Parse detail must not leak — only the fixed message.
    assert_eq!(
        body_json(response).await,
        json!({ "error": "An internal server error occurred." })
    );
}

#[tokio::test]
async fn transport_failure_is_generic_500() {
    let (app, _dummy) = app(DummyReply::Transport, Some("key"));

    let response = app.oneshot(post_json(r#"{"query": "PET bottle"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "An internal server error occurred." })
    );
}

#[tokio::test]
async fn success_round_trips_the_recommendation() {
    let (app, dummy) = app(DummyReply::Recommendation(sample_recommendation()), Some("key"));

    let response = app.oneshot(post_json(r#"{"query": "PET bottle"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "material": "PET",
            "grade": "PET-G",
            "advantages": ["low cost"],
            "disadvantages": ["limited heat resistance"]
        })
    );
    assert_eq!(dummy.calls(), 1);
}

//! Router-level tests with the mock agent provider, verifying what the
//! handler actually passes to the agent.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cursor_gateway_service::config::{AgentConfig, GatewayConfig, ServerConfig};
use cursor_gateway_service::services::MockAgentProvider;
use cursor_gateway_service::startup::{router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_state(agent: Arc<MockAgentProvider>) -> AppState {
    AppState {
        config: GatewayConfig {
            server: ServerConfig { port: 0 },
            agent: AgentConfig {
                command: "cursor-agent".to_string(),
                timeout: Duration::from_secs(180),
            },
        },
        agent,
    }
}

fn generate_request(model: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/v1beta/models/{}", model))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

#[tokio::test]
async fn handler_invokes_agent_with_first_prompt_and_api_key() {
    let agent = Arc::new(MockAgentProvider::new("canned reply"));
    let app = router(test_state(Arc::clone(&agent)));

    let mut request = generate_request(
        "gemini-pro",
        r#"{"contents":[{"parts":[{"text":""}]},{"parts":[{"text":"pick me"},{"text":"not me"}]}]}"#,
    );
    request
        .headers_mut()
        .insert("x-cursor-api-key", "sk-abc".parse().unwrap());

    let response = app.oneshot(request).await.expect("Failed to route request");
    assert_eq!(response.status(), StatusCode::OK);

    let calls = agent.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "gemini-pro");
    assert_eq!(calls[0].prompt, "pick me");
    assert_eq!(calls[0].api_key.as_deref(), Some("sk-abc"));
}

#[tokio::test]
async fn missing_api_key_header_is_forwarded_as_none() {
    let agent = Arc::new(MockAgentProvider::new("ok"));
    let app = router(test_state(Arc::clone(&agent)));

    let request = generate_request("gemini-pro", r#"{"contents":[{"parts":[{"text":"hi"}]}]}"#);
    let response = app.oneshot(request).await.expect("Failed to route request");
    assert_eq!(response.status(), StatusCode::OK);

    let calls = agent.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].api_key, None);
}

#[tokio::test]
async fn non_utf8_api_key_header_is_treated_as_absent() {
    let agent = Arc::new(MockAgentProvider::new("ok"));
    let app = router(test_state(Arc::clone(&agent)));

    let mut request = generate_request("gemini-pro", r#"{"contents":[{"parts":[{"text":"hi"}]}]}"#);
    request.headers_mut().insert(
        "x-cursor-api-key",
        axum::http::HeaderValue::from_bytes(b"sk-\xff\xfe").unwrap(),
    );

    let response = app.oneshot(request).await.expect("Failed to route request");
    assert_eq!(response.status(), StatusCode::OK);

    let calls = agent.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].api_key, None);
}

#[tokio::test]
async fn no_prompt_means_no_agent_invocation() {
    let agent = Arc::new(MockAgentProvider::new("unreachable"));
    let app = router(test_state(Arc::clone(&agent)));

    let request = generate_request("gemini-pro", r#"{"contents":[]}"#);
    let response = app.oneshot(request).await.expect("Failed to route request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "no text prompt found in contents.parts");
    assert!(agent.calls().is_empty());
}

#[tokio::test]
async fn malformed_body_means_no_agent_invocation() {
    let agent = Arc::new(MockAgentProvider::new("unreachable"));
    let app = router(test_state(Arc::clone(&agent)));

    let request = generate_request("gemini-pro", r#"{"contents": 42}"#);
    let response = app.oneshot(request).await.expect("Failed to route request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_ne!(body["error"], "no text prompt found in contents.parts");
    assert!(agent.calls().is_empty());
}

#[tokio::test]
async fn agent_failure_maps_to_502_with_captured_output() {
    let agent = Arc::new(MockAgentProvider::failing("partial output"));
    let app = router(test_state(agent));

    let request = generate_request("gemini-pro", r#"{"contents":[{"parts":[{"text":"hi"}]}]}"#);
    let response = app.oneshot(request).await.expect("Failed to route request");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("agent command failed"));
    assert_eq!(body["output"], "partial output");
}

#[tokio::test]
async fn agent_timeout_maps_to_502() {
    let agent = Arc::new(MockAgentProvider::timing_out());
    let app = router(test_state(agent));

    let request = generate_request("gemini-pro", r#"{"contents":[{"parts":[{"text":"hi"}]}]}"#);
    let response = app.oneshot(request).await.expect("Failed to route request");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("timed out"));
    assert_eq!(body["output"], "");
}

#[tokio::test]
async fn empty_model_segment_is_routed_away() {
    let agent = Arc::new(MockAgentProvider::new("unreachable"));
    let app = router(test_state(Arc::clone(&agent)));

    let request = generate_request("", r#"{"contents":[{"parts":[{"text":"hi"}]}]}"#);
    let response = app.oneshot(request).await.expect("Failed to route request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(agent.calls().is_empty());
}

//! End-to-end tests over the axum router: SSE handshake, message routing,
//! error surfaces, and the static widget bundle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use neko::catapi::{CatApiError, CatImageSource, CatPhoto};
use neko::resources::ResourceRegistry;
use neko::server::{self, AppState};
use neko::session::SessionRegistry;
use neko::tools::ToolRegistry;
use neko::widgets::CatWidget;

struct StubSource {
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl CatImageSource for StubSource {
    async fn fetch_gallery(&self, limit: u32) -> Result<Vec<CatPhoto>, CatApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok((0..limit)
            .map(|i| CatPhoto {
                id: format!("cat-{i}"),
                url: format!("https://cdn2.thecatapi.com/images/cat-{i}.jpg"),
                alt: "猫の写真".into(),
                attribution: None,
                breed_name: None,
                temperament: None,
                origin: None,
                wikipedia_url: None,
            })
            .collect())
    }

    async fn fetch_random_image_url(&self) -> Result<String, CatApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok("https://cdn2.thecatapi.com/images/random.jpg".into())
    }
}

struct Fixture {
    app: Router,
    registry: Arc<SessionRegistry>,
    fetches: Arc<AtomicUsize>,
    // Keeps the temp public dir alive for the test's duration.
    _public: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let public = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(public.path().join("widget")).unwrap();
    std::fs::write(
        public.path().join("widget/cat-gallery.html"),
        "<div id=\"cat-gallery-root\"></div>",
    )
    .unwrap();

    let fetches = Arc::new(AtomicUsize::new(0));
    let source = Arc::new(StubSource {
        fetches: fetches.clone(),
    });
    let widget = Arc::new(CatWidget::load_gallery(public.path()).unwrap());
    let tools = Arc::new(ToolRegistry::new(source, widget.clone()));
    let resources = Arc::new(ResourceRegistry::new(vec![widget]));
    let registry = Arc::new(SessionRegistry::new());

    let state = AppState {
        registry: registry.clone(),
        tools,
        resources,
        public_dir: PathBuf::from(public.path()),
    };

    Fixture {
        app: server::app(state),
        registry,
        fetches,
        _public: public,
    }
}

/// Read the next SSE frame off a response body and return its decoded text.
async fn next_sse_frame(body: &mut Body) -> String {
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("Timed out waiting for SSE frame")
        .expect("SSE stream ended")
        .expect("SSE stream errored");
    let bytes = frame.into_data().expect("Expected a data frame");
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Extract the `data:` payload from a rendered SSE event.
fn sse_data(frame: &str) -> String {
    frame
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .collect::<Vec<_>>()
        .join("")
}

async fn post_message(app: &Router, session_id: &str, message: Value) -> StatusCode {
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!(
            "{}?sessionId={}",
            server::POST_PATH,
            session_id
        ))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(message.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

async fn open_session(app: &Router) -> (String, Body) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(server::SSE_PATH)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut body = response.into_body();
    let endpoint = next_sse_frame(&mut body).await;
    assert!(endpoint.contains("event: endpoint"));

    let data = sse_data(&endpoint);
    let session_id = data
        .split("sessionId=")
        .nth(1)
        .expect("Endpoint event should carry a sessionId")
        .to_string();

    (session_id, body)
}

/// Drive the handshake over HTTP, consuming the response events.
async fn handshake(app: &Router, session_id: &str, body: &mut Body) {
    let status = post_message(
        app,
        session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "integration-test", "version": "0.0.0" }
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let frame = next_sse_frame(body).await;
    let response: Value = serde_json::from_str(&sse_data(&frame)).unwrap();
    assert_eq!(response["result"]["serverInfo"]["name"], "neko-hub");

    let status = post_message(
        app,
        session_id,
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let fixture = fixture();
    let response = fixture
        .app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn post_without_session_id_is_rejected() {
    let fixture = fixture();
    let request = Request::builder()
        .method(Method::POST)
        .uri(server::POST_PATH)
        .body(Body::from("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}"))
        .unwrap();
    let response = fixture.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_to_unknown_session_is_not_found() {
    let fixture = fixture();
    let status = post_message(
        &fixture.app,
        "ffffffff-ffff-ffff-ffff-ffffffffffff",
        json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_rejected_before_routing() {
    let fixture = fixture();
    let (session_id, _body) = open_session(&fixture.app).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("{}?sessionId={}", server::POST_PATH, session_id))
        .body(Body::from("not json"))
        .unwrap();
    let response = fixture.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cors_preflight_is_permitted() {
    let fixture = fixture();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri(server::POST_PATH)
        .header(header::ORIGIN, "https://chatgpt.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = fixture.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn static_files_are_served_with_mime_types() {
    let fixture = fixture();
    let response = fixture
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/widget/cat-gallery.html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(std::str::from_utf8(&bytes).unwrap().contains("cat-gallery-root"));

    let missing = fixture
        .app
        .oneshot(
            Request::builder()
                .uri("/widget/nope.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_paths_are_not_served() {
    let fixture = fixture();
    let response = fixture
        .app
        .oneshot(
            Request::builder()
                .uri("/widget/%2e%2e/%2e%2e/etc/passwd")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_session_flow_over_sse() {
    let fixture = fixture();
    let (session_id, mut body) = open_session(&fixture.app).await;
    handshake(&fixture.app, &session_id, &mut body).await;

    // tools/list
    let status = post_message(
        &fixture.app,
        &session_id,
        json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let frame = next_sse_frame(&mut body).await;
    let response: Value = serde_json::from_str(&sse_data(&frame)).unwrap();
    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);

    // tools/call with a valid limit
    let status = post_message(
        &fixture.app,
        &session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": { "name": "show_cat_gallery", "arguments": { "limit": 3 } }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let frame = next_sse_frame(&mut body).await;
    let response: Value = serde_json::from_str(&sse_data(&frame)).unwrap();
    assert_eq!(response["id"], 3);
    let photos = response["result"]["structuredContent"]["photos"]
        .as_array()
        .unwrap();
    assert!(photos.len() <= 3 && !photos.is_empty());
    for photo in photos {
        assert!(photo["url"].as_str().unwrap().starts_with("https://"));
        assert!(!photo["alt"].as_str().unwrap().is_empty());
    }
    assert_eq!(fixture.fetches.load(Ordering::SeqCst), 1);

    // tools/call with invalid arguments: an error response, and no fetch
    let status = post_message(
        &fixture.app,
        &session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": { "name": "show_cat_gallery", "arguments": { "limit": "five" } }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let frame = next_sse_frame(&mut body).await;
    let response: Value = serde_json::from_str(&sse_data(&frame)).unwrap();
    assert_eq!(response["id"], 4);
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(fixture.fetches.load(Ordering::SeqCst), 1);

    // resources/read returns the widget markup
    let status = post_message(
        &fixture.app,
        &session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "resources/read",
            "params": { "uri": "ui://widget/cat-gallery.html" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let frame = next_sse_frame(&mut body).await;
    let response: Value = serde_json::from_str(&sse_data(&frame)).unwrap();
    let text = response["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(text.contains("cat-gallery-root"));
}

#[tokio::test]
async fn requests_before_the_handshake_fail_over_sse() {
    let fixture = fixture();
    let (session_id, mut body) = open_session(&fixture.app).await;

    let status = post_message(
        &fixture.app,
        &session_id,
        json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let frame = next_sse_frame(&mut body).await;
    let response: Value = serde_json::from_str(&sse_data(&frame)).unwrap();
    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn dropping_the_stream_tears_down_the_session() {
    let fixture = fixture();
    let (session_id, body) = open_session(&fixture.app).await;
    assert!(fixture.registry.contains(&session_id).await);

    drop(body);

    tokio::time::timeout(Duration::from_secs(2), async {
        while fixture.registry.contains(&session_id).await {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("Session should be removed once the SSE body is dropped");

    let status = post_message(
        &fixture.app,
        &session_id,
        json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let fixture = fixture();
    let (first, mut first_body) = open_session(&fixture.app).await;
    let (second, mut second_body) = open_session(&fixture.app).await;
    assert_ne!(first, second);
    assert_eq!(fixture.registry.len().await, 2);

    handshake(&fixture.app, &first, &mut first_body).await;

    // The second session never completed the handshake, so the same request
    // succeeds on one stream and fails on the other.
    for (session_id, expected_error) in [(&first, false), (&second, true)] {
        let status = post_message(
            &fixture.app,
            session_id,
            json!({ "jsonrpc": "2.0", "id": 10, "method": "tools/list" }),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let body = if session_id == &first {
            &mut first_body
        } else {
            &mut second_body
        };
        let frame = next_sse_frame(body).await;
        let response: Value = serde_json::from_str(&sse_data(&frame)).unwrap();
        assert_eq!(response["error"].is_object(), expected_error);
    }
}

//! HTTP surface: the SSE endpoint, the message sink, and the static
//! widget bundle, wired together into one axum [`Router`].

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Method, Request, StatusCode},
    response::{
        sse::{KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::mcp::{JsonRpcRequest, McpInterface};
use crate::resources::ResourceRegistry;
use crate::session::{SessionError, SessionRegistry};
use crate::static_files;
use crate::tools::ToolRegistry;

pub const SSE_PATH: &str = "/mcp";
pub const POST_PATH: &str = "/mcp/messages";

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub tools: Arc<ToolRegistry>,
    pub resources: Arc<ResourceRegistry>,
    pub public_dir: PathBuf,
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(SSE_PATH, get(open_sse))
        .route(POST_PATH, post(post_message))
        .route("/health", get(health))
        .fallback(serve_static)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /mcp: open an SSE session.
///
/// The first event names the endpoint to POST messages to; every JSON-RPC
/// response for this session then arrives here as a `message` event.
async fn open_sse(State(state): State<AppState>) -> Response {
    let interface = Arc::new(McpInterface::new(
        state.tools.clone(),
        state.resources.clone(),
    ));

    match state.registry.open(interface, POST_PATH).await {
        Ok(opened) => {
            let stream = opened.stream.map(Ok::<_, Infallible>);
            Sse::new(stream)
                .keep_alive(KeepAlive::default())
                .into_response()
        }
        Err(error) => {
            tracing::error!(%error, "Failed to open SSE session");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to open session").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostParams {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// POST /mcp/messages?sessionId=...: accept one JSON-RPC message.
///
/// The body is acknowledged with 202; the actual response is delivered over
/// the session's SSE stream.
async fn post_message(
    State(state): State<AppState>,
    Query(params): Query<PostParams>,
    body: String,
) -> Response {
    let Some(session_id) = params.session_id else {
        return (StatusCode::BAD_REQUEST, "Missing sessionId query parameter").into_response();
    };

    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(error) => {
            tracing::debug!(session_id = %session_id, %error, "Rejected malformed message");
            return (StatusCode::BAD_REQUEST, "Invalid JSON-RPC message").into_response();
        }
    };

    match state.registry.route(&session_id, request).await {
        Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(SessionError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "Unknown session").into_response()
        }
        Err(error) => {
            tracing::error!(session_id = %session_id, %error, "Failed to deliver response");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process message").into_response()
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Fallback handler serving the widget bundle out of the public directory.
async fn serve_static(State(state): State<AppState>, request: Request<Body>) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return StatusCode::NOT_FOUND.into_response();
    }

    let Some(path) = static_files::resolve(&state.public_dir, request.uri().path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match static_files::load(&path).await {
        Some(bytes) => {
            let mime = static_files::mime_for(&path);
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

//! SSE session registry.
//!
//! Each connected client holds one session: an [`McpInterface`] carrying the
//! handshake state plus an outbound channel feeding the client's SSE stream.
//! POSTed JSON-RPC messages are routed here by session id and the responses
//! travel back over the stream as `message` events.

use std::collections::HashMap;
use std::sync::Arc;

use axum::response::sse::Event;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::mcp::{JsonRpcRequest, JsonRpcResponse, McpInterface};

/// Responses queue here while the client's SSE socket drains. A slow reader
/// backpressures the POST handler rather than growing without bound.
const OUTBOUND_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unknown session: {0}")]
    NotFound(String),

    #[error("Session stream closed: {0}")]
    Closed(String),

    #[error("Failed to encode SSE event: {0}")]
    Encode(#[from] axum::Error),
}

#[derive(Clone)]
struct SessionHandle {
    interface: Arc<McpInterface>,
    outbound: mpsc::Sender<Event>,
}

/// A freshly opened session: the id to route POSTs by and the event stream
/// to hand to the SSE response.
pub struct OpenedSession {
    pub id: String,
    pub stream: ReceiverStream<Event>,
}

/// Shared map of live sessions, keyed by the id embedded in the endpoint URL.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for a new SSE connection.
    ///
    /// The first event on the returned stream is the `endpoint` event telling
    /// the client where to POST its messages. A watcher task removes the
    /// registry entry once the stream side is dropped, so disconnects clean
    /// up without any explicit close call from the transport.
    pub async fn open(
        self: &Arc<Self>,
        interface: Arc<McpInterface>,
        post_path: &str,
    ) -> Result<OpenedSession, SessionError> {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);

        let endpoint = Event::default()
            .event("endpoint")
            .data(format!("{post_path}?sessionId={id}"));
        tx.send(endpoint)
            .await
            .map_err(|_| SessionError::Closed(id.clone()))?;

        self.sessions.write().await.insert(
            id.clone(),
            SessionHandle {
                interface,
                outbound: tx.clone(),
            },
        );

        let registry = Arc::clone(self);
        let session_id = id.clone();
        tokio::spawn(async move {
            // Resolves when the ReceiverStream (and with it the SSE response
            // body) is dropped.
            tx.closed().await;
            registry.close(&session_id).await;
        });

        tracing::info!(session_id = %id, "SSE session opened");

        Ok(OpenedSession {
            id,
            stream: ReceiverStream::new(rx),
        })
    }

    /// Dispatch one JSON-RPC message to the session's interface and queue the
    /// response (if any) on its SSE stream.
    pub async fn route(&self, id: &str, request: JsonRpcRequest) -> Result<(), SessionError> {
        let handle = {
            let sessions = self.sessions.read().await;
            sessions
                .get(id)
                .cloned()
                .ok_or_else(|| SessionError::NotFound(id.to_string()))?
        };

        let JsonRpcRequest {
            method, params, id: request_id, ..
        } = request;
        let is_notification = request_id.is_none();

        let outcome = handle.interface.handle(&method, params).await;

        if is_notification {
            // Notifications carry no id, so there is no response to deliver.
            if let Err(error) = outcome {
                tracing::warn!(session_id = %id, method = %method, %error, "Notification failed");
            }
            return Ok(());
        }

        let request_id = request_id.unwrap_or(Value::Null);
        let response = match outcome {
            Ok(result) => JsonRpcResponse::success(request_id, result),
            Err(error) => {
                tracing::warn!(session_id = %id, method = %method, %error, "Request failed");
                JsonRpcResponse::error(request_id, error.into())
            }
        };

        let event = Event::default().event("message").json_data(&response)?;
        handle
            .outbound
            .send(event)
            .await
            .map_err(|_| SessionError::Closed(id.to_string()))?;

        Ok(())
    }

    /// Remove a session. Idempotent; later calls for the same id are no-ops.
    pub async fn close(&self, id: &str) {
        if self.sessions.write().await.remove(id).is_some() {
            tracing::info!(session_id = %id, "SSE session closed");
        }
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

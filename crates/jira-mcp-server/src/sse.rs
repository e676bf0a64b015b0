//! HTTP Server-Sent Events transport.
//!
//! Each `GET /sse` opens a session with its own [`McpServer`]; clients then
//! POST messages to `/message?sessionId=<id>` and receive responses as
//! `message` events on their stream. Closing the stream ends the session.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jira_mcp_core::{Error, Result};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::handlers::RequestHandler;
use crate::protocol::JsonRpcResponse;
use crate::server::McpServer;
use crate::transport::parse_message;

/// One open SSE session: its server and the sending half of its stream.
#[derive(Clone)]
pub(crate) struct SseSession {
    server: Arc<McpServer>,
    events: mpsc::UnboundedSender<Event>,
}

impl SseSession {
    /// Queue a response on the session's stream.
    ///
    /// Returns `false` when the client already disconnected.
    fn send(&self, response: &JsonRpcResponse) -> bool {
        let data = match serde_json::to_string(response) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to serialize response");
                return false;
            }
        };
        self.events
            .send(Event::default().event("message").data(data))
            .is_ok()
    }
}

/// Registry of open sessions keyed by session id.
///
/// Sessions are only inserted by `open` and only removed by `close`, both
/// driven by the SSE handlers; other crates get a read-only view.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, SseSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session under a fresh id.
    ///
    /// The returned receiver already holds the `endpoint` event telling the
    /// client where to POST.
    fn open(&self, handler: Arc<RequestHandler>) -> (String, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = SseSession {
            server: Arc::new(McpServer::new(handler)),
            events,
        };

        let id = loop {
            let id = Uuid::new_v4().to_string();
            if let Entry::Vacant(entry) = self.sessions.entry(id.clone()) {
                entry.insert(session);
                break id;
            }
        };

        if let Some(session) = self.sessions.get(&id) {
            let _ = session.events.send(
                Event::default()
                    .event("endpoint")
                    .data(format!("/message?sessionId={}", id)),
            );
        }

        (id, rx)
    }

    pub(crate) fn get(&self, id: &str) -> Option<SseSession> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    /// Remove a session. Returns whether it was open.
    pub(crate) fn close(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Event stream of one session; dropping it closes the session.
pub struct SessionStream {
    events: UnboundedReceiverStream<Event>,
    id: String,
    registry: SessionRegistry,
}

impl Stream for SessionStream {
    type Item = std::result::Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx).map(|e| e.map(Ok))
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        if self.registry.close(&self.id) {
            info!(session_id = %self.id, "SSE session closed");
        }
    }
}

#[derive(Clone)]
struct AppState {
    handler: Arc<RequestHandler>,
    sessions: SessionRegistry,
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Build the HTTP router.
pub fn router(handler: Arc<RequestHandler>, sessions: SessionRegistry) -> Router {
    let state = AppState { handler, sessions };

    Router::new()
        .route("/health", get(health_handler))
        .route("/sse", get(sse_handler))
        .route("/message", post(message_handler))
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn sse_handler(State(state): State<AppState>) -> Sse<SessionStream> {
    let (id, rx) = state.sessions.open(state.handler.clone());
    info!(
        session_id = %id,
        open_sessions = state.sessions.len(),
        "SSE session opened"
    );

    let stream = SessionStream {
        events: UnboundedReceiverStream::new(rx),
        id,
        registry: state.sessions.clone(),
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn message_handler(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let session = query
        .session_id
        .as_deref()
        .and_then(|id| state.sessions.get(id));

    let Some(session) = session else {
        warn!(session_id = ?query.session_id, "Message for unknown session");
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Session not found"})),
        )
            .into_response();
    };

    let message = match parse_message(&body) {
        Ok(message) => message,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": e.message}))).into_response();
        }
    };

    tokio::spawn(async move {
        if let Some(response) = session.server.handle_message(message).await {
            if !session.send(&response) {
                debug!("Session closed before the response was ready, discarding");
            }
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

/// Serve the SSE transport on `0.0.0.0:<port>` until the process exits.
pub async fn serve_sse(handler: Arc<RequestHandler>, port: u16) -> Result<()> {
    let app = router(handler, SessionRegistry::new());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| Error::Transport(format!("Failed to bind port {}: {}", port, e)))?;

    info!(port = port, "MCP SSE server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Transport(format!("HTTP server failed: {}", e)))
}

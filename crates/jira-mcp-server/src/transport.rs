//! Stdio transport for MCP JSON-RPC communication.
//!
//! Messages are newline-delimited JSON over stdin/stdout. Requests are
//! handled concurrently; a single writer task owns the output so responses
//! never interleave mid-line.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use jira_mcp_core::{Error, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::handlers::RequestHandler;
use crate::protocol::{
    JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
};
use crate::server::McpServer;

/// Message that can be received from the client.
#[derive(Debug)]
pub enum IncomingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

/// Parse one framed message.
///
/// Invalid JSON is a parse error; valid JSON that is neither a request nor
/// a notification is an invalid request.
pub fn parse_message(text: &str) -> std::result::Result<IncomingMessage, JsonRpcError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| JsonRpcError::parse_error(&e.to_string()))?;

    // Requests carry an id; notifications don't.
    if value.get("id").is_some() {
        return serde_json::from_value::<JsonRpcRequest>(value)
            .map(IncomingMessage::Request)
            .map_err(|e| JsonRpcError::invalid_request(&e.to_string()));
    }

    serde_json::from_value::<JsonRpcNotification>(value)
        .map(IncomingMessage::Notification)
        .map_err(|e| JsonRpcError::invalid_request(&e.to_string()))
}

// =============================================================================
// Output gate
// =============================================================================

/// Writer that discards everything until the transport attaches.
///
/// Only protocol frames may reach the peer; any bytes written through the
/// gate before `GateHandle::attach` are counted and dropped. The gate only
/// covers writes made through this writer: process-wide output such as
/// logging must be routed to stderr separately (the CLI does so in
/// `init_logging`).
pub struct OutputGate<W> {
    inner: W,
    attached: Arc<AtomicBool>,
    discarded: Arc<AtomicU64>,
}

/// Control side of an [`OutputGate`].
#[derive(Clone)]
pub struct GateHandle {
    attached: Arc<AtomicBool>,
    discarded: Arc<AtomicU64>,
}

impl<W> OutputGate<W> {
    pub fn new(inner: W) -> (Self, GateHandle) {
        let attached = Arc::new(AtomicBool::new(false));
        let discarded = Arc::new(AtomicU64::new(0));
        let handle = GateHandle {
            attached: attached.clone(),
            discarded: discarded.clone(),
        };
        (
            Self {
                inner,
                attached,
                discarded,
            },
            handle,
        )
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl GateHandle {
    /// Switch the gate to pass-through. Idempotent.
    pub fn attach(&self) {
        if self.attached.swap(true, Ordering::AcqRel) {
            return;
        }
        let discarded = self.discarded.load(Ordering::Acquire);
        if discarded > 0 {
            warn!(
                bytes = discarded,
                "Discarded output written before the transport attached"
            );
        } else {
            debug!("Output gate attached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    pub fn discarded_bytes(&self) -> u64 {
        self.discarded.load(Ordering::Acquire)
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for OutputGate<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.attached.load(Ordering::Acquire) {
            Pin::new(&mut this.inner).poll_write(cx, buf)
        } else {
            this.discarded
                .fetch_add(buf.len() as u64, Ordering::AcqRel);
            Poll::Ready(Ok(buf.len()))
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.attached.load(Ordering::Acquire) {
            Pin::new(&mut this.inner).poll_flush(cx)
        } else {
            Poll::Ready(Ok(()))
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

// =============================================================================
// Stdio transport
// =============================================================================

/// Line-delimited JSON-RPC transport over an async reader/writer pair.
pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
    gate: Option<GateHandle>,
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            gate: None,
        }
    }

    /// Attach `gate` once the writer task is running.
    pub fn with_gate(mut self, gate: GateHandle) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Serve messages until EOF or until the peer stops reading.
    ///
    /// A broken pipe on the output side is a normal disconnect and returns
    /// `Ok(())`.
    pub async fn run(self, server: Arc<McpServer>) -> Result<()> {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(self.writer, rx));

        if let Some(gate) = &self.gate {
            gate.attach();
        }

        let mut frames = self.reader.split(b'\n');
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("Writer stopped, no longer reading input");
                    break;
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                frame = frames.next_segment() => {
                    let Some(frame) = frame? else {
                        info!("EOF received, shutting down");
                        break;
                    };

                    let text = match String::from_utf8(frame) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(error = %e, "Received a frame that is not valid UTF-8");
                            let err = JsonRpcError::parse_error("Message is not valid UTF-8");
                            let _ = tx.send(JsonRpcResponse::error(RequestId::Null, err));
                            continue;
                        }
                    };
                    let line = text.trim();
                    if line.is_empty() {
                        continue;
                    }

                    debug!(raw = line, "Received");

                    match parse_message(line) {
                        Ok(msg) => {
                            let server = server.clone();
                            let tx = tx.clone();
                            in_flight.spawn(async move {
                                if let Some(response) = server.handle_message(msg).await {
                                    // Receiver is gone only when the peer disconnected.
                                    let _ = tx.send(response);
                                }
                            });
                        }
                        Err(e) => {
                            warn!(error = %e.message, "Failed to parse message");
                            let _ = tx.send(JsonRpcResponse::error(RequestId::Null, e));
                        }
                    }
                }
            }
        }

        while in_flight.join_next().await.is_some() {}
        drop(tx);

        match writer_task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                info!("Peer closed the output channel");
                Ok(())
            }
            Ok(Err(e)) => Err(Error::Io(e)),
            Err(e) => Err(Error::Transport(format!("Writer task failed: {}", e))),
        }
    }
}

async fn write_responses<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
) -> io::Result<()> {
    while let Some(response) = rx.recv().await {
        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to serialize response");
                continue;
            }
        };

        debug!(json = %json, "Sending");

        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Serve a single session over the process's stdin/stdout.
pub async fn serve_stdio(handler: Arc<RequestHandler>) -> Result<()> {
    info!("Starting MCP server on stdio");

    let (stdout, gate) = OutputGate::new(tokio::io::stdout());
    let transport = StdioTransport::new(BufReader::new(tokio::io::stdin()), stdout).with_gate(gate);

    transport.run(Arc::new(McpServer::new(handler))).await?;

    info!("MCP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockJira;
    use serde_json::Value;
    use tokio::io::AsyncReadExt;

    fn server() -> Arc<McpServer> {
        Arc::new(McpServer::new(Arc::new(RequestHandler::new(Arc::new(
            MockJira::new(),
        )))))
    }

    /// Run the transport over `input` and return every response line.
    async fn run_lines(input: &str) -> Vec<Value> {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> Vec<Value> {
        let (writer, mut output) = tokio::io::duplex(64 * 1024);
        let transport = StdioTransport::new(input, writer);
        transport.run(server()).await.unwrap();

        let mut text = String::new();
        output.read_to_string(&mut text).await.unwrap();
        text.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_request() {
        match parse_message(r#"{"jsonrpc":"2.0","id":1,"method":"test","params":{}}"#) {
            Ok(IncomingMessage::Request(req)) => {
                assert_eq!(req.method, "test");
                assert_eq!(req.id, RequestId::Number(1));
            }
            other => panic!("Expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_notification() {
        match parse_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#) {
            Ok(IncomingMessage::Notification(notif)) => {
                assert_eq!(notif.method, "notifications/initialized");
            }
            other => panic!("Expected notification, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_message("{not json").unwrap_err();
        assert_eq!(err.code, JsonRpcError::PARSE_ERROR);

        let err = parse_message(r#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert_eq!(err.code, JsonRpcError::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_run_answers_requests_and_skips_notifications() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"t","version":"1"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"jira_search","arguments":{"jql":"project = A"}}}"#,
            "\n",
        );

        let mut responses = run_lines(input).await;
        responses.sort_by_key(|r| r["id"].as_i64());

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "jira-mcp");
        assert_eq!(responses[1]["id"], 2);
        assert!(responses[1]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("project = A"));
    }

    #[tokio::test]
    async fn test_run_reports_parse_error_with_null_id() {
        let input = "this is not json\n{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"ping\"}\n";

        let responses = run_lines(input).await;

        assert_eq!(responses.len(), 2);
        let parse_error = responses
            .iter()
            .find(|r| r["id"].is_null())
            .unwrap();
        assert_eq!(parse_error["error"]["code"], JsonRpcError::PARSE_ERROR);
        assert!(responses.iter().any(|r| r["id"] == 3));
    }

    #[tokio::test]
    async fn test_run_answers_invalid_utf8_and_keeps_reading() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"ping\"}\n");

        let responses = run_bytes(&input).await;

        assert_eq!(responses.len(), 2);
        let parse_error = responses
            .iter()
            .find(|r| r["id"].is_null())
            .unwrap();
        assert_eq!(parse_error["error"]["code"], JsonRpcError::PARSE_ERROR);
        let ping = responses.iter().find(|r| r["id"] == 3).unwrap();
        assert_eq!(ping["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_run_handles_crlf_frames() {
        let input = "{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"ping\"}\r\n";

        let responses = run_lines(input).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 7);
    }

    #[tokio::test]
    async fn test_run_empty_input() {
        assert!(run_lines("").await.is_empty());
    }

    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::BrokenPipe)))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_broken_pipe_is_clean_disconnect() {
        let input = "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n";
        let transport = StdioTransport::new(input.as_bytes(), BrokenPipe);

        assert!(transport.run(server()).await.is_ok());
    }

    #[tokio::test]
    async fn test_output_gate_discards_until_attached() {
        let (mut gate, handle) = OutputGate::new(Vec::new());

        gate.write_all(b"premature banner\n").await.unwrap();
        assert!(!handle.is_attached());
        assert_eq!(handle.discarded_bytes(), 17);

        handle.attach();
        gate.write_all(b"{\"jsonrpc\":\"2.0\"}\n").await.unwrap();
        gate.flush().await.unwrap();

        assert_eq!(gate.into_inner(), b"{\"jsonrpc\":\"2.0\"}\n".to_vec());
    }

    #[tokio::test]
    async fn test_transport_attaches_gate() {
        let (writer, mut output) = tokio::io::duplex(1024);
        let (gate, handle) = OutputGate::new(writer);

        let input = "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n";
        StdioTransport::new(input.as_bytes(), gate)
            .with_gate(handle.clone())
            .run(server())
            .await
            .unwrap();

        assert!(handle.is_attached());
        let mut text = String::new();
        output.read_to_string(&mut text).await.unwrap();
        assert!(text.contains("\"id\":1"));
    }
}

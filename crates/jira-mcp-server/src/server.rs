//! MCP server implementation.
//!
//! One `McpServer` serves one session:
//! 1. Initialize - exchange capabilities (once per session)
//! 2. Handle tool calls and resource reads via the shared handler
//! 3. Notifications - logged, never answered

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::handlers::RequestHandler;
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ReadResourceParams, RequestId, ResourceTemplatesListResult, ResourcesCapability,
    ResourcesListResult, ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
    ToolsListResult, MCP_VERSION,
};
use crate::transport::IncomingMessage;

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "jira-mcp";

/// MCP server for a single session.
pub struct McpServer {
    handler: Arc<RequestHandler>,
    initialized: AtomicBool,
}

impl McpServer {
    /// Create a new MCP server backed by a shared handler.
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self {
            handler,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Handle an incoming message; notifications yield no response.
    pub async fn handle_message(&self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(&notif.method);
                None
            }
        }
    }

    /// Handle a JSON-RPC request.
    async fn handle_request(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %req.method, id = ?req.id, "Handling request");

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "ping" => JsonRpcResponse::success(req.id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::from_serializable(
                req.id,
                &ToolsListResult {
                    tools: self.handler.available_tools(),
                },
            ),
            "tools/call" => self.handle_tools_call(req.id, req.params).await,
            "resources/list" => JsonRpcResponse::from_serializable(
                req.id,
                &ResourcesListResult {
                    resources: self.handler.available_resources(),
                },
            ),
            "resources/templates/list" => JsonRpcResponse::from_serializable(
                req.id,
                &ResourceTemplatesListResult {
                    resource_templates: self.handler.resource_templates(),
                },
            ),
            "resources/read" => self.handle_resources_read(req.id, req.params).await,
            method => {
                warn!(method = method, "Unknown method");
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => info!("Client initialized"),
            "notifications/cancelled" => debug!("Request cancelled by client"),
            _ => debug!(method = method, "Ignoring notification"),
        }
    }

    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(init)) => info!(
                client = %init.client_info.name,
                client_version = %init.client_info.version,
                protocol = %init.protocol_version,
                "Initializing session"
            ),
            Some(Err(e)) => warn!(error = %e, "Failed to parse initialize params"),
            None => {}
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::from_serializable(id, &result)
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match parse_params(params) {
            Ok(params) => params,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        info!(tool = %params.name, "Calling tool");

        let result = self.handler.call_tool(&params.name, params.arguments).await;
        JsonRpcResponse::from_serializable(id, &result)
    }

    async fn handle_resources_read(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ReadResourceParams = match parse_params(params) {
            Ok(params) => params,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        info!(uri = %params.uri, "Reading resource");

        let result = self.handler.read_resource(&params.uri).await;
        JsonRpcResponse::from_serializable(id, &result)
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<Value>,
) -> Result<T, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
    serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))
}

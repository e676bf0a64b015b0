//! Tool and resource handlers for the MCP server.
//!
//! Every call moves through the same stages: arguments are validated into a
//! typed struct, the Jira operation runs, and the outcome is shaped into a
//! response. Failures at any stage end up as an error envelope instead of
//! escaping to the transport.

use std::sync::Arc;

use jira_mcp_core::{
    CreateIssueInput, Error, JiraApi, Result, SearchQuery, UpdateIssueInput,
    DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_FIELDS,
};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::protocol::{
    ReadResourceResult, ResourceDefinition, ResourceTemplate, ToolCallResult, ToolDefinition,
};
use crate::tools::{
    self, CREATE_ISSUE_TOOL, GET_ISSUE_TOOL, ISSUE_RESOURCE_PREFIX, SEARCH_RESOURCE_PREFIX,
    SEARCH_TOOL, UPDATE_ISSUE_TOOL,
};
use crate::views;

/// Handler that executes tools and resource reads against Jira.
///
/// Holds no per-request state; one instance is shared by every session.
pub struct RequestHandler {
    jira: Arc<dyn JiraApi>,
}

impl RequestHandler {
    pub fn new(jira: Arc<dyn JiraApi>) -> Self {
        Self { jira }
    }

    /// Get available tool definitions.
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        tools::tool_definitions()
    }

    pub fn available_resources(&self) -> Vec<ResourceDefinition> {
        tools::resource_definitions()
    }

    pub fn resource_templates(&self) -> Vec<ResourceTemplate> {
        tools::resource_templates()
    }

    /// Execute a tool by name with arguments.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        if tools::find_tool(name).is_none() {
            warn!(tool = name, "Unknown tool requested");
            return ToolCallResult::error(Error::UnknownTool(name.to_string()).to_string());
        }

        match self.execute_tool(name, arguments).await {
            Ok(value) => ToolCallResult::json(&value),
            Err(e) => {
                warn!(
                    tool = name,
                    category = e.category(),
                    error = %e,
                    "Tool call failed"
                );
                ToolCallResult::json_error(&error_payload(&e))
            }
        }
    }

    async fn execute_tool(&self, name: &str, arguments: Option<Value>) -> Result<Value> {
        match name {
            SEARCH_TOOL => self.search(parse_args(arguments)?).await,
            GET_ISSUE_TOOL => self.get_issue(parse_args(arguments)?).await,
            CREATE_ISSUE_TOOL => self.create_issue(parse_args(arguments)?).await,
            UPDATE_ISSUE_TOOL => self.update_issue(parse_args(arguments)?).await,
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }

    /// Read a resource by URI.
    ///
    /// The result always has one content item; failures are reported as an
    /// error envelope in its text.
    pub async fn read_resource(&self, uri: &str) -> ReadResourceResult {
        match self.resolve_resource(uri).await {
            Ok(value) => ReadResourceResult::json(uri, &value),
            Err(e) => {
                warn!(
                    uri = uri,
                    category = e.category(),
                    error = %e,
                    "Resource read failed"
                );
                ReadResourceResult::json(uri, &error_payload(&e))
            }
        }
    }

    async fn resolve_resource(&self, uri: &str) -> Result<Value> {
        // Search first: its prefix is the more specific of the two.
        if let Some(encoded) = uri.strip_prefix(SEARCH_RESOURCE_PREFIX) {
            let jql = percent_decode_str(encoded)
                .decode_utf8()
                .map_err(|e| Error::InvalidArguments(format!("JQL is not valid UTF-8: {}", e)))?;
            debug!(jql = %jql, "Reading search resource");

            let page = self.jira.search(SearchQuery::new(jql.into_owned())).await?;
            return Ok(views::search_view(&page, false));
        }

        if let Some(key) = uri.strip_prefix(ISSUE_RESOURCE_PREFIX) {
            if key.is_empty() {
                return Err(Error::InvalidArguments("Issue key is empty".to_string()));
            }
            debug!(issue = key, "Reading issue resource");

            let fields = default_fields();
            let issue = self.jira.get_issue(key, Some(&fields)).await?;
            return Ok(views::summary_view(&issue));
        }

        Err(Error::UnknownResource(uri.to_string()))
    }

    async fn search(&self, args: SearchArgs) -> Result<Value> {
        let explicit_fields = args.fields.as_ref().is_some_and(|f| !f.is_empty());

        let query = SearchQuery {
            max_results: args.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            start_at: args.start_at.unwrap_or(0),
            fields: match args.fields {
                Some(fields) if explicit_fields => fields,
                _ => default_fields(),
            },
            jql: args.jql,
        };

        let page = self.jira.search(query).await?;
        Ok(views::search_view(&page, explicit_fields))
    }

    async fn get_issue(&self, args: GetIssueArgs) -> Result<Value> {
        let issue = self
            .jira
            .get_issue(&args.issue_key, args.fields.as_deref())
            .await?;
        Ok(views::issue_view(&issue))
    }

    async fn create_issue(&self, args: CreateIssueArgs) -> Result<Value> {
        let created = self
            .jira
            .create_issue(CreateIssueInput {
                project_key: args.project_key,
                summary: args.summary,
                issue_type: args.issue_type,
                description: args.description,
                priority: args.priority,
                assignee: args.assignee,
                labels: args.labels,
            })
            .await?;
        Ok(views::created_view(&created))
    }

    async fn update_issue(&self, args: UpdateIssueArgs) -> Result<Value> {
        let requested_status = args.status.clone();
        let outcome = self
            .jira
            .update_issue(
                &args.issue_key,
                UpdateIssueInput {
                    summary: args.summary,
                    description: args.description,
                    priority: args.priority,
                    assignee: args.assignee,
                    labels: args.labels,
                    status: args.status,
                },
            )
            .await?;
        Ok(views::update_view(&outcome, requested_status.as_deref()))
    }
}

/// `{"error": message, "details": upstream body}`; `details` only when present.
pub fn error_payload(error: &Error) -> Value {
    let mut payload = json!({ "error": error.to_string() });
    if let Some(details) = error.details() {
        payload["details"] = details.clone();
    }
    payload
}

fn default_fields() -> Vec<String> {
    DEFAULT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// Deserialize tool arguments; a missing argument object counts as empty.
fn parse_args<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T> {
    let value = arguments.unwrap_or_else(|| Value::Object(Default::default()));
    serde_json::from_value(value).map_err(|e| Error::InvalidArguments(e.to_string()))
}

// =============================================================================
// Tool arguments
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    jql: String,
    max_results: Option<u32>,
    start_at: Option<u32>,
    fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetIssueArgs {
    issue_key: String,
    fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIssueArgs {
    project_key: String,
    summary: String,
    issue_type: String,
    description: Option<String>,
    priority: Option<String>,
    assignee: Option<String>,
    labels: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateIssueArgs {
    issue_key: String,
    summary: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    assignee: Option<String>,
    labels: Option<Vec<String>>,
    status: Option<String>,
}

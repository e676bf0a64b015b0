//! Static tool and resource registry.
//!
//! Descriptors are defined once at compile time; listing returns the whole
//! registry every time.

use jira_mcp_core::DEFAULT_MAX_RESULTS;
use serde_json::{json, Map, Value};

use crate::protocol::{ResourceDefinition, ResourceTemplate, ToolDefinition};

pub const SEARCH_TOOL: &str = "jira_search";
pub const GET_ISSUE_TOOL: &str = "jira_get_issue";
pub const CREATE_ISSUE_TOOL: &str = "jira_create_issue";
pub const UPDATE_ISSUE_TOOL: &str = "jira_update_issue";

/// URI prefix of the search resource; the JQL follows, percent-encoded.
pub const SEARCH_RESOURCE_PREFIX: &str = "jira://search?jql=";
/// URI prefix of the issue resource; the issue key follows.
pub const ISSUE_RESOURCE_PREFIX: &str = "jira://issue/";

const JSON_MIME: &str = "application/json";

/// JSON schema type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    StringArray,
}

/// One tool parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<i64>,
}

/// Tool name, description and parameter list.
#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        description,
        required: true,
        default: None,
    }
}

const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        description,
        required: false,
        default: None,
    }
}

const fn with_default(
    name: &'static str,
    description: &'static str,
    default: i64,
) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Integer,
        description,
        required: false,
        default: Some(default),
    }
}

pub static TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: SEARCH_TOOL,
        description: "Search Jira issues using JQL",
        params: &[
            required("jql", ParamKind::String, "JQL query string"),
            with_default(
                "maxResults",
                "Maximum number of results to return",
                DEFAULT_MAX_RESULTS as i64,
            ),
            with_default("startAt", "Index of the first result to return", 0),
            optional(
                "fields",
                ParamKind::StringArray,
                "Fields to include for each issue (default: a summary projection)",
            ),
        ],
    },
    ToolDescriptor {
        name: GET_ISSUE_TOOL,
        description: "Get a single Jira issue by key, including comments",
        params: &[
            required("issueKey", ParamKind::String, "Issue key (e.g., PROJ-123)"),
            optional(
                "fields",
                ParamKind::StringArray,
                "Fields to return (default: all fields)",
            ),
        ],
    },
    ToolDescriptor {
        name: CREATE_ISSUE_TOOL,
        description: "Create a new Jira issue",
        params: &[
            required("projectKey", ParamKind::String, "Project key (e.g., PROJ)"),
            required("summary", ParamKind::String, "Issue summary (title)"),
            required("issueType", ParamKind::String, "Issue type (e.g., Task, Bug, Story)"),
            optional("description", ParamKind::String, "Plain-text description"),
            optional("priority", ParamKind::String, "Priority name (e.g., High)"),
            optional("assignee", ParamKind::String, "Assignee account ID"),
            optional("labels", ParamKind::StringArray, "Labels to set"),
        ],
    },
    ToolDescriptor {
        name: UPDATE_ISSUE_TOOL,
        description: "Update fields of a Jira issue and optionally transition its status",
        params: &[
            required("issueKey", ParamKind::String, "Issue key (e.g., PROJ-123)"),
            optional("summary", ParamKind::String, "New summary"),
            optional("description", ParamKind::String, "New plain-text description"),
            optional("priority", ParamKind::String, "New priority name"),
            optional("assignee", ParamKind::String, "New assignee account ID"),
            optional("labels", ParamKind::StringArray, "Replacement label list"),
            optional(
                "status",
                ParamKind::String,
                "Target status; matched case-insensitively against available transitions",
            ),
        ],
    },
];

impl ParamSpec {
    fn schema(&self) -> Value {
        let mut schema = match self.kind {
            ParamKind::String => json!({"type": "string"}),
            ParamKind::Integer => json!({"type": "integer", "minimum": 0}),
            ParamKind::StringArray => json!({"type": "array", "items": {"type": "string"}}),
        };
        schema["description"] = Value::String(self.description.to_string());
        if let Some(default) = self.default {
            schema["default"] = Value::from(default);
        }
        schema
    }
}

impl ToolDescriptor {
    /// JSON schema object describing this tool's arguments.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Look up a tool by name.
pub fn find_tool(name: &str) -> Option<&'static ToolDescriptor> {
    TOOLS.iter().find(|t| t.name == name)
}

/// Definitions of every registered tool.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    TOOLS.iter().map(ToolDescriptor::definition).collect()
}

/// A readable resource pattern.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDescriptor {
    pub uri_prefix: &'static str,
    pub uri_template: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

pub static RESOURCES: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        uri_prefix: SEARCH_RESOURCE_PREFIX,
        uri_template: "jira://search?jql={jql}",
        name: "Jira search",
        description: "Issues matching a URL-encoded JQL query",
        mime_type: JSON_MIME,
    },
    ResourceDescriptor {
        uri_prefix: ISSUE_RESOURCE_PREFIX,
        uri_template: "jira://issue/{issueKey}",
        name: "Jira issue",
        description: "Summary of a single issue by key",
        mime_type: JSON_MIME,
    },
];

pub fn resource_definitions() -> Vec<ResourceDefinition> {
    RESOURCES
        .iter()
        .map(|r| ResourceDefinition {
            uri: r.uri_prefix.to_string(),
            name: r.name.to_string(),
            description: r.description.to_string(),
            mime_type: r.mime_type.to_string(),
        })
        .collect()
}

pub fn resource_templates() -> Vec<ResourceTemplate> {
    RESOURCES
        .iter()
        .map(|r| ResourceTemplate {
            uri_template: r.uri_template.to_string(),
            name: r.name.to_string(),
            description: r.description.to_string(),
            mime_type: r.mime_type.to_string(),
        })
        .collect()
}

//! Types shared between the JIRA client and the MCP server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields requested for search results and resource reads when the
/// caller does not name any.
pub const DEFAULT_SEARCH_FIELDS: &[&str] = &[
    "summary", "status", "assignee", "priority", "issuetype", "created", "updated",
];

/// Default page size for searches.
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// A Jira issue as returned by the REST API.
///
/// Fields are kept as raw JSON; callers decide which projection to expose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraIssue {
    /// Issue ID
    pub id: String,
    /// Issue key (e.g., "PROJ-123")
    pub key: String,
    /// Issue fields keyed by field id
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub jql: String,
    pub max_results: u32,
    pub start_at: u32,
    pub fields: Vec<String>,
}

impl SearchQuery {
    /// Query with default paging and the default field set.
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            max_results: DEFAULT_MAX_RESULTS,
            start_at: 0,
            fields: DEFAULT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub total: u64,
    pub issues: Vec<JiraIssue>,
}

/// Input for creating an issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateIssueInput {
    pub project_key: String,
    pub summary: String,
    pub issue_type: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    /// Account ID of the assignee
    pub assignee: Option<String>,
    pub labels: Option<Vec<String>>,
}

/// Key and ID of a newly created issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub key: String,
    pub id: String,
}

/// Input for updating an issue. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateIssueInput {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    /// Account ID of the assignee
    pub assignee: Option<String>,
    pub labels: Option<Vec<String>>,
    /// Target status, applied through a workflow transition
    pub status: Option<String>,
}

impl UpdateIssueInput {
    /// Whether any direct field edit is requested.
    pub fn has_field_updates(&self) -> bool {
        self.summary.is_some()
            || self.description.is_some()
            || self.priority.is_some()
            || self.assignee.is_some()
            || self.labels.is_some()
    }
}

/// Result of a status change request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// A transition with a matching name was executed.
    Applied { id: String, name: String },
    /// No transition name matched; the issue was left in its current status.
    NotFound {
        requested: String,
        available: Vec<String>,
    },
}

/// Result of an update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub key: String,
    /// Present only when a status change was requested.
    pub transition: Option<TransitionOutcome>,
}

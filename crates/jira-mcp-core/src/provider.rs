//! Trait implemented by the Jira REST client.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    CreateIssueInput, CreatedIssue, JiraIssue, SearchPage, SearchQuery, UpdateIssueInput,
    UpdateOutcome,
};

/// Outbound Jira operations used by the MCP request handlers.
#[async_trait]
pub trait JiraApi: Send + Sync {
    /// Run a JQL search.
    async fn search(&self, query: SearchQuery) -> Result<SearchPage>;

    /// Fetch a single issue, optionally restricted to `fields`.
    async fn get_issue(&self, key: &str, fields: Option<&[String]>) -> Result<JiraIssue>;

    /// Create an issue.
    async fn create_issue(&self, input: CreateIssueInput) -> Result<CreatedIssue>;

    /// Edit fields and, when `status` is set, attempt a matching transition.
    async fn update_issue(&self, key: &str, input: UpdateIssueInput) -> Result<UpdateOutcome>;
}

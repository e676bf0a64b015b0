//! Jira REST client for jira-mcp.
//!
//! Talks to Jira Cloud (REST API v3) with basic authentication
//! (account email + API token) and implements [`jira_mcp_core::JiraApi`].

mod client;
mod types;

pub use client::JiraClient;
pub use types::*;

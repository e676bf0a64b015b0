//! Core traits, types, and error handling for jira-mcp.
//!
//! This crate provides the foundational abstractions shared by the JIRA
//! client, the MCP server and the command-line entry point.

pub mod config;
pub mod document;
pub mod error;
pub mod provider;
pub mod types;

pub use config::{Config, JiraSettings, TransportMode};
pub use error::{Error, Result};
pub use provider::JiraApi;
pub use types::*;

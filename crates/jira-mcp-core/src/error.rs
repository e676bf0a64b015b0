//! Error types for jira-mcp.

use serde_json::Value;
use thiserror::Error;

/// Main error type for jira-mcp operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request could not be completed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Jira returned a non-success response
    #[error("Jira API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Upstream response body, parsed as JSON when possible
        details: Option<Value>,
    },

    /// Response body could not be decoded
    #[error("Invalid response data: {0}")]
    InvalidData(String),

    /// Tool or resource arguments failed validation
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool name not present in the registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Resource URI matched no known prefix
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport channel failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error on a transport channel
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build an upstream error from a non-success status and its raw body.
    ///
    /// The message prefers Jira's own `errorMessages` / `errors` entries;
    /// the body itself is kept verbatim in `details`.
    pub fn from_status(status: u16, body: String) -> Self {
        let details = if body.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body)))
        };

        let message = details
            .as_ref()
            .and_then(jira_error_message)
            .unwrap_or_else(|| default_status_message(status).to_string());

        Error::Api {
            status,
            message,
            details,
        }
    }

    /// Upstream payload attached to this error, if any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Error::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Stable label used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Api { .. } => "upstream",
            Error::InvalidData(_) => "invalid_data",
            Error::InvalidArguments(_) => "invalid_arguments",
            Error::UnknownTool(_) | Error::UnknownResource(_) => "routing",
            Error::Serialization(_) => "serialization",
            Error::Config(_) => "configuration",
            Error::Transport(_) | Error::Io(_) => "transport",
            Error::Other(_) => "other",
        }
    }
}

/// Collect `errorMessages` and `errors` from a Jira error body.
fn jira_error_message(body: &Value) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(messages) = body.get("errorMessages").and_then(|m| m.as_array()) {
        parts.extend(
            messages
                .iter()
                .filter_map(|m| m.as_str())
                .map(str::to_string),
        );
    }

    if let Some(errors) = body.get("errors").and_then(|e| e.as_object()) {
        for (field, message) in errors {
            match message.as_str() {
                Some(text) => parts.push(format!("{}: {}", field, text)),
                None => parts.push(format!("{}: {}", field, message)),
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn default_status_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not found",
        429 => "Too many requests",
        500..=599 => "Jira server error",
        _ => "Unexpected response",
    }
}

/// Result type alias for jira-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;

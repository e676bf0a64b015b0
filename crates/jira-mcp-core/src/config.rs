//! Configuration management for jira-mcp.
//!
//! Values are resolved from, highest priority first:
//!
//! 1. Environment variables (`JIRA_BASE_URL`, `JIRA_EMAIL`, `JIRA_API_TOKEN`,
//!    `PORT`, `MCP_TRANSPORT`)
//! 2. An optional TOML file, by default in a platform-specific location:
//!    - **macOS/Linux**: `~/.config/jira-mcp/config.toml`
//!    - **Windows**: `%APPDATA%\jira-mcp\config.toml`
//!
//! # Example
//!
//! ```toml
//! [jira]
//! url = "https://example.atlassian.net"
//! email = "me@example.com"
//! api_token = "..."
//!
//! [server]
//! port = 3000
//! transport = "sse"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "jira-mcp";

/// Port used by the SSE transport when none is configured.
pub const DEFAULT_PORT: u16 = 3000;

pub const ENV_BASE_URL: &str = "JIRA_BASE_URL";
pub const ENV_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const ENV_PORT: &str = "PORT";
pub const ENV_TRANSPORT: &str = "MCP_TRANSPORT";

// =============================================================================
// Transport mode
// =============================================================================

/// Which channel the server speaks MCP over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Newline-delimited JSON over stdin/stdout, one implicit session
    Stdio,
    /// HTTP Server-Sent Events, one session per connected client
    Sse,
}

impl TransportMode {
    /// Pick the transport for this process.
    ///
    /// Explicit override wins; otherwise a non-interactive stdin means stdio,
    /// an interactive stdin with a port configured means SSE, and stdio is
    /// the fallback.
    pub fn select(
        explicit: Option<TransportMode>,
        stdin_is_terminal: bool,
        port_configured: bool,
    ) -> TransportMode {
        if let Some(mode) = explicit {
            return mode;
        }
        if !stdin_is_terminal {
            return TransportMode::Stdio;
        }
        if port_configured {
            return TransportMode::Sse;
        }
        TransportMode::Stdio
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(TransportMode::Stdio),
            "sse" => Ok(TransportMode::Sse),
            other => Err(Error::Config(format!(
                "Invalid transport '{}'. Expected 'stdio' or 'sse'",
                other
            ))),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Stdio => write!(f, "stdio"),
            TransportMode::Sse => write!(f, "sse"),
        }
    }
}

// =============================================================================
// Configuration structures
// =============================================================================

/// Credentials and location of the Jira instance.
#[derive(Clone, PartialEq)]
pub struct JiraSettings {
    /// Jira instance URL (e.g., "https://example.atlassian.net")
    pub base_url: String,
    /// Account email used for basic auth
    pub email: String,
    /// API token used for basic auth
    pub api_token: String,
}

impl fmt::Debug for JiraSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraSettings")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"***")
            .finish()
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub jira: JiraSettings,
    /// Listening port for the SSE transport
    pub port: Option<u16>,
    /// Explicit transport override
    pub transport: Option<TransportMode>,
}

/// On-disk configuration; every value is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira: Option<FileJiraConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<FileServerConfig>,
}

/// `[jira]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileJiraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

/// `[server]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportMode>,
}

// =============================================================================
// FileConfig implementation
// =============================================================================

impl FileConfig {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the default configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using environment only");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: FileConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config file loaded");
        Ok(config)
    }
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Load configuration from the process environment and the config file.
    ///
    /// `path` overrides the default config file location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => FileConfig::load_from(p)?,
            None => match FileConfig::config_path() {
                Ok(p) => FileConfig::load_from(&p)?,
                Err(_) => FileConfig::default(),
            },
        };

        Self::resolve(|key| std::env::var(key).ok(), file)
    }

    /// Merge an environment lookup over a file config and validate the result.
    pub fn resolve<F>(lookup: F, file: FileConfig) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let file_jira = file.jira.unwrap_or_default();
        let file_server = file.server.unwrap_or_default();

        let base_url = env(ENV_BASE_URL).or(file_jira.url);
        let email = env(ENV_EMAIL).or(file_jira.email);
        let api_token = env(ENV_API_TOKEN).or(file_jira.api_token);

        let mut missing = Vec::new();
        if base_url.is_none() {
            missing.push(ENV_BASE_URL);
        }
        if email.is_none() {
            missing.push(ENV_EMAIL);
        }
        if api_token.is_none() {
            missing.push(ENV_API_TOKEN);
        }

        let (Some(base_url), Some(email), Some(api_token)) = (base_url, email, api_token) else {
            return Err(Error::Config(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )));
        };

        let port = match env(ENV_PORT) {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| {
                Error::Config(format!("Invalid {} value '{}'", ENV_PORT, raw))
            })?),
            None => file_server.port,
        };

        let transport = match env(ENV_TRANSPORT) {
            Some(raw) => Some(raw.parse::<TransportMode>()?),
            None => file_server.transport,
        };

        Ok(Self {
            jira: JiraSettings {
                base_url: base_url.trim_end_matches('/').to_string(),
                email,
                api_token,
            },
            port,
            transport,
        })
    }

    /// Port for the SSE listener.
    pub fn listen_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

// =============================================================================
// Tests
// =============================================================================

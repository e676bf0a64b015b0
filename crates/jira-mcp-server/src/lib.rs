//! MCP (Model Context Protocol) server for Jira.
//!
//! This crate exposes Jira search, read, create and update operations as
//! MCP tools and resources, over either a stdio channel or HTTP SSE.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod sse;
pub mod tools;
pub mod transport;
pub mod views;

#[cfg(test)]
mod testing;

pub use handlers::RequestHandler;
pub use server::McpServer;
pub use sse::{router, serve_sse, SessionRegistry};
pub use transport::{serve_stdio, GateHandle, OutputGate, StdioTransport};

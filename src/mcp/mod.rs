//! MCP (Model Context Protocol) server implementation using rmcp.
//!
//! Exposes the repository chat actions as tools over stdio. All tools share
//! one session.

mod handlers;
mod server;
mod state;
mod tools;
pub mod types;

pub use handlers::run_mcp_server;

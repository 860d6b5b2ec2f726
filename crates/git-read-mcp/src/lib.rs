//! MCP Server for read-only git inspection
//!
//! This crate exposes a fixed set of git queries via the Model Context
//! Protocol, so an agent can inspect a repository without being able to
//! change it.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ GitReadServer ] --> [ ToolDispatcher ]
//!                              | (RepositoryQueries)
//!                              v
//!                      [ git-read-query ] --> [ git CLI ]
//! ```
//!
//! # Tools
//!
//! - `git_status`, `git_changed_files`, `git_diff`
//! - `git_log`, `git_blame`, `git_show`

pub mod config;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use handlers::{MAX_DIFF_BYTES, ToolDispatcher};
pub use server::GitReadServer;
pub use tools::{ToolCatalog, ToolContent, ToolDefinition, ToolResult, get_tool_definitions};

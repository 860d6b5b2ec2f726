//! Error types for the MCP server

use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during MCP server operations
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the git query engine
    #[error(transparent)]
    Query(#[from] git_read_query::Error),

    /// Unknown tool requested
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Required tool argument absent or not of the declared type
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// Invalid argument provided
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error on the transport or during startup
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

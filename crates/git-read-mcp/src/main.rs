//! Read-only git MCP server
//!
//! # Usage
//!
//! ```bash
//! git-read-mcp [--root <path>] [--git <program>]
//! ```
//!
//! # Environment Variables
//!
//! - `MCP_ROOT_PATH`: Repository root when `--root` is not given
//! - `MCP_GIT_BINARY`: git executable when `--git` is not given
//! - `RUST_LOG`: Control log verbosity (default: `git_read_mcp=info`)
//!
//! Requests and responses go through stdout; logs go to stderr.

use git_read_mcp::{GitReadServer, ServerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout is reserved for the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("git_read_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!(root = %config.root.display(), git = %config.git_program, "Starting mcp-git-read server");

    let server = GitReadServer::new(&config);
    server.run().await?;

    Ok(())
}

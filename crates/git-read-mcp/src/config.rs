//! Startup configuration
//!
//! Command-line flags with environment fallbacks, resolved once before the
//! server starts reading stdin.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::Result;

/// MCP server for read-only git inspection
#[derive(Debug, Parser)]
#[command(name = "git-read-mcp")]
#[command(about = "MCP server for read-only git inspection")]
#[command(version)]
pub struct Args {
    /// Repository root path (defaults to the current directory)
    #[arg(short, long, env = "MCP_ROOT_PATH")]
    pub root: Option<PathBuf>,

    /// git executable to invoke
    #[arg(long, env = "MCP_GIT_BINARY", default_value = "git")]
    pub git: String,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Absolute path every git command runs in
    pub root: PathBuf,
    pub git_program: String,
}

impl ServerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            git_program: "git".to_string(),
        }
    }

    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    /// Parse process arguments and environment.
    pub fn from_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Parse an explicit argument list; used by tests.
    pub fn try_parse_from<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = Args::try_parse_from(args)?;
        Self::from_args(args).map_err(|e| {
            clap::Error::raw(clap::error::ErrorKind::ValueValidation, e.to_string())
        })
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let root = resolve_root(args.root.as_deref())?;
        Ok(Self {
            root,
            git_program: args.git,
        })
    }
}

/// Absolute repository root. An unset or empty path means the current
/// directory. Paths that do not exist are made absolute without resolving
/// symlinks; git reports the failure on first use.
pub fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => std::env::current_dir()?,
    };

    match dunce::canonicalize(&root) {
        Ok(path) => Ok(path),
        Err(_) => Ok(std::path::absolute(&root)?),
    }
}

//! Command runner seam between the query engine and the `git` executable

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{Error, Result};

/// Executes a single git invocation and returns its standard output.
///
/// Implementations must attempt each invocation exactly once and report a
/// non-zero exit as [`Error::Backend`].
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run git with `args` (the subcommand first, e.g. `["diff", "--staged"]`).
    async fn run(&self, args: &[String]) -> Result<String>;
}

/// Runs the real `git` executable as a child process rooted at a directory.
#[derive(Debug, Clone)]
pub struct CliRunner {
    root: PathBuf,
    program: PathBuf,
}

impl CliRunner {
    /// Create a runner for the repository at `root`, using `git` from PATH.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            program: PathBuf::from("git"),
        }
    }

    /// Use a different git executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Directory every invocation runs in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The git executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl GitRunner for CliRunner {
    async fn run(&self, args: &[String]) -> Result<String> {
        tracing::debug!(?args, root = ?self.root, "Running git");

        let output = Command::new(&self.program)
            .args(["--no-pager", "-c", "core.quotepath=off"])
            .args(args)
            .current_dir(&self.root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(Error::Spawn)?;

        if !output.status.success() {
            let err = Error::backend(&String::from_utf8_lossy(&output.stderr));
            tracing::debug!(
                code = ?output.status.code(),
                kind = ?err.failure_kind(),
                "git exited with failure"
            );
            return Err(err);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

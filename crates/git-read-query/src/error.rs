//! Error types for git-read-query

use std::fmt;

/// Result type for git-read-query operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying a repository
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// git ran and exited with a non-zero status
    #[error("git {kind}: {message}")]
    Backend { kind: FailureKind, message: String },

    /// git could not be started at all
    #[error("Failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// git produced output this crate could not interpret
    #[error("Unexpected git output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a backend failure, classifying the kind from git's stderr.
    pub fn backend(stderr: &str) -> Self {
        let message = stderr.trim();
        let message = if message.is_empty() {
            "git exited with a non-zero status".to_string()
        } else {
            message.to_string()
        };
        Error::Backend {
            kind: FailureKind::classify(&message),
            message,
        }
    }

    /// The failure kind when this is a backend failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Error::Backend { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Classification of a non-zero git exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotARepository,
    BadRevision,
    AmbiguousReference,
    PathNotFound,
    Other,
}

impl FailureKind {
    /// Classify git's stderr text.
    ///
    /// git phrases "unknown revision" as an ambiguous argument, so the revision
    /// check runs before the ambiguity check.
    pub fn classify(stderr: &str) -> Self {
        let text = stderr.to_ascii_lowercase();
        if text.contains("not a git repository") {
            FailureKind::NotARepository
        } else if text.contains("no such path")
            || text.contains("does not exist in")
            || text.contains("exists on disk, but not in")
        {
            FailureKind::PathNotFound
        } else if text.contains("unknown revision")
            || text.contains("bad revision")
            || text.contains("invalid object name")
            || text.contains("bad object")
            || text.contains("not a valid object name")
        {
            FailureKind::BadRevision
        } else if text.contains("ambiguous argument") {
            FailureKind::AmbiguousReference
        } else {
            FailureKind::Other
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::NotARepository => "not a repository",
            FailureKind::BadRevision => "bad revision",
            FailureKind::AmbiguousReference => "ambiguous reference",
            FailureKind::PathNotFound => "path not found",
            FailureKind::Other => "command failed",
        };
        f.write_str(label)
    }
}

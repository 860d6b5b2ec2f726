//! Read-only git queries for mcp-git-read
//!
//! Translates typed queries (status, diff, log, blame, show, changed files)
//! into `git` command lines, runs them through a [`GitRunner`], and normalizes
//! the output into text or structured records.
//!
//! ```text
//! [ RepositoryQueries ] --args--> [ GitRunner ] --spawn--> [ git ]
//!          ^                            |
//!          +-------- text / records ----+
//! ```

pub mod args;
pub mod engine;
pub mod error;
pub mod log;
pub mod runner;
pub mod status;

pub use args::{ChangedFilesQuery, DiffQuery, DiffRangeQuery, MAX_LOG_COUNT};
pub use engine::{DEFAULT_LOG_COUNT, QueryEngine, RepositoryQueries};
pub use error::{Error, FailureKind, Result};
pub use log::CommitRecord;
pub use runner::{CliRunner, GitRunner};
pub use status::{FileStatus, RenamedFile, StatusRecord};

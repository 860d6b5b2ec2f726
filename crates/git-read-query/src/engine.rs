//! Query engine: turns typed queries into git invocations and normalizes output.

use async_trait::async_trait;

use crate::args::{self, ChangedFilesQuery, DiffQuery, DiffRangeQuery};
use crate::log::parse_log;
use crate::runner::GitRunner;
use crate::status::StatusRecord;
use crate::Result;

/// Default number of commits returned by [`RepositoryQueries::log`].
pub const DEFAULT_LOG_COUNT: usize = 10;

/// Read-only queries a client may ask of a repository.
///
/// Each call is a single suspend point: it either resolves fully or fails.
#[async_trait]
pub trait RepositoryQueries: Send + Sync {
    async fn status(&self) -> Result<StatusRecord>;

    /// Unstaged changes, or staged changes with `query.staged`.
    async fn diff(&self, query: &DiffQuery) -> Result<String>;

    /// Changes between `target` and `source`, or `target` and the working tree.
    async fn diff_range(&self, query: &DiffRangeQuery) -> Result<String>;

    /// The `max_count` most recent commits, rendered as a JSON array.
    async fn log(&self, max_count: usize) -> Result<String>;

    async fn blame(&self, path: &str) -> Result<String>;

    /// A revision, or file content in `revision:path` form.
    async fn show(&self, object: &str) -> Result<String>;

    async fn changed_files(&self, query: &ChangedFilesQuery) -> Result<Vec<String>>;
}

/// [`RepositoryQueries`] backed by a [`GitRunner`].
pub struct QueryEngine<R> {
    runner: R,
}

impl<R: GitRunner> QueryEngine<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

#[async_trait]
impl<R: GitRunner> RepositoryQueries for QueryEngine<R> {
    async fn status(&self) -> Result<StatusRecord> {
        let output = self.runner.run(&args::status_args()).await?;
        StatusRecord::parse(&output)
    }

    async fn diff(&self, query: &DiffQuery) -> Result<String> {
        self.runner.run(&args::diff_args(query)?).await
    }

    async fn diff_range(&self, query: &DiffRangeQuery) -> Result<String> {
        self.runner.run(&args::diff_range_args(query)?).await
    }

    async fn log(&self, max_count: usize) -> Result<String> {
        let output = self.runner.run(&args::log_args(max_count)?).await?;
        let mut commits = parse_log(&output)?;
        commits.truncate(max_count);
        Ok(serde_json::to_string_pretty(&commits)?)
    }

    async fn blame(&self, path: &str) -> Result<String> {
        self.runner.run(&args::blame_args(path)?).await
    }

    async fn show(&self, object: &str) -> Result<String> {
        self.runner.run(&args::show_args(object)?).await
    }

    async fn changed_files(&self, query: &ChangedFilesQuery) -> Result<Vec<String>> {
        let output = self.runner.run(&args::changed_files_args(query)?).await?;
        Ok(output
            .lines()
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

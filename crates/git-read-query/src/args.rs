//! Argument construction for each query.
//!
//! Every diff ends its revisions with a `--` separator, so path filters are
//! never parsed as revisions and a revision is never mistaken for a path.
//! Revisions are validated before they reach the command line.

use crate::{Error, Result};

/// Separator between revisions and path filters.
pub const PATH_SEPARATOR: &str = "--";

/// Field separator used in the log format.
pub(crate) const FIELD_SEP: char = '\x1f';

/// Record separator used in the log format.
pub(crate) const RECORD_SEP: char = '\x1e';

/// Largest `--max-count` git accepts; larger requests are clamped.
pub const MAX_LOG_COUNT: usize = i32::MAX as usize;

/// Plain diff of the working tree (or the index with `staged`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffQuery {
    pub staged: bool,
    pub files: Vec<String>,
}

/// Diff between revisions, or between a revision and the working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffRangeQuery {
    pub target: String,
    pub source: Option<String>,
    pub files: Vec<String>,
    pub use_three_dot: bool,
}

impl DiffRangeQuery {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn three_dot(mut self, use_three_dot: bool) -> Self {
        self.use_three_dot = use_three_dot;
        self
    }
}

/// Names of files changed between `target` and `source` (or the working tree).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFilesQuery {
    pub target: String,
    pub source: Option<String>,
}

impl ChangedFilesQuery {
    pub fn new(target: impl Into<String>, source: Option<String>) -> Self {
        Self {
            target: target.into(),
            source,
        }
    }
}

/// Reject values that git would misread as options or that cannot be passed
/// on a command line.
pub fn validate_revision(label: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{label} must not be empty")));
    }
    if value.starts_with('-') {
        return Err(Error::InvalidArgument(format!(
            "{label} must not start with '-' (would be interpreted as a git option): {value}"
        )));
    }
    if value.contains('\0') {
        return Err(Error::InvalidArgument(format!(
            "{label} must not contain null bytes"
        )));
    }
    Ok(())
}

/// Path filters follow `--`, so only emptiness and NUL bytes matter.
fn validate_path(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument("file path must not be empty".into()));
    }
    if value.contains('\0') {
        return Err(Error::InvalidArgument(
            "file path must not contain null bytes".into(),
        ));
    }
    Ok(())
}

/// Close the revision list with `--`, then append any path filters.
fn push_path_filters(args: &mut Vec<String>, files: &[String]) -> Result<()> {
    for file in files {
        validate_path(file)?;
    }
    args.push(PATH_SEPARATOR.to_string());
    args.extend(files.iter().cloned());
    Ok(())
}

pub fn status_args() -> Vec<String> {
    [
        "status",
        "--porcelain=v1",
        "--branch",
        "--untracked-files=all",
        "-z",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn diff_args(query: &DiffQuery) -> Result<Vec<String>> {
    let mut args = vec!["diff".to_string()];
    if query.staged {
        args.push("--staged".to_string());
    }
    push_path_filters(&mut args, &query.files)?;
    Ok(args)
}

/// `target...source` with three-dot and a source, otherwise `target [source]`.
///
/// Without a source the three-dot flag is ignored.
pub fn diff_range_args(query: &DiffRangeQuery) -> Result<Vec<String>> {
    validate_revision("target", &query.target)?;
    if let Some(source) = &query.source {
        validate_revision("source", source)?;
    }

    let mut args = vec!["diff".to_string()];
    match &query.source {
        Some(source) if query.use_three_dot => {
            args.push(format!("{}...{}", query.target, source));
        }
        Some(source) => {
            args.push(query.target.clone());
            args.push(source.clone());
        }
        None => args.push(query.target.clone()),
    }
    push_path_filters(&mut args, &query.files)?;
    Ok(args)
}

/// Always three-dot when a source is given; there is no flag to opt out.
pub fn changed_files_args(query: &ChangedFilesQuery) -> Result<Vec<String>> {
    validate_revision("target", &query.target)?;
    let range = match &query.source {
        Some(source) => {
            validate_revision("source", source)?;
            format!("{}...{}", query.target, source)
        }
        None => query.target.clone(),
    };
    Ok(vec![
        "diff".to_string(),
        "--name-only".to_string(),
        range,
        PATH_SEPARATOR.to_string(),
    ])
}

pub fn log_args(max_count: usize) -> Result<Vec<String>> {
    if max_count == 0 {
        return Err(Error::InvalidArgument(
            "max_count must be at least 1".into(),
        ));
    }
    let max_count = max_count.min(MAX_LOG_COUNT);
    let format = ["%H", "%aI", "%s", "%D", "%b", "%an", "%ae"].join("%x1f") + "%x1e";
    // log.showSignature would interleave gpg output with the records.
    Ok(vec![
        "log".to_string(),
        "--no-show-signature".to_string(),
        format!("--max-count={max_count}"),
        format!("--pretty=format:{format}"),
    ])
}

pub fn blame_args(path: &str) -> Result<Vec<String>> {
    validate_path(path)?;
    Ok(vec![
        "blame".to_string(),
        PATH_SEPARATOR.to_string(),
        path.to_string(),
    ])
}

pub fn show_args(object: &str) -> Result<Vec<String>> {
    validate_revision("object", object)?;
    Ok(vec!["show".to_string(), object.to_string()])
}

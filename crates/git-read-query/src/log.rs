//! Commit history records.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::args::{FIELD_SEP, RECORD_SEP};
use crate::{Error, Result};

/// A single commit as rendered by `git_log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full commit hash
    pub hash: String,

    /// Author date, with the author's UTC offset
    pub date: DateTime<FixedOffset>,

    /// Subject line
    pub message: String,

    /// Decorations (branch and tag names), empty when none point here
    pub refs: String,

    /// Message body after the subject, trailing whitespace removed
    pub body: String,

    pub author_name: String,
    pub author_email: String,
}

impl CommitRecord {
    fn parse(record: &str) -> Result<Self> {
        let fields: Vec<&str> = record.splitn(7, FIELD_SEP).collect();
        let [hash, date, message, refs, body, author_name, author_email] = fields[..] else {
            return Err(Error::UnexpectedOutput(format!(
                "log record with {} fields",
                fields.len()
            )));
        };

        let date = DateTime::parse_from_rfc3339(date)
            .map_err(|e| Error::UnexpectedOutput(format!("commit date {date:?}: {e}")))?;

        Ok(Self {
            hash: hash.to_string(),
            date,
            message: message.to_string(),
            refs: refs.to_string(),
            body: body.trim_end().to_string(),
            author_name: author_name.to_string(),
            author_email: author_email.trim_end().to_string(),
        })
    }
}

/// Parse `git log` output produced with the record/field separators from
/// [`crate::args::log_args`]. Order is preserved (newest first).
pub fn parse_log(output: &str) -> Result<Vec<CommitRecord>> {
    output
        .split(RECORD_SEP)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .map(CommitRecord::parse)
        .collect()
}

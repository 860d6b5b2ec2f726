//! Working tree status, parsed from `git status --porcelain=v1 --branch -z`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A rename (or copy) reported by git status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedFile {
    pub from: String,
    pub to: String,
}

/// One porcelain entry: the path plus its index and working tree codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub path: String,
    pub index: String,
    pub working_dir: String,
}

/// Summary of the repository's working tree and index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Checked-out branch, `None` when HEAD is detached
    pub current: Option<String>,
    /// Upstream branch, if one is configured
    pub tracking: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub detached: bool,
    /// Untracked paths
    pub not_added: Vec<String>,
    pub conflicted: Vec<String>,
    pub created: Vec<String>,
    pub deleted: Vec<String>,
    pub modified: Vec<String>,
    pub renamed: Vec<RenamedFile>,
    pub staged: Vec<String>,
    pub files: Vec<FileStatus>,
}

impl StatusRecord {
    /// True when there is nothing staged, modified, or untracked.
    pub fn is_clean(&self) -> bool {
        self.files.is_empty()
    }

    /// Parse NUL-separated porcelain v1 output.
    pub fn parse(output: &str) -> Result<Self> {
        let mut record = StatusRecord::default();
        let mut entries = output.split('\0').filter(|entry| !entry.is_empty());

        while let Some(entry) = entries.next() {
            if let Some(header) = entry.strip_prefix("## ") {
                record.apply_branch_header(header);
                continue;
            }

            let (codes, path) = entry
                .split_at_checked(3)
                .ok_or_else(|| Error::UnexpectedOutput(format!("status entry {entry:?}")))?;
            let mut codes = codes.chars();
            let index = codes.next().unwrap_or(' ');
            let working_dir = codes.next().unwrap_or(' ');

            // Renames and copies carry the original path as the next entry.
            if matches!(index, 'R' | 'C') || matches!(working_dir, 'R' | 'C') {
                let from = entries.next().unwrap_or_default().to_string();
                record.renamed.push(RenamedFile {
                    from,
                    to: path.to_string(),
                });
            }

            record.classify(index, working_dir, path);
            record.files.push(FileStatus {
                path: path.to_string(),
                index: index.to_string(),
                working_dir: working_dir.to_string(),
            });
        }

        Ok(record)
    }

    fn classify(&mut self, index: char, working_dir: char, path: &str) {
        let path = path.to_string();

        if index == '?' && working_dir == '?' {
            self.not_added.push(path);
            return;
        }
        if index == '!' {
            return;
        }
        if matches!(
            (index, working_dir),
            ('D', 'D') | ('A', 'U') | ('U', 'D') | ('U', 'A') | ('D', 'U') | ('A', 'A') | ('U', 'U')
        ) {
            self.conflicted.push(path);
            return;
        }

        if index == 'A' {
            self.created.push(path.clone());
        }
        if index == 'D' || working_dir == 'D' {
            self.deleted.push(path.clone());
        }
        if index == 'M' || working_dir == 'M' {
            self.modified.push(path.clone());
        }
        if matches!(index, 'M' | 'A' | 'D' | 'R' | 'C') {
            self.staged.push(path);
        }
    }

    fn apply_branch_header(&mut self, header: &str) {
        for prefix in ["No commits yet on ", "Initial commit on "] {
            if let Some(branch) = header.strip_prefix(prefix) {
                self.current = Some(branch.to_string());
                return;
            }
        }
        if header.starts_with("HEAD (no branch)") {
            self.detached = true;
            return;
        }

        let (refs, counts) = match header.split_once(" [") {
            Some((refs, counts)) => (refs, Some(counts.trim_end_matches(']'))),
            None => (header, None),
        };

        match refs.split_once("...") {
            Some((branch, upstream)) => {
                self.current = Some(branch.to_string());
                self.tracking = Some(upstream.to_string());
            }
            None => self.current = Some(refs.to_string()),
        }

        for part in counts.into_iter().flat_map(|c| c.split(", ")) {
            if let Some(n) = part.strip_prefix("ahead ") {
                self.ahead = n.trim().parse().unwrap_or(0);
            } else if let Some(n) = part.strip_prefix("behind ") {
                self.behind = n.trim().parse().unwrap_or(0);
            }
        }
    }
}

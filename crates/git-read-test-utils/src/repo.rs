//! [`TestRepo`] builder for history-shaped test scenarios.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::git::{git, real_git_repo_with_commit};

/// A temporary git repository with helpers for shaping its history.
///
/// # Example
///
/// ```rust,no_run
/// use git_read_test_utils::repo::TestRepo;
///
/// let repo = TestRepo::with_commit();
/// repo.checkout_new_branch("feature");
/// repo.write_file("b.txt", "hello\n");
/// repo.commit_all("Add b.txt");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    /// Create an empty temporary directory (not yet a repository).
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a repository on `main` with one commit containing `README.md`.
    pub fn with_commit() -> Self {
        let repo = Self::new();
        real_git_repo_with_commit(repo.root());
        repo
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Run git in the repository root and return stdout.
    pub fn git(&self, args: &[&str]) -> String {
        git(self.root(), args)
    }

    /// Write `content` to `path` (relative to root), creating parent directories.
    pub fn write_file(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
    }

    /// Stage `path` without committing.
    pub fn stage(&self, path: &str) {
        self.git(&["add", "--", path]);
    }

    /// Stage everything and commit with `message`. Returns the new commit hash.
    pub fn commit_all(&self, message: &str) -> String {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-m", message]);
        self.head()
    }

    /// Full hash of HEAD.
    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"]).trim().to_string()
    }

    /// Create `name` from the current HEAD and switch to it.
    pub fn checkout_new_branch(&self, name: &str) {
        self.git(&["checkout", "-q", "-b", name]);
    }

    /// Switch to an existing branch.
    pub fn checkout(&self, name: &str) {
        self.git(&["checkout", "-q", name]);
    }
}

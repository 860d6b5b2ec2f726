//! MCP Tool Handlers
//!
//! The [`ToolDispatcher`] routes a named tool call to the matching query and
//! wraps the outcome as a single text block. Every failure, including an
//! unknown tool name, comes back as an `is_error` result rather than an `Err`.

use std::sync::Arc;

use git_read_query::{
    ChangedFilesQuery, DEFAULT_LOG_COUNT, DiffQuery, DiffRangeQuery, RepositoryQueries,
};
use serde_json::Value;

use crate::tools::{ToolCatalog, ToolDefinition, ToolResult};
use crate::{Error, Result};

/// Size ceiling for `git_diff` output, in bytes.
pub const MAX_DIFF_BYTES: usize = 100 * 1024;

/// Appended to diff output cut at [`MAX_DIFF_BYTES`].
pub const TRUNCATION_MARKER: &str = "\n... Output truncated due to size limit ...";

/// Returned by `git_diff` when there is nothing to show.
pub const NO_CHANGES: &str = "No changes.";

/// Routes tool calls to a [`RepositoryQueries`] implementation.
pub struct ToolDispatcher {
    catalog: ToolCatalog,
    queries: Arc<dyn RepositoryQueries>,
}

impl ToolDispatcher {
    pub fn new(catalog: ToolCatalog, queries: Arc<dyn RepositoryQueries>) -> Self {
        Self { catalog, queries }
    }

    /// The static catalog, unchanged and in declaration order.
    pub fn list_tools(&self) -> &[ToolDefinition] {
        self.catalog.tools()
    }

    /// Execute `name` with `arguments`. Never fails past this boundary.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        tracing::debug!(tool = %name, "Calling tool");

        match self.dispatch(name, &arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => {
                tracing::debug!(tool = %name, error = %e, "Tool call failed");
                ToolResult::error(format!("Error: {}", e))
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: &Value) -> Result<String> {
        if !self.catalog.contains(name) {
            return Err(Error::UnknownTool(name.to_string()));
        }

        match name {
            "git_status" => self.handle_status().await,
            "git_changed_files" => self.handle_changed_files(arguments).await,
            "git_diff" => self.handle_diff(arguments).await,
            "git_log" => self.handle_log(arguments).await,
            "git_blame" => self.handle_blame(arguments).await,
            "git_show" => self.handle_show(arguments).await,
            _ => Err(Error::UnknownTool(name.to_string())),
        }
    }

    async fn handle_status(&self) -> Result<String> {
        let status = self.queries.status().await?;
        Ok(serde_json::to_string_pretty(&status)?)
    }

    async fn handle_changed_files(&self, arguments: &Value) -> Result<String> {
        let target = required_str(arguments, "target")?;
        let source = optional_str(arguments, "source")?;

        let query = ChangedFilesQuery::new(target, source.map(String::from));
        let files = self.queries.changed_files(&query).await?;
        Ok(serde_json::to_string_pretty(&files)?)
    }

    /// Routes to a revision diff when `target` is given, otherwise a plain diff.
    async fn handle_diff(&self, arguments: &Value) -> Result<String> {
        let staged = optional_bool(arguments, "staged")?.unwrap_or(false);
        let target = optional_str(arguments, "target")?;
        let source = optional_str(arguments, "source")?;
        let files = optional_str_list(arguments, "files")?;
        let use_three_dot = optional_bool(arguments, "use_3_dot")?.unwrap_or(false);

        let diff = match target {
            Some(target) => {
                let query = DiffRangeQuery {
                    target: target.to_string(),
                    source: source.map(String::from),
                    files,
                    use_three_dot,
                };
                self.queries.diff_range(&query).await?
            }
            None => self.queries.diff(&DiffQuery { staged, files }).await?,
        };

        let diff = truncate_output(diff, MAX_DIFF_BYTES);
        if diff.is_empty() {
            Ok(NO_CHANGES.to_string())
        } else {
            Ok(diff)
        }
    }

    async fn handle_log(&self, arguments: &Value) -> Result<String> {
        let max_count = optional_count(arguments, "max_count")?
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_LOG_COUNT);
        Ok(self.queries.log(max_count).await?)
    }

    async fn handle_blame(&self, arguments: &Value) -> Result<String> {
        let path = required_str(arguments, "path")?;
        Ok(self.queries.blame(path).await?)
    }

    async fn handle_show(&self, arguments: &Value) -> Result<String> {
        let object = required_str(arguments, "object")?;
        Ok(self.queries.show(object).await?)
    }
}

/// Cut `text` to at most `limit` bytes (on a char boundary) and append
/// [`TRUNCATION_MARKER`]. Text within the limit is returned unchanged.
pub fn truncate_output(mut text: String, limit: usize) -> String {
    if text.len() <= limit {
        return text;
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str(TRUNCATION_MARKER);
    text
}

// ============================================================================
// Argument extraction
// ============================================================================

/// A non-empty string argument that must be present.
fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MissingArgument(format!("{key} (string)")))
}

/// An optional string; absent, `null`, and empty all read as `None`.
fn optional_str<'a>(arguments: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(Error::InvalidArgument(format!(
            "{key} must be a string, got {other}"
        ))),
    }
}

fn optional_bool(arguments: &Value, key: &str) -> Result<Option<bool>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(Error::InvalidArgument(format!(
            "{key} must be a boolean, got {other}"
        ))),
    }
}

/// A non-negative whole number. Accepts `5.0` since some clients send floats.
fn optional_count(arguments: &Value, key: &str) -> Result<Option<usize>> {
    let value = match arguments.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    let invalid = || Error::InvalidArgument(format!("{key} must be a positive integer, got {value}"));

    if let Some(n) = value.as_u64() {
        return usize::try_from(n).map(Some).map_err(|_| invalid());
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 => Ok(Some(f as usize)),
        _ => Err(invalid()),
    }
}

/// An optional array of strings, order and duplicates preserved.
fn optional_str_list(arguments: &Value, key: &str) -> Result<Vec<String>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(String::from).ok_or_else(|| {
                    Error::InvalidArgument(format!("{key} must contain only strings, got {item}"))
                })
            })
            .collect(),
        Some(other) => Err(Error::InvalidArgument(format!(
            "{key} must be an array of strings, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use git_read_query::{FailureKind, StatusRecord};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Mutex;

    /// Which query the dispatcher chose, with its arguments.
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Status,
        Diff(DiffQuery),
        DiffRange(DiffRangeQuery),
        Log(usize),
        Blame(String),
        Show(String),
        ChangedFiles(ChangedFilesQuery),
    }

    #[derive(Default)]
    struct FakeQueries {
        calls: Mutex<Vec<Call>>,
        text: String,
        files: Vec<String>,
        fail_with: Option<String>,
    }

    impl FakeQueries {
        fn returning(text: &str) -> Self {
            Self {
                text: text.to_string(),
                ..Self::default()
            }
        }

        fn failing(stderr: &str) -> Self {
            Self {
                fail_with: Some(stderr.to_string()),
                ..Self::default()
            }
        }

        fn record(&self, call: Call) -> git_read_query::Result<()> {
            self.calls.lock().unwrap().push(call);
            match &self.fail_with {
                Some(stderr) => Err(git_read_query::Error::backend(stderr)),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RepositoryQueries for FakeQueries {
        async fn status(&self) -> git_read_query::Result<StatusRecord> {
            self.record(Call::Status)?;
            Ok(StatusRecord {
                current: Some("main".into()),
                modified: vec!["a.txt".into()],
                ..StatusRecord::default()
            })
        }

        async fn diff(&self, query: &DiffQuery) -> git_read_query::Result<String> {
            self.record(Call::Diff(query.clone()))?;
            Ok(self.text.clone())
        }

        async fn diff_range(&self, query: &DiffRangeQuery) -> git_read_query::Result<String> {
            self.record(Call::DiffRange(query.clone()))?;
            Ok(self.text.clone())
        }

        async fn log(&self, max_count: usize) -> git_read_query::Result<String> {
            self.record(Call::Log(max_count))?;
            Ok(self.text.clone())
        }

        async fn blame(&self, path: &str) -> git_read_query::Result<String> {
            self.record(Call::Blame(path.to_string()))?;
            Ok(self.text.clone())
        }

        async fn show(&self, object: &str) -> git_read_query::Result<String> {
            self.record(Call::Show(object.to_string()))?;
            Ok(self.text.clone())
        }

        async fn changed_files(
            &self,
            query: &ChangedFilesQuery,
        ) -> git_read_query::Result<Vec<String>> {
            self.record(Call::ChangedFiles(query.clone()))?;
            Ok(self.files.clone())
        }
    }

    fn dispatcher(queries: FakeQueries) -> (ToolDispatcher, Arc<FakeQueries>) {
        let queries = Arc::new(queries);
        let dispatcher = ToolDispatcher::new(ToolCatalog::builtin(), queries.clone());
        (dispatcher, queries)
    }

    #[test]
    fn list_tools_returns_catalog_unchanged() {
        let (dispatcher, _) = dispatcher(FakeQueries::default());
        let listed: Vec<&str> = dispatcher.list_tools().iter().map(|t| t.name.as_str()).collect();
        let declared: Vec<String> = ToolCatalog::builtin()
            .tools()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(listed, declared);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_result() {
        let (dispatcher, queries) = dispatcher(FakeQueries::default());
        let result = dispatcher.call_tool("git_push", json!({})).await;

        assert!(result.is_error());
        assert!(result.first_text().contains("Unknown tool: git_push"));
        assert!(queries.calls().is_empty());
    }

    #[tokio::test]
    async fn diff_without_target_routes_to_plain_diff_with_defaults() {
        let (dispatcher, queries) = dispatcher(FakeQueries::returning("diff text"));
        let result = dispatcher.call_tool("git_diff", Value::Null).await;

        assert_eq!(result.first_text(), "diff text");
        assert_eq!(queries.calls(), vec![Call::Diff(DiffQuery::default())]);
    }

    #[tokio::test]
    async fn diff_with_target_routes_to_range() {
        let (dispatcher, queries) = dispatcher(FakeQueries::returning("x"));
        dispatcher
            .call_tool(
                "git_diff",
                json!({
                    "staged": true,
                    "target": "main",
                    "source": "feature",
                    "files": ["b.txt", "a.txt", "b.txt"],
                    "use_3_dot": true
                }),
            )
            .await;

        assert_eq!(
            queries.calls(),
            vec![Call::DiffRange(
                DiffRangeQuery::new("main")
                    .source("feature")
                    .files(["b.txt", "a.txt", "b.txt"])
                    .three_dot(true)
            )]
        );
    }

    #[tokio::test]
    async fn diff_with_empty_target_is_plain_diff() {
        let (dispatcher, queries) = dispatcher(FakeQueries::returning("x"));
        dispatcher
            .call_tool("git_diff", json!({"target": "", "staged": true}))
            .await;

        assert_eq!(
            queries.calls(),
            vec![Call::Diff(DiffQuery {
                staged: true,
                files: vec![]
            })]
        );
    }

    #[tokio::test]
    async fn empty_diff_reads_no_changes() {
        let (dispatcher, _) = dispatcher(FakeQueries::returning(""));
        let result = dispatcher.call_tool("git_diff", json!({"staged": true})).await;

        assert!(!result.is_error());
        assert_eq!(result.first_text(), "No changes.");
    }

    #[tokio::test]
    async fn large_diff_is_truncated_to_ceiling_plus_marker() {
        let big = "x".repeat(MAX_DIFF_BYTES + 500);
        let (dispatcher, _) = dispatcher(FakeQueries::returning(&big));
        let result = dispatcher.call_tool("git_diff", json!({})).await;

        let text = result.first_text();
        assert!(text.ends_with(TRUNCATION_MARKER));
        assert_eq!(text.len(), MAX_DIFF_BYTES + TRUNCATION_MARKER.len());
    }

    #[tokio::test]
    async fn diff_at_ceiling_is_unmodified() {
        let exact = "y".repeat(MAX_DIFF_BYTES);
        let (dispatcher, _) = dispatcher(FakeQueries::returning(&exact));
        let result = dispatcher.call_tool("git_diff", json!({})).await;

        assert_eq!(result.first_text(), exact);
    }

    #[tokio::test]
    async fn other_tools_are_not_bounded() {
        let big = "z".repeat(MAX_DIFF_BYTES * 2);
        let (dispatcher, _) = dispatcher(FakeQueries::returning(&big));
        let result = dispatcher.call_tool("git_show", json!({"object": "HEAD"})).await;

        assert_eq!(result.first_text().len(), big.len());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes; a limit of 3 falls inside the second one.
        let text = truncate_output("éé".to_string(), 3);
        assert_eq!(text, format!("é{TRUNCATION_MARKER}"));
    }

    #[tokio::test]
    async fn changed_files_requires_target() {
        let (dispatcher, queries) = dispatcher(FakeQueries::default());

        for args in [json!({}), json!({"target": 3}), json!({"target": ""})] {
            let result = dispatcher.call_tool("git_changed_files", args).await;
            assert!(result.is_error());
            assert!(result.first_text().contains("Missing required argument: target"));
        }
        assert!(queries.calls().is_empty());
    }

    #[tokio::test]
    async fn changed_files_renders_json_list() {
        let queries = FakeQueries {
            files: vec!["b.txt".into()],
            ..FakeQueries::default()
        };
        let (dispatcher, queries) = dispatcher(queries);
        let result = dispatcher
            .call_tool("git_changed_files", json!({"target": "main"}))
            .await;

        let files: Vec<String> = serde_json::from_str(result.first_text()).unwrap();
        assert_eq!(files, vec!["b.txt"]);
        assert_eq!(
            queries.calls(),
            vec![Call::ChangedFiles(ChangedFilesQuery::new("main", None))]
        );
    }

    #[tokio::test]
    async fn status_renders_json_record() {
        let (dispatcher, _) = dispatcher(FakeQueries::default());
        let result = dispatcher.call_tool("git_status", json!({})).await;

        let status: Value = serde_json::from_str(result.first_text()).unwrap();
        assert_eq!(status["current"], "main");
        assert_eq!(status["modified"], json!(["a.txt"]));
    }

    #[tokio::test]
    async fn log_count_defaults_and_fallbacks() {
        let (dispatcher, queries) = dispatcher(FakeQueries::returning("[]"));

        dispatcher.call_tool("git_log", json!({})).await;
        dispatcher.call_tool("git_log", json!({"max_count": 0})).await;
        dispatcher.call_tool("git_log", json!({"max_count": 3})).await;
        dispatcher.call_tool("git_log", json!({"max_count": 2.0})).await;

        assert_eq!(
            queries.calls(),
            vec![Call::Log(10), Call::Log(10), Call::Log(3), Call::Log(2)]
        );
    }

    #[rstest]
    #[case(json!("5"))]
    #[case(json!(-1))]
    #[case(json!(1.5))]
    #[case(json!([3]))]
    #[tokio::test]
    async fn log_rejects_non_integer_count(#[case] max_count: Value) {
        let (dispatcher, queries) = dispatcher(FakeQueries::returning("[]"));

        let result = dispatcher
            .call_tool("git_log", json!({ "max_count": max_count }))
            .await;
        assert!(result.is_error());
        assert!(result.first_text().contains("max_count"));
        assert!(queries.calls().is_empty());
    }

    #[tokio::test]
    async fn blame_and_show_require_their_argument() {
        let (dispatcher, _) = dispatcher(FakeQueries::default());

        let blame = dispatcher.call_tool("git_blame", json!({})).await;
        assert!(blame.first_text().contains("Missing required argument: path"));

        let show = dispatcher.call_tool("git_show", json!({"object": null})).await;
        assert!(show.first_text().contains("Missing required argument: object"));
    }

    #[tokio::test]
    async fn wrong_optional_types_are_rejected() {
        let (dispatcher, queries) = dispatcher(FakeQueries::returning("x"));

        for args in [
            json!({"staged": "yes"}),
            json!({"files": "a.txt"}),
            json!({"files": ["a.txt", 1]}),
            json!({"target": ["main"]}),
        ] {
            let result = dispatcher.call_tool("git_diff", args).await;
            assert!(result.is_error());
            assert!(result.first_text().starts_with("Error: Invalid argument"));
        }
        assert!(queries.calls().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_is_an_error_result() {
        let (dispatcher, _) = dispatcher(FakeQueries::failing("fatal: no such path 'new.txt' in HEAD"));
        let result = dispatcher.call_tool("git_blame", json!({"path": "new.txt"})).await;

        assert!(result.is_error());
        assert!(result.first_text().starts_with("Error: "));
        assert!(result.first_text().contains("no such path 'new.txt'"));
        assert_eq!(
            git_read_query::Error::backend("fatal: no such path 'new.txt' in HEAD").failure_kind(),
            Some(FailureKind::PathNotFound)
        );
    }
}

//! MCP tool catalog
//!
//! The catalog is built once at startup and handed to the dispatcher; it is
//! never mutated afterwards.
//!
//! # Tools
//!
//! - `git_status` - Working tree status as a structured record
//! - `git_changed_files` - Names of files changed between revisions
//! - `git_diff` - Unstaged, staged, or revision-to-revision diff
//! - `git_log` - Recent commits
//! - `git_blame` - Per-line attribution of a tracked file
//! - `git_show` - A commit, tag, or file content at a revision

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content block
    pub fn first_text(&self) -> &str {
        match self.content.first() {
            Some(ToolContent::Text { text }) => text,
            None => "",
        }
    }
}

/// Immutable, ordered set of tool definitions.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        Self { tools }
    }

    /// The git inspection tools, in declaration order.
    pub fn builtin() -> Self {
        Self::new(get_tool_definitions())
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "git_status".to_string(),
            description: "Get the git status of the repository. Returns modified, staged, and untracked files.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "git_changed_files".to_string(),
            description: "Get list of changed files between branches or commits. Useful for listing files to review in a PR.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "target": {
                        "type": "string",
                        "description": "Target branch/commit to compare."
                    },
                    "source": {
                        "type": "string",
                        "description": "Optional: Source branch/commit to compare against target. Used as `git diff --name-only target...source`."
                    }
                },
                "required": ["target"]
            }),
        },
        ToolDefinition {
            name: "git_diff".to_string(),
            description: "Get the git diff of the repository. By default shows unstaged changes. Can show staged changes, or compare branches/commits.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "staged": {
                        "type": "boolean",
                        "description": "If true, shows cached (staged) changes. Default is false."
                    },
                    "target": {
                        "type": "string",
                        "description": "Optional: Target branch/commit to compare. If provided, compares target against source (or working tree if source is omitted)."
                    },
                    "source": {
                        "type": "string",
                        "description": "Optional: Source branch/commit to compare against target. Used as `git diff target source`."
                    },
                    "files": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional: List of files to include in the diff. If omitted, shows all changed files."
                    },
                    "use_3_dot": {
                        "type": "boolean",
                        "description": "If true, uses 3-dot comparison (target...source) which shows changes in source since it branched from target. Default is false."
                    }
                }
            }),
        },
        ToolDefinition {
            name: "git_log".to_string(),
            description: "Get the git log of the repository.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "max_count": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Maximum number of commits to show. Default is 10."
                    }
                }
            }),
        },
        ToolDefinition {
            name: "git_blame".to_string(),
            description: "Show what revision and author last modified each line of a file.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the file to blame."
                    }
                },
                "required": ["path"]
            }),
        },
        ToolDefinition {
            name: "git_show".to_string(),
            description: "Show various types of objects (commits, tags, etc.) or file content at a specific revision.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "object": {
                        "type": "string",
                        "description": "The object to show (e.g., commit hash, \"HEAD:path/to/file\")."
                    }
                },
                "required": ["object"]
            }),
        },
    ]
}

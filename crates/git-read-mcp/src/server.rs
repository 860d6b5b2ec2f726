//! MCP Server implementation
//!
//! Reads one JSON-RPC message per line, answers it, then reads the next.
//! Requests are never handled concurrently.

use std::sync::Arc;

use git_read_query::{CliRunner, QueryEngine};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::ServerConfig;
use crate::handlers::ToolDispatcher;
use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeParams, InitializeResult,
    JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::tools::ToolCatalog;
use crate::{Error, Result};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "mcp-git-read";

/// MCP server exposing read-only git inspection tools.
///
/// # Example
///
/// ```ignore
/// use git_read_mcp::{GitReadServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = GitReadServer::new(&ServerConfig::new("."));
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct GitReadServer {
    dispatcher: ToolDispatcher,
}

impl GitReadServer {
    /// Server backed by the git CLI, rooted at `config.root`.
    pub fn new(config: &ServerConfig) -> Self {
        let runner = CliRunner::new(&config.root).with_program(&config.git_program);
        let queries = Arc::new(QueryEngine::new(runner));
        Self::with_dispatcher(ToolDispatcher::new(ToolCatalog::builtin(), queries))
    }

    pub fn with_dispatcher(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Serve MCP over the process's stdin and stdout.
    pub async fn run(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        tracing::info!("MCP server ready, listening on stdio");
        self.serve(stdin, stdout).await
    }

    /// Serve until `reader` reaches EOF. Only transport I/O errors escape;
    /// a line that is not UTF-8 gets a parse error like any other bad line.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    tracing::debug!(request = %line, "Received message");

                    match self.handle_message(line).await {
                        Ok(response) => response,
                        Err(e) => {
                            let error_response = JsonRpcResponse::error(
                                None,
                                INTERNAL_ERROR,
                                format!("Internal error: {}", e),
                            );
                            serde_json::to_string(&error_response)?
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Message is not valid UTF-8");
                    let error_response =
                        JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                    serde_json::to_string(&error_response)?
                }
            };

            // Notifications produce no output.
            if response.is_empty() {
                continue;
            }

            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle a single message, returning the serialized response or an
    /// empty string when no response is due.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable message");
                let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        let id = value.get("id").cloned().filter(|id| !id.is_null());
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid request: {}", e));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        if request.id.is_none() {
            tracing::debug!(method = %request.method, "Notification received");
            return Ok(String::new());
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params)?,
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    fn handle_initialize(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        match serde_json::from_value::<InitializeParams>(params) {
            Ok(params) => tracing::info!(
                client = %params.client_info.name,
                client_version = %params.client_info.version,
                protocol = %params.protocol_version,
                "Client connected"
            ),
            Err(e) => tracing::debug!(error = %e, "initialize without client info"),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.dispatcher.list_tools() }))
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                ));
            }
        };

        let result = self.dispatcher.call_tool(&params.name, params.arguments).await;
        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }
}

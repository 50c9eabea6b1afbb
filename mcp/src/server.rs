//! Stdio protocol server.
//!
//! DESIGN
//! ======
//! One JSON-RPC message per input line, one response per output line.
//! Requests are handled in order; notifications get no response. Stdout
//! carries protocol frames only, so all logging goes to stderr.

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::{RpcError, RpcRequest, RpcResponse};
use crate::tools::{self, ToolRouter};

pub const SERVER_NAME: &str = "obsixiv-mcp";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

pub struct McpServer {
    tools: ToolRouter,
}

impl McpServer {
    #[must_use]
    pub fn new(tools: ToolRouter) -> Self {
        Self { tools }
    }

    /// Serve until `reader` reaches EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing a response fails.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let mut frame = serde_json::to_vec(&response)?;
            frame.push(b'\n');
            writer.write_all(&frame).await?;
            writer.flush().await?;
        }
        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one raw line; `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "unparsable message");
                return Some(RpcResponse::failure(Value::Null, &RpcError::Parse(e.to_string())));
            }
        };

        if request.jsonrpc.as_deref().is_some_and(|v| v != crate::protocol::JSONRPC_VERSION) {
            let id = request.id.unwrap_or(Value::Null);
            return Some(RpcResponse::failure(id, &RpcError::InvalidRequest("jsonrpc must be \"2.0\"".into())));
        }

        if request.is_notification() {
            tracing::debug!(method = %request.method, "notification");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        Some(match self.dispatch(&request.method, request.params).await {
            Ok(result) => RpcResponse::success(id, result),
            Err(e) => {
                tracing::warn!(method = %request.method, error = %e, "request failed");
                RpcResponse::failure(id, &e)
            }
        })
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(initialize_result(&params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::definitions() })),
            "tools/call" => {
                let call: CallParams =
                    serde_json::from_value(params).map_err(|e| RpcError::InvalidParams(e.to_string()))?;
                let result = self.tools.call(&call.name, call.arguments).await;
                serde_json::to_value(result).map_err(|e| RpcError::InvalidParams(e.to_string()))
            }
            other => Err(RpcError::MethodNotFound(other.to_string())),
        }
    }
}

/// Echo the client's protocol version when it sends one.
fn initialize_result(params: &Value) -> Value {
    let version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);
    json!({
        "protocolVersion": version,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
    })
}

#[cfg(test)]
#[path = "server_test.rs"]
mod tests;

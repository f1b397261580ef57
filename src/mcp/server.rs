//! Stdio server - newline-delimited JSON-RPC host for the tool router
//!
//! Provides:
//! - Method routing for tools, prompts and resources
//! - One task per request, with a single writer task owning the output
//! - Parse and invalid-request errors for malformed lines

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::tools::ToolRouter;

use super::messages::{Methods, RpcError, RpcRequest, RpcResponse};
use super::{prompts, resources};

/// Protocol revision reported from `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported from `initialize`
pub const SERVER_NAME: &str = "kqlgate";

pub struct McpServer {
    router: Arc<dyn ToolRouter>,
}

impl McpServer {
    pub fn new(router: Arc<dyn ToolRouter>) -> Self {
        Self { router }
    }

    /// Handle a single message; notifications produce no response
    pub async fn handle(&self, request: RpcRequest) -> Option<RpcResponse> {
        let Some(id) = request.id.clone() else {
            log::debug!("Notification: {}", request.method);
            return None;
        };

        let result = match request.method.as_str() {
            Methods::INITIALIZE => Ok(self.initialize()),
            Methods::PING => Ok(json!({})),
            Methods::TOOLS_LIST => Ok(json!({ "tools": self.router.descriptors() })),
            Methods::TOOLS_CALL => self.call_tool(&request.params).await,
            Methods::PROMPTS_LIST => Ok(prompts::list()),
            Methods::PROMPTS_GET => required_str(&request.params, "name").and_then(|name| {
                prompts::get(name, request.params.get("arguments").and_then(Value::as_object))
            }),
            Methods::RESOURCES_LIST => Ok(resources::list()),
            Methods::RESOURCES_READ => required_str(&request.params, "uri").and_then(resources::read),
            other => Err(RpcError::method_not_found(other)),
        };

        Some(match result {
            Ok(value) => RpcResponse::success(id, value),
            Err(error) => RpcResponse::error(id, error),
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "prompts": {},
                "resources": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, params: &Value) -> std::result::Result<Value, RpcError> {
        let name = required_str(params, "name")?;
        let empty = Map::new();
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(_) => return Err(RpcError::invalid_params("'arguments' must be an object")),
        };

        let start = Instant::now();
        let outcome = self.router.call(name, arguments).await;
        log::debug!("tools/call {} finished in {}ms", name, start.elapsed().as_millis());

        Ok(match outcome {
            Ok(content) => json!({ "content": content, "isError": false }),
            Err(e) => json!({
                "content": [{ "type": "text", "text": e.to_string() }],
                "isError": true
            }),
        })
    }

    /// Serve until `reader` reaches EOF, then drain in-flight requests
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<RpcResponse>();
        let mut writer_task = tokio::spawn(write_responses(writer, rx));
        let mut writer_exit = None;

        let mut reader = reader;
        let mut line = String::new();
        loop {
            line.clear();
            let read = tokio::select! {
                read = reader.read_line(&mut line) => read?,
                joined = &mut writer_task => {
                    log::warn!("Output closed, no longer reading requests");
                    writer_exit = Some(joined);
                    break;
                }
            };
            if read == 0 {
                log::info!("Input closed, waiting for in-flight requests");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request = match parse_line(trimmed) {
                Ok(request) => request,
                Err(response) => {
                    if tx.send(response).is_err() {
                        break;
                    }
                    continue;
                }
            };

            let server = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle(request).await {
                    if tx.send(response).is_err() {
                        log::debug!("Dropping response, output closed");
                    }
                }
            });
        }

        drop(tx);
        let joined = match writer_exit {
            Some(joined) => joined,
            None => writer_task.await,
        };
        match joined {
            Ok(result) => result,
            Err(e) => {
                log::error!("Writer task failed: {}", e);
                Ok(())
            }
        }
    }

    /// Serve on the process stdin/stdout
    pub async fn serve_stdio(self: Arc<Self>) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

fn required_str<'a>(params: &'a Value, key: &str) -> std::result::Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params(format!("Missing required parameter '{}'", key)))
}

/// Decode one line, or build the error response for it
fn parse_line(line: &str) -> std::result::Result<RpcRequest, RpcResponse> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| RpcResponse::error(Value::Null, RpcError::parse_error(format!("Parse error: {}", e))))?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| RpcResponse::error(id, RpcError::invalid_request(format!("Invalid request: {}", e))))
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<RpcResponse>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.shutdown().await?;
    Ok(())
}

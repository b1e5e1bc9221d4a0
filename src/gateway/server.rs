//! Gateway server (C8): the stdio MCP server surface AI assistants connect
//! to. Reads one JSON-RPC frame per line from stdin, dispatches, writes one
//! frame per line to stdout.
//!
//! Grounded in `original_source/mcp/server/stdio_server.py`'s `_read_loop`/
//! `handle_request` dispatch shape and `original_source/mcp/gateway.py`'s
//! handler bodies, reusing the teacher's small-targeted-unit-test style from
//! `gateway/router.rs`. The gateway answers `initialize` directly — it does
//! not depend on any provider being connected (spec §4.8).

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::aggregator::Catalog;
use crate::codec;
use crate::conflict;
use crate::error::rpc_codes;
use crate::protocol::{
    self, ClientCapabilities, Implementation, InitializeParams, InitializeResult, JsonRpcMessage,
    JsonRpcRequest, JsonRpcResponse, PromptsCapability, PromptsListResult, RequestId,
    ResourcesCapability, ResourcesListResult, ResourcesReadParams, ServerCapabilities,
    ToolsCapability, ToolsCallParams, ToolsListResult, methods,
};
use crate::router::{ResourceRouter, ToolRouter};
use crate::supervisor::Supervisor;
use crate::{Error, Result};

/// Gateway identity reported at `initialize`.
const SERVER_NAME: &str = "mcp-gateway";

/// The unified MCP server: dispatches each incoming request to the
/// supervisor's catalog/routers and writes back the correlated response.
pub struct Gateway {
    supervisor: Arc<Supervisor>,
}

impl Gateway {
    /// Wrap an already-started [`Supervisor`].
    #[must_use]
    pub fn new(supervisor: Arc<Supervisor>) -> Self {
        Self { supervisor }
    }

    /// Run the stdio read/dispatch/write loop until stdin reaches EOF.
    pub async fn run(&self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        self.run_on(stdin, &mut stdout).await
    }

    async fn run_on(&self, stdin: Stdin, stdout: &mut Stdout) -> Result<()> {
        let mut lines = BufReader::new(stdin).lines();
        tracing::info!("gateway listening on stdio");
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "error reading stdin");
                    break;
                }
            };

            let message = match codec::decode_line(&line) {
                Ok(None) => continue,
                Ok(Some(msg)) => msg,
                Err(e) => {
                    let resp = JsonRpcResponse::error(
                        Some(RequestId::String("unknown".to_string())),
                        rpc_codes::PARSE_ERROR,
                        format!("Parse error: {e}"),
                    );
                    self.write_response(stdout, &resp).await?;
                    continue;
                }
            };

            let JsonRpcMessage::Request(request) = message else {
                // Notifications and stray responses need no reply.
                continue;
            };

            let response = self.handle_request(&request).await;
            self.write_response(stdout, &response).await?;
        }
        tracing::info!("gateway stdin closed, stopping");
        Ok(())
    }

    async fn write_response(&self, stdout: &mut Stdout, resp: &JsonRpcResponse) -> Result<()> {
        let line = codec::encode_line(resp)?;
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }

    /// Dispatch one request to its handler, mapping any error to a
    /// `JsonRpcResponse` with the right code and, for handler-reported
    /// domain errors, structured `error.data` (spec §7).
    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request),
            methods::TOOLS_LIST => self.handle_tools_list().await,
            methods::TOOLS_CALL => self.handle_tools_call(request).await,
            methods::RESOURCES_LIST => self.handle_resources_list().await,
            methods::RESOURCES_READ => self.handle_resources_read(request).await,
            methods::PROMPTS_LIST => self.handle_prompts_list().await,
            methods::PROMPTS_GET => Err(Error::NotImplemented(
                "prompt routing not yet implemented".to_string(),
            )),
            other => {
                return JsonRpcResponse::error(
                    Some(id),
                    rpc_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {other}"),
                );
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => self.error_response(id, &e),
        }
    }

    fn error_response(&self, id: RequestId, error: &Error) -> JsonRpcResponse {
        let code = error.to_rpc_code();
        let catalog = self.supervisor.catalog();

        let data = match error {
            Error::AmbiguousTool(name) => catalog
                .as_ref()
                .map(|c| conflict::ambiguity_error(name, c))
                .and_then(|d| serde_json::to_value(d).ok()),
            Error::ToolNotFound(name) => catalog
                .as_ref()
                .map(|c| conflict::not_found_error(name, c))
                .and_then(|d| serde_json::to_value(d).ok()),
            Error::ProviderUnavailable(name) | Error::ProviderNotFound(name) => {
                serde_json::to_value(conflict::provider_unavailable_error(name)).ok()
            }
            _ => error
                .error_kind()
                .map(|kind| serde_json::json!({"type": kind})),
        };

        data.map_or_else(
            || JsonRpcResponse::error(Some(id.clone()), code, error.to_string()),
            |data| JsonRpcResponse::error_with_data(Some(id), code, error.to_string(), data),
        )
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> Result<serde_json::Value> {
        let _params: InitializeParams = request
            .params
            .clone()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_else(|| InitializeParams {
                protocol_version: protocol::PROTOCOL_VERSION.to_string(),
                capabilities: ClientCapabilities::default(),
                client_info: Implementation {
                    name: "unknown".to_string(),
                    version: "0".to_string(),
                },
            });

        let result = InitializeResult {
            protocol_version: protocol::PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                resources: Some(ResourcesCapability::default()),
                tools: Some(ToolsCapability::default()),
                prompts: Some(PromptsCapability::default()),
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn catalog(&self) -> Arc<Catalog> {
        if let Some(catalog) = self.supervisor.catalog() {
            return catalog;
        }
        self.supervisor.refresh_catalog().await;
        self.supervisor
            .catalog()
            .expect("refresh_catalog always publishes a snapshot")
    }

    async fn handle_tools_list(&self) -> Result<serde_json::Value> {
        let catalog = self.catalog().await;
        let result = ToolsListResult {
            tools: catalog.tools().to_vec(),
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> Result<serde_json::Value> {
        let params: ToolsCallParams = request
            .params
            .clone()
            .ok_or_else(|| Error::Protocol("tool name required".to_string()))
            .and_then(|v| serde_json::from_value(v).map_err(|e| Error::Protocol(e.to_string())))?;
        if params.name.is_empty() {
            return Err(Error::Protocol("tool name required".to_string()));
        }

        let catalog = self.catalog().await;
        let providers = self.supervisor.providers();
        let router = ToolRouter::new(&providers, &catalog);
        router.route_tool_call(&params.name, params.arguments).await
    }

    async fn handle_resources_list(&self) -> Result<serde_json::Value> {
        let catalog = self.catalog().await;
        let result = ResourcesListResult {
            resources: catalog.resources().to_vec(),
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_resources_read(&self, request: &JsonRpcRequest) -> Result<serde_json::Value> {
        let params: ResourcesReadParams = request
            .params
            .clone()
            .ok_or_else(|| Error::Protocol("resource URI required".to_string()))
            .and_then(|v| serde_json::from_value(v).map_err(|e| Error::Protocol(e.to_string())))?;

        let catalog = self.catalog().await;
        let providers = self.supervisor.providers();
        let router = ResourceRouter::new(&providers, &catalog);
        let contents = router.route_resource_read(&params.uri).await?;
        Ok(serde_json::to_value(protocol::ResourcesReadResult { contents })?)
    }

    async fn handle_prompts_list(&self) -> Result<serde_json::Value> {
        let catalog = self.catalog().await;
        let result = PromptsListResult {
            prompts: catalog.prompts().to_vec(),
        };
        Ok(serde_json::to_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn gateway() -> Gateway {
        Gateway::new(Arc::new(Supervisor::new(Arc::new(Registry::new()))))
    }

    #[tokio::test]
    async fn initialize_succeeds_with_no_providers_connected() {
        let gw = gateway();
        let request = JsonRpcRequest::new(RequestId::Number(1), methods::INITIALIZE, None);
        let resp = gw.handle_request(&request).await;
        assert!(resp.result.is_some());
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let gw = gateway();
        let request = JsonRpcRequest::new(RequestId::Number(1), "bogus/method", None);
        let resp = gw.handle_request(&request).await;
        assert_eq!(resp.error.unwrap().code, rpc_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn prompts_get_is_explicitly_not_implemented() {
        let gw = gateway();
        let request = JsonRpcRequest::new(RequestId::Number(1), methods::PROMPTS_GET, None);
        let resp = gw.handle_request(&request).await;
        assert_eq!(resp.error.unwrap().code, rpc_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn tools_call_without_name_is_invalid_request() {
        let gw = gateway();
        let request = JsonRpcRequest::new(
            RequestId::Number(1),
            methods::TOOLS_CALL,
            Some(serde_json::json!({})),
        );
        let resp = gw.handle_request(&request).await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, rpc_codes::INVALID_REQUEST);
    }
}

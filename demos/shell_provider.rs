//! Demo provider adapter: shells out to a configurable command over stdio.
//!
//! One concrete [`ProviderAdapter`] implementation, analogous to the
//! reference implementation's single shipped adapter
//! (`provider_mcps/enterprise/atlassian`) — a worked example of the
//! `Provider` capability (C4) and a fixture for integration tests. It
//! assumes whatever it shells out to is an MCP server speaking newline-
//! delimited JSON-RPC over stdio and is already authenticated; OAuth is out
//! of scope (SPEC_FULL.md §11).
//!
//! Run with: `cargo run --example shell_provider -- <command> [args...]`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use mcp_gateway::provider::{ProviderAdapter, ProviderInstance, TransportKind};
use mcp_gateway::transport::{StdioTransport, Transport};
use mcp_gateway::{Error, Result};

/// Adapter for an MCP server reached by spawning a configured command.
///
/// Config shape: `{"command": ["program", "arg", ...], "cwd": "optional/dir"}`.
pub struct ShellProviderAdapter;

#[async_trait]
impl ProviderAdapter for ShellProviderAdapter {
    fn name(&self) -> &str {
        "shell"
    }

    fn display_name(&self) -> &str {
        "Shell Command Provider"
    }

    fn category(&self) -> Option<&str> {
        Some("demo")
    }

    fn transport_kind(&self) -> TransportKind {
        TransportKind::Stdio
    }

    fn config_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["command"],
            "properties": {
                "command": {"type": "array", "items": {"type": "string"}},
                "cwd": {"type": "string"}
            }
        })
    }

    fn create_transport(&self, config: &Value) -> Result<Arc<dyn Transport>> {
        let command: Vec<String> = config
            .get("command")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Configuration("shell provider requires a 'command' array".to_string()))?
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        if command.is_empty() {
            return Err(Error::Configuration("'command' must not be empty".to_string()));
        }
        let cwd = config.get("cwd").and_then(Value::as_str).map(str::to_string);
        Ok(Arc::new(StdioTransport::new(command, cwd)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    mcp_gateway::setup_tracing("info", None)?;

    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() {
        eprintln!("usage: shell_provider <command> [args...]");
        std::process::exit(2);
    }

    let instance = ProviderInstance::new(
        Arc::new(ShellProviderAdapter),
        &serde_json::json!({ "command": argv }),
    )?;
    instance.connect(&serde_json::json!({ "command": argv })).await?;

    let tools = instance.list_tools().await?;
    println!("connected; {} tool(s) published:", tools.len());
    for tool in tools {
        println!("  {}", tool.name);
    }

    instance.disconnect().await?;
    Ok(())
}

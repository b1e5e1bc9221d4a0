//! Provider (C4): an addressable MCP backend — connect, list/call, disconnect.
//!
//! Splits into two pieces: [`ProviderAdapter`] is the *type* — static
//! metadata plus a `create_transport` factory, the thing the registry (C5)
//! indexes by name — and [`ProviderInstance`] is a connected (or
//! connecting, or failed) *instance* of one, wrapping a
//! [`ClientDemux`] over whatever transport the adapter built. Grounded in
//! the teacher's `provider/mod.rs` `Provider` trait/registry shape and
//! `original_source/mcp/provider.py`'s `MCPProvider` ABC semantics.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::client::ClientDemux;
use crate::protocol::{
    Prompt, PromptResult, Resource, ResourceContent, Tool, methods,
};
use crate::transport::Transport;
use crate::{Error, Result};

/// Which concrete transport an adapter's `create_transport` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Spawned child process, piped stdio.
    Stdio,
    /// HTTP POST + Server-Sent-Events.
    Sse,
}

/// A provider *type*: static metadata plus a factory for its transport.
///
/// Adapter metadata that a source language might attach to a class becomes
/// a descriptor here instead (spec §9): plain methods returning plain
/// values, stored alongside the constructor in the registry.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Unique provider name; also the provider's URI scheme.
    fn name(&self) -> &str;
    /// Human-readable display name.
    fn display_name(&self) -> &str;
    /// Free-form category label (see DESIGN.md — not a fixed enum).
    fn category(&self) -> Option<&str> {
        None
    }
    /// Whether this adapter's authentication requires an OAuth flow
    /// (handled entirely outside the core; see SPEC_FULL.md §9).
    fn requires_oauth(&self) -> bool {
        false
    }
    /// Which transport kind `create_transport` returns.
    fn transport_kind(&self) -> TransportKind;
    /// The adapter's declared config schema, a JSON Schema object.
    fn config_schema(&self) -> Value {
        serde_json::json!({"type": "object"})
    }
    /// Build a fresh (unconnected) transport from a config fragment.
    fn create_transport(&self, config: &Value) -> Result<Arc<dyn Transport>>;

    /// True iff `config` parses under [`Self::config_schema`]. A minimal
    /// check (required top-level keys present, rough type match) rather
    /// than full JSON Schema validation — this gateway has no JSON Schema
    /// validator in its dependency stack and pulling one in for this alone
    /// would be out of proportion to what the op needs.
    fn validate_config(&self, config: &Value) -> bool {
        let schema = self.config_schema();
        let Some(required) = schema.get("required").and_then(Value::as_array) else {
            return true;
        };
        required
            .iter()
            .filter_map(Value::as_str)
            .all(|key| config.get(key).is_some())
    }
}

/// Lifecycle state of a [`ProviderInstance`] (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    /// Instantiated but `connect()` not yet called.
    Idle,
    /// `connect()` in progress.
    Connecting,
    /// Connected and usable.
    Connected,
    /// `disconnect()` completed.
    Disconnected,
    /// `connect()` failed.
    Failed,
}

/// A connected (or not-yet-connected) instance of a [`ProviderAdapter`].
pub struct ProviderInstance {
    adapter: Arc<dyn ProviderAdapter>,
    demux: RwLock<Option<Arc<ClientDemux>>>,
    state: RwLock<ProviderState>,
}

impl ProviderInstance {
    /// Instantiate from an adapter type and its config fragment. Does not
    /// connect; call [`Self::connect`].
    pub fn new(adapter: Arc<dyn ProviderAdapter>, config: &Value) -> Result<Self> {
        if !adapter.validate_config(config) {
            return Err(Error::Configuration(format!(
                "config for provider '{}' does not satisfy its declared schema",
                adapter.name()
            )));
        }
        Ok(Self {
            adapter,
            demux: RwLock::new(None),
            state: RwLock::new(ProviderState::Idle),
        })
    }

    /// Provider name (unique within a gateway).
    #[must_use]
    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.adapter.display_name()
    }

    /// Category label, if the adapter declared one.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.adapter.category()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ProviderState {
        *self.state.read()
    }

    /// True iff this instance is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ProviderState::Connected
    }

    /// Build the transport, wrap it in a [`ClientDemux`], and connect.
    pub async fn connect(&self, config: &Value) -> Result<()> {
        *self.state.write() = ProviderState::Connecting;
        let transport = self.adapter.create_transport(config)?;
        let demux = Arc::new(ClientDemux::new(transport));
        match demux.connect().await {
            Ok(()) => {
                *self.demux.write() = Some(demux);
                *self.state.write() = ProviderState::Connected;
                Ok(())
            }
            Err(e) => {
                *self.state.write() = ProviderState::Failed;
                Err(e)
            }
        }
    }

    /// Disconnect, releasing the transport. Idempotent.
    pub async fn disconnect(&self) -> Result<()> {
        let demux = self.demux.write().take();
        *self.state.write() = ProviderState::Disconnected;
        if let Some(demux) = demux {
            demux.close().await?;
        }
        Ok(())
    }

    fn demux(&self) -> Result<Arc<ClientDemux>> {
        self.demux
            .read()
            .clone()
            .ok_or_else(|| {
                Error::Internal(format!(
                    "programmer error: provider '{}' used before connect()",
                    self.adapter.name()
                ))
            })
    }

    /// `tools/list`.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let resp = self.demux()?.send_request(methods::TOOLS_LIST, None, None).await?;
        let result = response_result(resp)?;
        let parsed: crate::protocol::ToolsListResult = serde_json::from_value(result)?;
        Ok(parsed.tools)
    }

    /// `tools/call`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        let params = serde_json::json!({"name": name, "arguments": arguments});
        let resp = self
            .demux()?
            .send_request(methods::TOOLS_CALL, Some(params), None)
            .await?;
        response_result(resp)
    }

    /// `resources/list`.
    pub async fn list_resources(&self) -> Result<Vec<Resource>> {
        let resp = self
            .demux()?
            .send_request(methods::RESOURCES_LIST, None, None)
            .await?;
        let result = response_result(resp)?;
        let parsed: crate::protocol::ResourcesListResult = serde_json::from_value(result)?;
        Ok(parsed.resources)
    }

    /// `resources/read`.
    pub async fn read_resource(&self, uri: &str) -> Result<Vec<ResourceContent>> {
        let params = serde_json::json!({"uri": uri});
        let resp = self
            .demux()?
            .send_request(methods::RESOURCES_READ, Some(params), None)
            .await?;
        let result = response_result(resp)?;
        let parsed: crate::protocol::ResourcesReadResult = serde_json::from_value(result)?;
        Ok(parsed.contents)
    }

    /// `prompts/list`.
    pub async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        let resp = self
            .demux()?
            .send_request(methods::PROMPTS_LIST, None, None)
            .await?;
        let result = response_result(resp)?;
        let parsed: crate::protocol::PromptsListResult = serde_json::from_value(result)?;
        Ok(parsed.prompts)
    }

    /// `prompts/get`.
    pub async fn get_prompt(&self, name: &str, arguments: Value) -> Result<PromptResult> {
        let params = serde_json::json!({"name": name, "arguments": arguments});
        let resp = self
            .demux()?
            .send_request(methods::PROMPTS_GET, Some(params), None)
            .await?;
        let result = response_result(resp)?;
        Ok(serde_json::from_value(result)?)
    }

    /// True iff a `listResources` round-trip succeeds. Never raises (spec §4.4).
    pub async fn health_check(&self) -> bool {
        self.list_resources().await.is_ok()
    }
}

fn response_result(resp: crate::protocol::JsonRpcResponse) -> Result<Value> {
    if let Some(err) = resp.error {
        return Err(Error::Provider(err.message));
    }
    resp.result
        .ok_or_else(|| Error::Protocol("response has neither result nor error".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopAdapter;

    #[async_trait]
    impl ProviderAdapter for NoopAdapter {
        fn name(&self) -> &str {
            "noop"
        }
        fn display_name(&self) -> &str {
            "Noop"
        }
        fn transport_kind(&self) -> TransportKind {
            TransportKind::Stdio
        }
        fn create_transport(&self, _config: &Value) -> Result<Arc<dyn Transport>> {
            Ok(Arc::new(crate::transport::StdioTransport::new(
                vec!["cat".to_string()],
                None,
            )))
        }
    }

    #[tokio::test]
    async fn unconnected_provider_ops_are_programmer_errors() {
        let instance = ProviderInstance::new(Arc::new(NoopAdapter), &serde_json::json!({})).unwrap();
        let err = instance.list_tools().await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn validate_config_checks_required_keys() {
        struct RequiresEndpoint;
        #[async_trait]
        impl ProviderAdapter for RequiresEndpoint {
            fn name(&self) -> &str {
                "x"
            }
            fn display_name(&self) -> &str {
                "X"
            }
            fn transport_kind(&self) -> TransportKind {
                TransportKind::Sse
            }
            fn config_schema(&self) -> Value {
                serde_json::json!({"type":"object","required":["endpoint"]})
            }
            fn create_transport(&self, _config: &Value) -> Result<Arc<dyn Transport>> {
                unimplemented!()
            }
        }
        let adapter = RequiresEndpoint;
        assert!(!adapter.validate_config(&serde_json::json!({})));
        assert!(adapter.validate_config(&serde_json::json!({"endpoint": "https://x"})));
    }
}

//! End-to-end scenarios (spec §8) exercised against in-memory scripted
//! providers rather than real upstream MCP servers — covers aggregation,
//! collision namespacing, namespaced routing, resource URI prefixing, and
//! partial-failure startup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};

use mcp_gateway::protocol::{JsonRpcMessage, JsonRpcResponse, methods};
use mcp_gateway::provider::{ProviderAdapter, TransportKind};
use mcp_gateway::registry::Registry;
use mcp_gateway::router::{ResourceRouter, ToolRouter};
use mcp_gateway::supervisor::{ProviderConfig, Supervisor};
use mcp_gateway::transport::Transport;
use mcp_gateway::{Error, Result};

/// Answers `tools/list`/`resources/list`/`tools/call`/`resources/read` from
/// fixed fixtures, standing in for a real upstream MCP provider.
struct ScriptedTransport {
    tools: Vec<Value>,
    resources: Vec<Value>,
    outbound: Mutex<mpsc::UnboundedSender<JsonRpcMessage>>,
    outbound_rx: Mutex<Option<mpsc::UnboundedReceiver<JsonRpcMessage>>>,
    reply_rx: Mutex<Option<mpsc::UnboundedReceiver<JsonRpcMessage>>>,
    reply_tx: mpsc::UnboundedSender<JsonRpcMessage>,
}

impl ScriptedTransport {
    fn new(tools: Vec<Value>, resources: Vec<Value>) -> Arc<Self> {
        let (otx, orx) = mpsc::unbounded_channel();
        let (rtx, rrx) = mpsc::unbounded_channel();
        Arc::new(Self {
            tools,
            resources,
            outbound: Mutex::new(otx),
            outbound_rx: Mutex::new(Some(orx)),
            reply_rx: Mutex::new(Some(rrx)),
            reply_tx: rtx,
        })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&self) -> Result<()> {
        let mut orx = self.outbound_rx.lock().await.take().unwrap();
        let reply_tx = self.reply_tx.clone();
        let tools = self.tools.clone();
        let resources = self.resources.clone();
        tokio::spawn(async move {
            while let Some(msg) = orx.recv().await {
                let JsonRpcMessage::Request(req) = msg else {
                    continue;
                };
                let result = match req.method.as_str() {
                    methods::TOOLS_LIST => json!({"tools": tools}),
                    methods::RESOURCES_LIST => json!({"resources": resources}),
                    methods::TOOLS_CALL => {
                        let params = req.params.clone().unwrap_or_default();
                        json!({
                            "content": [{"type": "text", "text": "ok"}],
                            "echoed_name": params.get("name"),
                            "echoed_arguments": params.get("arguments"),
                        })
                    }
                    methods::RESOURCES_READ => {
                        let params = req.params.clone().unwrap_or_default();
                        json!({"contents": [{"uri": params.get("uri"), "text": "body"}]})
                    }
                    _ => json!({}),
                };
                let resp = JsonRpcResponse::success(req.id, result);
                let _ = reply_tx.send(JsonRpcMessage::Response(resp));
            }
        });
        Ok(())
    }

    async fn send(&self, msg: &JsonRpcMessage) -> Result<()> {
        self.outbound.lock().await.send(msg.clone()).ok();
        Ok(())
    }

    async fn recv(&self) -> Option<JsonRpcMessage> {
        let mut rx = self.reply_rx.lock().await;
        match rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A transport whose `connect()` always fails, for the partial-failure
/// startup scenario.
struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn connect(&self) -> Result<()> {
        Err(Error::Connection("fixture: deliberately unreachable".to_string()))
    }
    async fn send(&self, _msg: &JsonRpcMessage) -> Result<()> {
        Ok(())
    }
    async fn recv(&self) -> Option<JsonRpcMessage> {
        None
    }
    fn is_connected(&self) -> bool {
        false
    }
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct FixtureAdapter {
    name: &'static str,
    tools: Vec<Value>,
    resources: Vec<Value>,
    fail: bool,
}

#[async_trait]
impl ProviderAdapter for FixtureAdapter {
    fn name(&self) -> &str {
        self.name
    }
    fn display_name(&self) -> &str {
        self.name
    }
    fn transport_kind(&self) -> TransportKind {
        TransportKind::Stdio
    }
    fn create_transport(&self, _config: &Value) -> Result<Arc<dyn Transport>> {
        if self.fail {
            Ok(Arc::new(FailingTransport))
        } else {
            Ok(ScriptedTransport::new(self.tools.clone(), self.resources.clone()))
        }
    }
}

fn tool(name: &str) -> Value {
    json!({"name": name, "inputSchema": {"type": "object"}})
}

fn resource(uri: &str) -> Value {
    json!({"uri": uri, "name": uri, "resourceType": "text"})
}

async fn start_with(fixtures: Vec<FixtureAdapter>) -> Arc<Supervisor> {
    let registry = Arc::new(Registry::new());
    let mut configs = Vec::new();
    for fixture in fixtures {
        let provider_name = fixture.name.to_string();
        registry.register(Arc::new(fixture)).unwrap();
        configs.push((
            provider_name.clone(),
            ProviderConfig {
                adapter_name: provider_name,
                config: json!({}),
            },
        ));
    }
    let supervisor = Arc::new(Supervisor::new(registry));
    supervisor.start(&configs).await.unwrap();
    supervisor
}

#[tokio::test]
async fn non_colliding_aggregation_yields_three_unnamespaced_tools() {
    let supervisor = start_with(vec![
        FixtureAdapter {
            name: "p1",
            tools: vec![tool("tool_a"), tool("tool_b")],
            resources: vec![],
            fail: false,
        },
        FixtureAdapter {
            name: "p2",
            tools: vec![tool("tool_c")],
            resources: vec![],
            fail: false,
        },
    ])
    .await;

    let catalog = supervisor.catalog().unwrap();
    let mut names: Vec<&str> = catalog.tools().iter().map(|t| t.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["tool_a", "tool_b", "tool_c"]);
    assert!(catalog.conflicting_tools().is_empty());
    assert!(catalog.tools().iter().all(|t| t.namespace_reason.is_none()));
}

#[tokio::test]
async fn colliding_tool_names_are_namespaced_and_flagged_ambiguous() {
    let supervisor = start_with(vec![
        FixtureAdapter {
            name: "p1",
            tools: vec![tool("search"), tool("unique_p1")],
            resources: vec![],
            fail: false,
        },
        FixtureAdapter {
            name: "p2",
            tools: vec![tool("search"), tool("unique_p2")],
            resources: vec![],
            fail: false,
        },
    ])
    .await;

    let catalog = supervisor.catalog().unwrap();
    let mut names: Vec<&str> = catalog.tools().iter().map(|t| t.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["p1:search", "p2:search", "unique_p1", "unique_p2"]);
    assert!(catalog.conflicting_tools().contains("search"));

    let err = catalog.get_provider_for_tool("search").unwrap_err();
    assert!(matches!(err, Error::AmbiguousTool(_)));
    assert_eq!(catalog.get_provider_for_tool("unique_p1").unwrap(), "p1");
}

#[tokio::test]
async fn namespaced_route_invokes_only_the_owning_provider() {
    let supervisor = start_with(vec![
        FixtureAdapter {
            name: "p1",
            tools: vec![tool("search"), tool("unique_p1")],
            resources: vec![],
            fail: false,
        },
        FixtureAdapter {
            name: "p2",
            tools: vec![tool("search"), tool("unique_p2")],
            resources: vec![],
            fail: false,
        },
    ])
    .await;

    let catalog = supervisor.catalog().unwrap();
    let providers = supervisor.providers();
    let router = ToolRouter::new(&providers, &catalog);
    let result = router
        .route_tool_call("p1:search", json!({"q": "x"}))
        .await
        .unwrap();
    assert_eq!(result["echoed_name"], "search");
    assert_eq!(result["echoed_arguments"]["q"], "x");
}

#[tokio::test]
async fn resource_uris_are_provider_prefixed_and_route_back_to_the_bare_uri() {
    let supervisor = start_with(vec![FixtureAdapter {
        name: "p1",
        tools: vec![],
        resources: vec![resource("PROJ-123")],
        fail: false,
    }])
    .await;

    let catalog = supervisor.catalog().unwrap();
    let uris: Vec<&str> = catalog.resources().iter().map(|r| r.uri.as_str()).collect();
    assert_eq!(uris, vec!["p1://PROJ-123"]);

    let providers = supervisor.providers();
    let router = ResourceRouter::new(&providers, &catalog);
    let contents = router.route_resource_read("p1://PROJ-123").await.unwrap();
    assert_eq!(contents[0].uri, "PROJ-123");
}

#[tokio::test]
async fn startup_succeeds_with_only_the_reachable_provider_connected() {
    let supervisor = start_with(vec![
        FixtureAdapter {
            name: "p1",
            tools: vec![tool("tool_a")],
            resources: vec![],
            fail: false,
        },
        FixtureAdapter {
            name: "p2",
            tools: vec![],
            resources: vec![],
            fail: true,
        },
    ])
    .await;

    let providers = supervisor.providers();
    assert_eq!(providers.len(), 1);
    assert!(providers.contains_key("p1"));
}

#[tokio::test]
async fn startup_fails_when_every_configured_provider_is_unreachable() {
    let registry = Arc::new(Registry::new());
    let fixture = FixtureAdapter {
        name: "p1",
        tools: vec![],
        resources: vec![],
        fail: true,
    };
    registry.register(Arc::new(fixture)).unwrap();
    let supervisor = Supervisor::new(registry);
    let configs = vec![(
        "p1".to_string(),
        ProviderConfig {
            adapter_name: "p1".to_string(),
            config: json!({}),
        },
    )];
    let err = supervisor.start(&configs).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

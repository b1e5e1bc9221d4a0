//! MCP JSON-RPC message types
//!
//! The three JSON-RPC 2.0 shapes (request, notification, response) plus the
//! params/result payloads for the handful of methods this gateway speaks
//! (`initialize`, `tools/*`, `resources/*`, `prompts/*`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ClientCapabilities, Implementation, Prompt, PromptResult, Resource, ResourceContent, ServerCapabilities, Tool};

/// JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version, always `"2.0"`.
    pub jsonrpc: String,
    /// Request id.
    pub id: RequestId,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a request with the given id, method and params.
    #[must_use]
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC notification (no id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version, always `"2.0"`.
    pub jsonrpc: String,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC response. Exactly one of `result`/`error` is present (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version, always `"2.0"`.
    pub jsonrpc: String,
    /// Request id this responds to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Result, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Build a success response.
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response with no `error.data`.
    pub fn error(id: Option<RequestId>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Build an error response carrying structured `error.data`.
    pub fn error_with_data(
        id: Option<RequestId>,
        code: i32,
        message: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: Some(data),
            }),
        }
    }

    /// True iff this is a well-formed response: exactly one of
    /// `result`/`error` present.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.result.is_some() ^ self.error.is_some()
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
    /// Optional structured error data (`data.type` carries the error kind).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Request id: a string or an integer (spec §3). Ids this gateway
/// *generates* are always the string form `req-<counter>-<8 hex>`
/// (see `client::generate_request_id`); ids *received* on the wire may be
/// either shape and are echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// String id.
    String(String),
    /// Numeric id.
    Number(i64),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Any one of the three JSON-RPC shapes, as decoded from one line of input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Request.
    Request(JsonRpcRequest),
    /// Notification.
    Notification(JsonRpcNotification),
    /// Response.
    Response(JsonRpcResponse),
}

impl JsonRpcMessage {
    /// True iff this is a request.
    #[must_use]
    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    /// True iff this is a notification.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        matches!(self, Self::Notification(_))
    }

    /// True iff this is a response.
    #[must_use]
    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response(_))
    }

    /// The method name, for requests and notifications.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Request(r) => Some(&r.method),
            Self::Notification(n) => Some(&n.method),
            Self::Response(_) => None,
        }
    }

    /// The id carried by a request or response. Notifications have none.
    #[must_use]
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Request(r) => Some(&r.id),
            Self::Notification(_) => None,
            Self::Response(r) => r.id.as_ref(),
        }
    }
}

/// Verbatim JSON-RPC method name strings this gateway speaks (spec §6).
pub mod methods {
    /// `initialize`
    pub const INITIALIZE: &str = "initialize";
    /// `tools/list`
    pub const TOOLS_LIST: &str = "tools/list";
    /// `tools/call`
    pub const TOOLS_CALL: &str = "tools/call";
    /// `resources/list`
    pub const RESOURCES_LIST: &str = "resources/list";
    /// `resources/read`
    pub const RESOURCES_READ: &str = "resources/read";
    /// `prompts/list`
    pub const PROMPTS_LIST: &str = "prompts/list";
    /// `prompts/get`
    pub const PROMPTS_GET: &str = "prompts/get";
    /// `notifications/progress`
    pub const NOTIFICATIONS_PROGRESS: &str = "notifications/progress";
    /// `notifications/cancelled`
    pub const NOTIFICATIONS_CANCELLED: &str = "notifications/cancelled";
}

/// `initialize` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeParams {
    /// Protocol version the client speaks.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: ClientCapabilities,
    /// Client identity.
    #[serde(rename = "clientInfo")]
    pub client_info: Implementation,
}

/// `initialize` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    /// Protocol version the gateway speaks.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Gateway capabilities.
    pub capabilities: ServerCapabilities,
    /// Gateway identity.
    #[serde(rename = "serverInfo")]
    pub server_info: Implementation,
}

/// `tools/list` result: the aggregated tool catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsListResult {
    /// All published tools.
    pub tools: Vec<Tool>,
}

/// `tools/call` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCallParams {
    /// Tool name, possibly namespaced as `<provider>:<name>`.
    pub name: String,
    /// Tool arguments, passed through unchanged.
    #[serde(default)]
    pub arguments: Value,
}

/// `resources/list` result: the aggregated resource catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesListResult {
    /// All published resources.
    pub resources: Vec<Resource>,
}

/// `resources/read` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesReadParams {
    /// Provider-prefixed resource URI.
    pub uri: String,
}

/// `resources/read` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesReadResult {
    /// Contents, one entry for the read resource (MCP allows more for
    /// composite resources; this gateway never produces more than one).
    pub contents: Vec<ResourceContent>,
}

/// `prompts/list` result: the aggregated prompt catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsListResult {
    /// All published prompts.
    pub prompts: Vec<Prompt>,
}

/// `prompts/get` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsGetParams {
    /// Prompt name.
    pub name: String,
    /// Prompt arguments.
    #[serde(default)]
    pub arguments: Value,
}

pub use PromptResult as PromptsGetResult;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_round_trips_string_and_number() {
        let s: RequestId = serde_json::from_str(r#""req-1-abcd1234""#).unwrap();
        assert_eq!(s, RequestId::String("req-1-abcd1234".to_string()));
        let n: RequestId = serde_json::from_str("42").unwrap();
        assert_eq!(n, RequestId::Number(42));
    }

    #[test]
    fn response_error_carries_structured_data() {
        let resp = JsonRpcResponse::error_with_data(
            Some(RequestId::Number(1)),
            -32000,
            "ambiguous",
            serde_json::json!({"type": "ambiguous_tool"}),
        );
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["error"]["data"]["type"], "ambiguous_tool");
        assert!(v.get("result").is_none());
    }

    #[test]
    fn success_response_omits_error() {
        let resp = JsonRpcResponse::success(RequestId::Number(1), serde_json::json!({"ok": true}));
        assert!(resp.is_well_formed());
        let v = serde_json::to_value(&resp).unwrap();
        assert!(v.get("error").is_none());
    }

    #[test]
    fn message_untagged_enum_discriminates_by_shape() {
        let req: JsonRpcMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).unwrap();
        assert!(req.is_request());
        assert_eq!(req.method(), Some("tools/list"));

        let notif: JsonRpcMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/progress"}"#)
                .unwrap();
        assert!(notif.is_notification());

        let resp: JsonRpcMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#).unwrap();
        assert!(resp.is_response());
    }
}

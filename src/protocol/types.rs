//! MCP Protocol type definitions
//!
//! Trimmed to the shapes the gateway actually needs: tool/resource/prompt
//! catalog entries, the content returned from a read/call, and the
//! capability objects exchanged at `initialize`. Sampling, elicitation,
//! tasks and roots live on the upstream MCP spec but have no role in a
//! gateway that only aggregates and routes, so they are not modeled here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition, as published in the aggregated catalog.
///
/// `provider`, `category` and `namespace_reason` are gateway-injected
/// metadata (spec §3) layered onto whatever the upstream provider returned;
/// an MCP client that doesn't know about them just sees extra JSON members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Published tool name — may be namespaced as `<provider>:<name>`.
    pub name: String,
    /// Tool description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Input JSON Schema, carried verbatim from the provider.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// Name of the provider that published this tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Provider category, a free-form label (see DESIGN.md).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Set to `Some("conflict")` iff this tool's natural name collided with
    /// another connected provider's tool.
    #[serde(rename = "namespaceReason", skip_serializing_if = "Option::is_none")]
    pub namespace_reason: Option<String>,
}

/// The kind of content a resource holds, used for client-side rendering hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Plain text content.
    Text,
    /// Opaque binary content (base64-encoded on the wire).
    Binary,
    /// Image content.
    Image,
}

/// Resource definition, as published in the aggregated catalog.
///
/// Inside the gateway a resource's URI is always provider-prefixed as
/// `<provider>://<originalUri>` (spec §3); `resource_type` has no analog in
/// the teacher's `Resource` and is carried over from the reference
/// implementation it was distilled from (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Provider-prefixed URI, `<provider>://<rest>`.
    pub uri: String,
    /// Resource name.
    pub name: String,
    /// Resource description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type.
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// What kind of content this resource holds.
    #[serde(rename = "resourceType")]
    pub resource_type: ResourceType,
}

/// The body returned by a `resources/read` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContent {
    /// URI this content was read from (provider-prefixed).
    pub uri: String,
    /// MIME type.
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Text content, present iff the resource is textual.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64-encoded binary content, present iff the resource is not textual.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}

/// A single declared parameter of a prompt template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptParameter {
    /// Parameter name.
    pub name: String,
    /// Parameter description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the caller must supply this parameter.
    #[serde(default)]
    pub required: bool,
}

/// Prompt template definition.
///
/// The parameter list field is named `parameters`, matching the reference
/// implementation this crate's prompt support was distilled from, not the
/// `arguments` field name the MCP spec itself uses (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    /// Prompt name.
    pub name: String,
    /// Prompt description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<PromptParameter>,
}

/// Role of a message within a rendered prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A message from the end user.
    User,
    /// A message from the assistant.
    Assistant,
    /// A system-level instruction.
    System,
}

/// One message in a rendered prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Speaker role.
    pub role: Role,
    /// Message content, carried as plain text.
    pub content: String,
}

/// The body returned by a `prompts/get` call.
///
/// Unimplemented in this gateway (spec §4.8) — the type exists so the
/// handler's declared-but-unreachable return type is meaningful and so a
/// future provider-level implementation has somewhere to land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResult {
    /// Rendered messages.
    pub messages: Vec<PromptMessage>,
    /// Optional description of the rendered result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Client/server identity exchanged at `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    /// Name.
    pub name: String,
    /// Version.
    pub version: String,
}

/// Resources capability, advertised by a server that supports resource ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcesCapability {
    /// Whether subscribing to resource updates is supported. Always false here.
    #[serde(default)]
    pub subscribe: bool,
    /// Whether a `listChanged` notification is emitted. Always false here.
    #[serde(rename = "listChanged", default)]
    pub list_changed: bool,
}

/// Tools capability, advertised by a server that supports tool ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsCapability {
    /// Whether a `listChanged` notification is emitted. Always false here.
    #[serde(rename = "listChanged", default)]
    pub list_changed: bool,
}

/// Prompts capability, advertised by a server that supports prompt ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptsCapability {
    /// Whether a `listChanged` notification is emitted. Always false here.
    #[serde(rename = "listChanged", default)]
    pub list_changed: bool,
}

/// Capabilities the gateway reports at `initialize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Resource operations are supported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
    /// Tool operations are supported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
    /// Prompt operations are *declared* (see spec §4.8 — `prompts/get` is a stub).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsCapability>,
}

/// Roots capability, as advertised by a connecting client. Accepted but unused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootsCapability {
    /// Whether a `listChanged` notification is emitted.
    #[serde(rename = "listChanged", default)]
    pub list_changed: bool,
}

/// Capabilities a connecting client reports. The gateway reads this but does
/// not branch on it; no MCP client capability changes routing behavior here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientCapabilities {
    /// Filesystem roots capability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roots: Option<RootsCapability>,
}

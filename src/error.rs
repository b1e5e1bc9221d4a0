//! Error types for the MCP gateway
//!
//! One enum covers every kind in spec §7's error taxonomy plus the handful
//! of infrastructure variants (`Io`, `Json`, `Http`) inherited unmodified
//! from the teacher. `to_rpc_code`/`error_kind` are the mapping the gateway
//! server (C8) uses to build `error.code`/`error.data.type` on the wire.

use std::io;

use thiserror::Error;

/// Result type alias for the gateway.
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Adapter/config mismatch. Fatal at startup for that provider (spec §7).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The named provider is not registered/connected.
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// The routed-to provider is registered but not currently connected.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Transport could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// I/O failed mid-session on an established transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A send exceeded its deadline.
    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Malformed response, or a required field is missing.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// OAuth flow / token exchange failed. Surfaced to the wizard only; the
    /// core never raises this itself (see SPEC_FULL.md §7).
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Upstream provider returned a JSON-RPC error.
    #[error("Provider error: {0}")]
    Provider(String),

    /// A tool name mapped to more than one connected provider.
    #[error("Tool name '{0}' is ambiguous across multiple providers")]
    AmbiguousTool(String),

    /// A tool name mapped to no connected provider.
    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    /// Caller passed a namespaced name whose prefix doesn't own the tool.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A requested operation is not implemented (spec §4.8, `prompts/get`).
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Raw JSON-RPC error received from a provider, preserved verbatim.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc {
        /// Error code.
        code: i32,
        /// Error message.
        message: String,
        /// Optional structured data.
        data: Option<serde_json::Value>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error (SSE transport).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway is shutting down.
    #[error("Gateway shutdown")]
    Shutdown,

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a raw JSON-RPC error.
    pub fn json_rpc(code: i32, message: impl Into<String>) -> Self {
        Self::JsonRpc {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Map to the JSON-RPC error code this should be reported with (spec §7).
    #[must_use]
    pub fn to_rpc_code(&self) -> i32 {
        match self {
            Self::JsonRpc { code, .. } => *code,
            Self::Json(_) => rpc_codes::PARSE_ERROR,
            Self::Protocol(_) | Self::Validation(_) => rpc_codes::INVALID_REQUEST,
            Self::NotImplemented(_) => rpc_codes::METHOD_NOT_FOUND,
            Self::ProviderNotFound(_)
            | Self::ProviderUnavailable(_)
            | Self::Connection(_)
            | Self::Transport(_)
            | Self::Timeout(_)
            | Self::Provider(_)
            | Self::AmbiguousTool(_)
            | Self::ToolNotFound(_) => rpc_codes::SERVER_ERROR_START,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }

    /// The `error.data.type` string used for handler-reported domain errors
    /// (spec §7's rightmost column). Infrastructure errors that never reach
    /// the wire directly (`Io`, `Json`, `Http`, `Shutdown`, `Internal`)
    /// return `None`.
    #[must_use]
    pub fn error_kind(&self) -> Option<&'static str> {
        Some(match self {
            Self::Connection(_) => "connection_error",
            Self::Transport(_) => "transport_error",
            Self::Timeout(_) => "timeout_error",
            Self::Protocol(_) => "protocol_error",
            Self::Authentication(_) => "authentication_error",
            Self::Provider(_) => "provider_error",
            Self::Configuration(_) => "configuration_error",
            Self::AmbiguousTool(_) => "ambiguous_tool",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::ProviderUnavailable(_) | Self::ProviderNotFound(_) => "provider_unavailable",
            Self::Validation(_) => "validation_error",
            Self::NotImplemented(_) => "not_implemented",
            _ => return None,
        })
    }
}

/// Standard JSON-RPC 2.0 error codes.
pub mod rpc_codes {
    /// Parse error — invalid JSON.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request — not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error.
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Server error range start (handler-reported domain errors land here).
    pub const SERVER_ERROR_START: i32 = -32000;
    /// Server error range end.
    pub const SERVER_ERROR_END: i32 = -32099;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_tool_maps_to_server_error_range_with_kind() {
        let e = Error::AmbiguousTool("search".to_string());
        assert_eq!(e.to_rpc_code(), rpc_codes::SERVER_ERROR_START);
        assert_eq!(e.error_kind(), Some("ambiguous_tool"));
    }

    #[test]
    fn parse_error_maps_to_dash_32700() {
        let e: Error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err().into();
        assert_eq!(e.to_rpc_code(), rpc_codes::PARSE_ERROR);
    }

    #[test]
    fn internal_error_has_no_error_kind() {
        assert_eq!(Error::Internal("x".into()).error_kind(), None);
    }
}

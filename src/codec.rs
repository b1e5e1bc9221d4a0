//! Frame codec (C1): newline-delimited JSON-RPC framing.
//!
//! One JSON object per line, UTF-8, terminated by `\n`. Empty lines are
//! skipped. This module only knows how to turn a line of text into a
//! generic [`JsonRpcMessage`] and back — it never interprets payloads
//! beyond that (spec §4.1).

use serde_json::Value;

use crate::protocol::JsonRpcMessage;
use crate::{Error, Result};

/// Decode one line of input into a JSON-RPC message.
///
/// Returns `Ok(None)` for a blank line (skipped, not an error). A non-blank
/// line that isn't valid JSON-RPC yields `Err(Error::Json(..))`; callers
/// decide whether that's a parse-error response (server side) or a
/// log-and-discard (client side) per spec §4.1.
pub fn decode_line(line: &str) -> Result<Option<JsonRpcMessage>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let msg: JsonRpcMessage = serde_json::from_str(trimmed)?;
    Ok(Some(msg))
}

/// Encode a JSON-RPC message as a single `\n`-terminated line.
pub fn encode_line<T: serde::Serialize>(msg: &T) -> Result<String> {
    let mut s = serde_json::to_string(msg)?;
    s.push('\n');
    Ok(s)
}

/// Decode a raw JSON value from a line, for callers that want to inspect
/// the shape before committing to a typed [`JsonRpcMessage`] (used by the
/// gateway server to attach `id: "unknown"` on parse failure, spec §4.8).
pub fn decode_raw(line: &str) -> Result<Option<Value>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed).map_err(|e| {
        Error::json_rpc(crate::error::rpc_codes::PARSE_ERROR, e.to_string())
    })?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_skipped_not_an_error() {
        assert!(decode_line("").unwrap().is_none());
        assert!(decode_line("   \n").unwrap().is_none());
    }

    #[test]
    fn decodes_a_request_line() {
        let msg = decode_line(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .unwrap()
            .unwrap();
        assert!(msg.is_request());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(decode_line("{not json").is_err());
    }

    #[test]
    fn encode_terminates_with_single_newline() {
        let line = encode_line(&serde_json::json!({"a": 1})).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
    }
}

//! Transport (C2): owns a duplex byte channel, carries framed messages.
//!
//! A transport knows nothing about request/reply correlation — that is
//! [`crate::client::ClientDemux`]'s job (C3). A transport only frames
//! messages onto, and off of, whatever duplex channel it owns (a child
//! process's stdio, or an HTTP+SSE pair). This split mirrors the two
//! distinct components spec §2 lists and `original_source`'s separate
//! `transport/*.py` vs `client.py` modules; see DESIGN.md.

mod sse;
mod stdio;

pub use self::sse::SseTransport;
pub use self::stdio::StdioTransport;

use async_trait::async_trait;

use crate::Result;
use crate::protocol::JsonRpcMessage;

/// A duplex, message-framed channel to one upstream MCP provider.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Acquire the underlying resource (spawn the child process / validate
    /// the HTTP endpoint) and start the background reader task. Fails with
    /// [`crate::Error::Connection`] if the resource cannot be acquired.
    async fn connect(&self) -> Result<()>;

    /// Write one framed message. Concurrent callers are serialized by the
    /// implementation so lines are never interleaved.
    async fn send(&self, msg: &JsonRpcMessage) -> Result<()>;

    /// Receive the next incoming framed message, or `None` once the
    /// channel is closed/EOF. Safe to call from a single consumer task only.
    async fn recv(&self) -> Option<JsonRpcMessage>;

    /// True iff `connect()` has succeeded and `close()` has not yet run.
    fn is_connected(&self) -> bool;

    /// Idempotent; releases all OS resources on every exit path.
    async fn close(&self) -> Result<()>;
}

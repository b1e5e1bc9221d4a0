//! MCP Gateway Library
//!
//! Aggregates multiple Model Context Protocol (MCP) providers behind a
//! single stdio MCP server. A connecting AI assistant sees one merged
//! catalog of tools, resources, and prompts; the gateway transparently
//! routes each call to the provider that actually owns it, resolving name
//! collisions by namespacing (`provider:tool`).
//!
//! # Protocol Version
//!
//! Implements MCP protocol version 2024-11-05.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod cli;
pub mod client;
pub mod codec;
pub mod conflict;
pub mod config;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod provider;
pub mod registry;
pub mod router;
pub mod supervisor;
pub mod transport;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// MCP protocol version this gateway speaks to providers and clients.
pub const MCP_PROTOCOL_VERSION: &str = protocol::PROTOCOL_VERSION;

/// Install the global `tracing` subscriber.
///
/// `level` is either a bare level (`info`) or a full `tracing` filter
/// directive; `format` selects `json` for structured output, anything else
/// (including `None`) for human-readable text.
///
/// # Errors
///
/// This never currently fails; it returns `Result` so a future subscriber
/// backend that can fail doesn't need a signature change.
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // Standard output carries JSON-RPC exclusively (spec §4.8); every log
    // line goes to stderr so it never interleaves with a response frame.
    match format {
        Some("json") => {
            subscriber
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

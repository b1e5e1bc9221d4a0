//! SSE transport: HTTP POST for requests, a GET event-stream for replies.
//!
//! Two URLs are derived from one endpoint: `POST <endpoint with
//! /sse→/message>` for requests, `GET <endpoint>` streams replies as
//! `text/event-stream`. A health-check (`GET <endpoint with /sse→/health>`)
//! runs once at connect; any status `>= 400` fails connect (spec §4.2).

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{Mutex, mpsc};

use super::Transport;
use crate::protocol::JsonRpcMessage;
use crate::{Error, Result};

fn derive_url(endpoint: &str, from: &str, to: &str) -> String {
    if let Some(idx) = endpoint.rfind(from) {
        let mut out = endpoint.to_string();
        out.replace_range(idx..idx + from.len(), to);
        out
    } else {
        endpoint.to_string()
    }
}

/// Transport over an HTTP `POST` + Server-Sent-Events pair.
pub struct SseTransport {
    endpoint: String,
    client: reqwest::Client,
    incoming: Mutex<Option<mpsc::UnboundedReceiver<JsonRpcMessage>>>,
    connected: AtomicBool,
}

impl SseTransport {
    /// Build a transport for the given SSE endpoint, e.g. `https://host/sse`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
            incoming: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    fn message_url(&self) -> String {
        derive_url(&self.endpoint, "/sse", "/message")
    }

    fn health_url(&self) -> String {
        derive_url(&self.endpoint, "/sse", "/health")
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn connect(&self) -> Result<()> {
        let health_resp = self
            .client
            .get(self.health_url())
            .send()
            .await
            .map_err(|e| Error::Connection(format!("health check failed: {e}")))?;
        if health_resp.status().as_u16() >= 400 {
            return Err(Error::Connection(format!(
                "health check returned {}",
                health_resp.status()
            )));
        }

        let stream_resp = self
            .client
            .get(&self.endpoint)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| Error::Connection(format!("failed to open event stream: {e}")))?;
        if !stream_resp.status().is_success() {
            return Err(Error::Connection(format!(
                "event stream returned {}",
                stream_resp.status()
            )));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut byte_stream = stream_resp.bytes_stream();
            let mut buf = String::new();
            while let Some(chunk) = byte_stream.next().await {
                let Ok(chunk) = chunk else { break };
                buf.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(idx) = buf.find('\n') {
                    let line = buf[..idx].to_string();
                    buf.drain(..=idx);
                    let Some(data) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let data = data.trim();
                    if data.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<JsonRpcMessage>(data) {
                        Ok(msg) => {
                            if tx.send(msg).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "discarding malformed SSE event");
                        }
                    }
                }
            }
        });

        *self.incoming.lock().await = Some(rx);
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, msg: &JsonRpcMessage) -> Result<()> {
        let resp = self
            .client
            .post(self.message_url())
            .json(msg)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Transport(format!(
                "POST {} returned {}",
                self.message_url(),
                resp.status()
            )));
        }
        Ok(())
    }

    async fn recv(&self) -> Option<JsonRpcMessage> {
        let mut guard = self.incoming.lock().await;
        match guard.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        *self.incoming.lock().await = None;
        Ok(())
    }
}

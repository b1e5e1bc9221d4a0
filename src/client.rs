//! Client demux (C3): issues correlated requests over a [`Transport`],
//! awaits replies by id.
//!
//! Generalizes the dashmap-pending-table idiom the teacher uses inline in
//! each transport (`backend/mod.rs`) into a standalone layer that wraps
//! *any* [`Transport`], per spec §2's C2/C3 split (see DESIGN.md).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

use crate::protocol::{JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::transport::Transport;
use crate::{Error, Result};

/// Default per-request timeout (spec §4.3, §5): 60 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

type Pending = Arc<DashMap<String, oneshot::Sender<JsonRpcResponse>>>;

/// Removes a pending-table entry on drop, so that cancelling the future
/// awaiting a reply (e.g. via `tokio::time::timeout` firing, or the caller
/// dropping the call outright) always removes the entry *before* the
/// waiter can be observed as completed — spec §4.3 step 5, §5 Cancellation.
struct PendingGuard {
    pending: Pending,
    id: String,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.remove(&self.id);
    }
}

/// Generates ids of the form `req-<counter>-<8 hex>`, matching the
/// reference implementation's `_generate_request_id` (see DESIGN.md).
fn generate_request_id(counter: &AtomicU64) -> String {
    let n = counter.fetch_add(1, Ordering::Relaxed);
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("req-{n}-{}", &suffix[..8])
}

/// Issues correlated JSON-RPC requests over a transport and demultiplexes
/// replies back to the awaiting caller by id.
pub struct ClientDemux {
    transport: Arc<dyn Transport>,
    pending: Pending,
    write_lock: Mutex<()>,
    counter: AtomicU64,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl ClientDemux {
    /// Wrap a transport. Does not connect; call [`Self::connect`] first.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            pending: Arc::new(DashMap::new()),
            write_lock: Mutex::new(()),
            counter: AtomicU64::new(0),
            reader: Mutex::new(None),
        }
    }

    /// Connect the underlying transport and start the reader task.
    pub async fn connect(&self) -> Result<()> {
        self.transport.connect().await?;
        let transport = Arc::clone(&self.transport);
        let pending = Arc::clone(&self.pending);
        let handle = tokio::spawn(async move {
            while let Some(msg) = transport.recv().await {
                match msg {
                    JsonRpcMessage::Response(resp) => {
                        let Some(id) = resp.id.clone() else {
                            tracing::warn!("dropping response with no id");
                            continue;
                        };
                        if let Some((_, waiter)) = pending.remove(&id.to_string()) {
                            if resp.is_well_formed() {
                                let _ = waiter.send(resp);
                            } else {
                                let _ = waiter.send(JsonRpcResponse::error(
                                    Some(id),
                                    crate::error::rpc_codes::INTERNAL_ERROR,
                                    "malformed response: neither result nor error present",
                                ));
                            }
                        }
                        // No pending entry (already timed out / cancelled,
                        // or an unsolicited reply): silently dropped.
                    }
                    JsonRpcMessage::Notification(_) | JsonRpcMessage::Request(_) => {
                        // Notification delivery is out of scope for this
                        // demux (spec §4.3); inbound requests from a
                        // provider we are a client of are not meaningful.
                    }
                }
            }
        });
        *self.reader.lock().await = Some(handle);
        Ok(())
    }

    /// Send `method`/`params` and wait for the correlated reply, or
    /// [`Error::Timeout`] after `timeout` (default [`DEFAULT_TIMEOUT`]).
    pub async fn send_request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<JsonRpcResponse> {
        let id_str = generate_request_id(&self.counter);
        let id = RequestId::String(id_str.clone());

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id_str.clone(), tx);
        let _guard = PendingGuard {
            pending: Arc::clone(&self.pending),
            id: id_str.clone(),
        };

        let request = JsonRpcRequest::new(id, method, params);
        {
            // Outbound writes are strictly serialized (spec §5 guarantee 1):
            // the wire order matches caller-invocation order once this lock
            // is held.
            let _write_guard = self.write_lock.lock().await;
            self.transport.send(&JsonRpcMessage::Request(request)).await?;
        }

        let deadline = timeout.unwrap_or(DEFAULT_TIMEOUT);
        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(resp)) => Ok(resp),
            Ok(Err(_)) => Err(Error::Transport(
                "pending waiter dropped without a reply".to_string(),
            )),
            Err(_) => Err(Error::Timeout(deadline)),
        }
        // `_guard` drops here, removing the pending entry if the reader
        // task hasn't already done so (timeout path).
    }

    /// Number of entries currently awaiting a reply. Test/diagnostic only.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Tear down the reader task and close the transport.
    pub async fn close(&self) -> Result<()> {
        if let Some(handle) = self.reader.lock().await.take() {
            handle.abort();
        }
        self.transport.close().await
    }
}

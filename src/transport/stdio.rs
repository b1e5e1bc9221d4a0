//! Stdio transport: a child process, piped.
//!
//! Spawns a child with an argv vector and optional working directory;
//! pipes stdin/stdout/stderr. Outbound writes are serialized under a
//! single mutex so lines are never interleaved. A dedicated reader task
//! consumes stdout line-by-line and decodes frames onto an internal
//! channel; stderr is drained to `tracing` for diagnostics (spec §4.2).

use std::process::Stdio as StdStdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{Mutex, mpsc};

use super::Transport;
use crate::codec;
use crate::protocol::JsonRpcMessage;
use crate::{Error, Result};

const GRACEFUL_SHUTDOWN_DEADLINE: Duration = Duration::from_secs(3);
const FORCE_KILL_DEADLINE: Duration = Duration::from_secs(2);

/// Transport over a spawned child process's stdio.
pub struct StdioTransport {
    command: Vec<String>,
    cwd: Option<String>,
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    incoming: Mutex<Option<mpsc::UnboundedReceiver<JsonRpcMessage>>>,
    connected: AtomicBool,
}

impl StdioTransport {
    /// Build a transport that will spawn `command` (argv[0] is the program,
    /// the rest are arguments) with an optional working directory.
    #[must_use]
    pub fn new(command: Vec<String>, cwd: Option<String>) -> Self {
        Self {
            command,
            cwd,
            child: Mutex::new(None),
            stdin: Mutex::new(None),
            incoming: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn connect(&self) -> Result<()> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(Error::Connection("empty command".to_string()));
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(StdStdio::piped())
            .stdout(StdStdio::piped())
            .stderr(StdStdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Connection(format!("failed to spawn {program}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Connection("child has no stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Connection("child has no stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Connection("child has no stderr".to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match codec::decode_line(&line) {
                        Ok(Some(msg)) => {
                            if tx.send(msg).is_err() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "discarding malformed frame from provider stdout");
                        }
                    },
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "error reading provider stdout");
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "provider_stderr", "{line}");
            }
        });

        *self.child.lock().await = Some(child);
        *self.stdin.lock().await = Some(stdin);
        *self.incoming.lock().await = Some(rx);
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, msg: &JsonRpcMessage) -> Result<()> {
        let line = codec::encode_line(msg)?;
        let mut guard = self.stdin.lock().await;
        let stdin = guard
            .as_mut()
            .ok_or_else(|| Error::Transport("not connected".to_string()))?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        stdin
            .flush()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
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

        // Drop stdin first: a well-behaved MCP stdio server exits on EOF.
        *self.stdin.lock().await = None;

        let mut guard = self.child.lock().await;
        let Some(child) = guard.as_mut() else {
            return Ok(());
        };

        if tokio::time::timeout(GRACEFUL_SHUTDOWN_DEADLINE, child.wait())
            .await
            .is_ok()
        {
            *guard = None;
            return Ok(());
        }

        if let Err(e) = child.start_kill() {
            tracing::warn!(error = %e, "failed to force-kill provider process");
            return Ok(());
        }

        if tokio::time::timeout(FORCE_KILL_DEADLINE, child.wait())
            .await
            .is_err()
        {
            tracing::warn!("provider process did not exit after force-kill; giving up");
        }
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_command_fails_to_connect() {
        let t = StdioTransport::new(Vec::new(), None);
        assert!(t.connect().await.is_err());
    }

    #[tokio::test]
    async fn round_trips_a_line_through_cat() {
        let t = StdioTransport::new(vec!["cat".to_string()], None);
        t.connect().await.expect("spawn cat");
        let msg = JsonRpcMessage::Request(crate::protocol::JsonRpcRequest::new(
            crate::protocol::RequestId::Number(1),
            "tools/list",
            None,
        ));
        t.send(&msg).await.unwrap();
        let echoed = t.recv().await.expect("cat echoes the line back");
        assert_eq!(echoed.method(), Some("tools/list"));
        t.close().await.unwrap();
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let t = StdioTransport::new(vec!["cat".to_string()], None);
        t.connect().await.unwrap();
        t.close().await.unwrap();
        t.close().await.unwrap();
        assert!(!t.is_connected());
    }
}

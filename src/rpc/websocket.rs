//! Graphene WebSocket JSON-RPC transport
//!
//! Requests use the node's `call` envelope:
//! `{"id": n, "method": "call", "params": [api_id, method, params]}`.
//! A session logs in on API 1 and resolves the `database` API id once,
//! then issues every query against that id.

use super::prober::{ConnectionTester, ProbeResult};
use super::transport::{Session, Transport};
use crate::error::{RpcError, RpcResult};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// API id every graphene node exposes for `login`
const LOGIN_API: u64 = 1;

/// WebSocket transport for graphene nodes
#[derive(Debug, Clone)]
pub struct WsTransport {
    request_timeout: Duration,
}

impl WsTransport {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }

    /// Open a socket and complete the login handshake
    pub async fn open(&self, url: &str) -> RpcResult<WsSession> {
        validate_ws_url(url)?;

        tracing::debug!(url, "connecting to node");
        let (stream, _response) = tokio::time::timeout(
            self.request_timeout,
            tokio_tungstenite::connect_async(url),
        )
        .await
        .map_err(|_| RpcError::Timeout(self.request_timeout.as_millis() as u64))?
        .map_err(|e| RpcError::Transport(format!("WebSocket connection to {} failed: {}", url, e)))?;

        let mut session = WsSession {
            url: url.to_string(),
            inner: Mutex::new(Inner { stream, next_id: 1 }),
            database_api: 0,
            broken: AtomicBool::new(false),
            request_timeout: self.request_timeout,
        };

        session
            .raw_call(LOGIN_API, "login", json!(["", ""]))
            .await?;
        let api = session.raw_call(LOGIN_API, "database", json!([])).await?;
        session.database_api = api
            .as_u64()
            .ok_or_else(|| RpcError::Decode(format!("database API id was {}", api)))?;

        tracing::debug!(url, database_api = session.database_api, "node session ready");
        Ok(session)
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &str) -> RpcResult<Arc<dyn Session>> {
        let session = self.open(url).await?;
        Ok(Arc::new(session))
    }
}

#[async_trait]
impl ConnectionTester for WsTransport {
    async fn test_connection(&self, url: &str) -> Option<ProbeResult> {
        let start = Instant::now();
        match self.open(url).await {
            Ok(session) => {
                let lag = start.elapsed();
                session.close().await;
                Some(ProbeResult {
                    url: url.to_string(),
                    lag,
                })
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "probe failed");
                None
            }
        }
    }
}

fn validate_ws_url(url: &str) -> RpcResult<()> {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(())
    } else {
        Err(RpcError::Transport(format!(
            "Invalid WebSocket URL format: {}",
            url
        )))
    }
}

struct Inner {
    stream: WsStream,
    next_id: u64,
}

/// One authenticated socket to a node
pub struct WsSession {
    url: String,
    inner: Mutex<Inner>,
    database_api: u64,
    /// Set after the first socket-level failure; later calls fail fast
    broken: AtomicBool,
    request_timeout: Duration,
}

impl std::fmt::Debug for WsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsSession")
            .field("url", &self.url)
            .field("database_api", &self.database_api)
            .field("broken", &self.broken)
            .finish_non_exhaustive()
    }
}

impl WsSession {
    async fn raw_call(&self, api: u64, method: &str, params: Value) -> RpcResult<Value> {
        if self.broken.load(Ordering::Acquire) {
            return Err(RpcError::Transport(format!(
                "connection to {} is closed",
                self.url
            )));
        }

        let result = tokio::time::timeout(
            self.request_timeout,
            self.exchange(api, method, params),
        )
        .await
        .unwrap_or_else(|_| Err(RpcError::Timeout(self.request_timeout.as_millis() as u64)));

        if let Err(e) = &result {
            if e.is_connectivity() {
                self.broken.store(true, Ordering::Release);
            }
        }
        result
    }

    async fn exchange(&self, api: u64, method: &str, params: Value) -> RpcResult<Value> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let request = json!({
            "id": id,
            "method": "call",
            "params": [api, method, params],
        });
        tracing::trace!(url = %self.url, %request, "sending request");

        inner
            .stream
            .send(Message::Text(request.to_string().into()))
            .await
            .map_err(|e| RpcError::Transport(format!("WebSocket send error: {}", e)))?;

        while let Some(msg) = inner.stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let response: Value = serde_json::from_str(text.as_str())
                        .map_err(|e| RpcError::Decode(format!("{}: {}", method, e)))?;
                    if response.get("id").and_then(Value::as_u64) != Some(id) {
                        // Subscription notices and stale replies
                        continue;
                    }
                    return parse_response(method, response);
                }
                Ok(Message::Close(_)) => {
                    return Err(RpcError::Transport(format!(
                        "{} closed the connection",
                        self.url
                    )));
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(RpcError::Transport(format!("WebSocket error: {}", e)));
                }
            }
        }

        Err(RpcError::Transport(format!(
            "{} ended the stream",
            self.url
        )))
    }

    /// Close the socket, ignoring errors
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        let _ = inner.stream.close(None).await;
        self.broken.store(true, Ordering::Release);
    }
}

#[async_trait]
impl Session for WsSession {
    fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
        self.raw_call(self.database_api, method, params).await
    }
}

/// Split a JSON-RPC response into its result or remote error
fn parse_response(method: &str, mut response: Value) -> RpcResult<Value> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(RpcError::Remote(format!("{}: {}", method, message)));
    }

    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(RpcError::Decode(format!(
            "{}: response has neither result nor error",
            method
        ))),
    }
}

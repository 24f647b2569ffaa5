//! Connection manager: one active node connection per target, with fail-over
//!
//! Each target keeps the ranking from its most recent probe and a cursor
//! into it. A connectivity failure moves the cursor forward; the manager
//! never goes back to an endpoint that already failed during the same
//! ranking. When the ranking runs out the target is reset so the next
//! `ensure_connected` probes again.

use super::prober::{ConnectionTester, Prober};
use super::transport::{Session, Transport};
use super::websocket::WsTransport;
use super::Endpoint;
use crate::config::RpcConfig;
use crate::error::{Error, Result, RpcError, RpcResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A handle on the active connection, held for one whole operation
#[derive(Debug, Clone)]
pub struct Lease {
    target: String,
    endpoint: Endpoint,
    session: Arc<dyn Session>,
    generation: u64,
}

impl Lease {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn url(&self) -> &str {
        &self.endpoint.url
    }

    /// Raw database API call
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        tracing::debug!(url = %self.endpoint.url, method, "rpc call");
        Ok(self.session.call(method, params).await?)
    }

    /// Database API call decoded into `T`
    pub async fn call_as<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let value = self.call(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| RpcError::Decode(format!("{}: {}", method, e)).into())
    }
}

struct Active {
    endpoint: Endpoint,
    session: Arc<dyn Session>,
    generation: u64,
}

struct TargetState {
    candidates: Vec<String>,
    /// Most recent probe result; `None` until probed or after exhaustion
    ranked: Option<Vec<Endpoint>>,
    cursor: usize,
    active: Option<Active>,
    generation: u64,
}

impl TargetState {
    fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            ranked: None,
            cursor: 0,
            active: None,
            generation: 0,
        }
    }

    fn cursor_url(&self) -> Option<&str> {
        self.ranked
            .as_ref()
            .and_then(|r| r.get(self.cursor))
            .map(|ep| ep.url.as_str())
    }

    /// Mark the endpoint at the cursor dead, along with any duplicate of its
    /// URL further down the ranking, and step past it
    fn drop_cursor(&mut self) {
        let Some(url) = self.cursor_url().map(str::to_string) else {
            return;
        };
        if let Some(ranked) = self.ranked.as_mut() {
            for ep in ranked.iter_mut().filter(|ep| ep.url == url) {
                ep.mark_dead();
            }
        }
        self.cursor += 1;
    }

    /// Whether `lease` was issued for the last connection at the cursor,
    /// which has since been dropped without being replaced
    fn is_dropped_lease(&self, lease: &Lease) -> bool {
        self.active.is_none()
            && lease.generation == self.generation
            && self.cursor_url() == Some(lease.endpoint.url.as_str())
    }

    fn lease(&self, target: &str) -> Option<Lease> {
        self.active.as_ref().map(|a| Lease {
            target: target.to_string(),
            endpoint: a.endpoint.clone(),
            session: a.session.clone(),
            generation: a.generation,
        })
    }
}

/// Owns the active connection for every configured target
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    prober: Prober,
    targets: HashMap<String, Mutex<TargetState>>,
    max_failovers: u32,
}

impl ConnectionManager {
    /// Create a manager over the targets in `config`
    pub fn new(
        config: &RpcConfig,
        transport: Arc<dyn Transport>,
        tester: Arc<dyn ConnectionTester>,
    ) -> Self {
        let targets = config
            .pools
            .iter()
            .map(|(name, urls)| (name.clone(), Mutex::new(TargetState::new(urls.clone()))))
            .collect();

        Self {
            transport,
            prober: Prober::new(tester, config.probe_timeout),
            targets,
            max_failovers: config.max_failovers,
        }
    }

    /// Manager backed by the graphene WebSocket transport
    pub fn websocket(config: &RpcConfig) -> Self {
        let ws = Arc::new(WsTransport::new(config.request_timeout));
        Self::new(config, ws.clone(), ws)
    }

    /// Configured target names, sorted
    pub fn targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn slot(&self, target: &str) -> RpcResult<&Mutex<TargetState>> {
        self.targets
            .get(target)
            .ok_or_else(|| RpcError::UnknownTarget(target.to_string()))
    }

    /// Return a lease on the active connection, connecting if needed.
    ///
    /// Probes the target first if it has no ranking yet.
    pub async fn ensure_connected(&self, target: &str) -> RpcResult<Lease> {
        let mut state = self.slot(target)?.lock().await;
        self.ensure_locked(target, &mut state).await
    }

    /// Move the target to the next-best untried endpoint.
    ///
    /// Fails with `EndpointsExhausted` when none remain; the target then
    /// has no active connection and will be probed again on next use.
    pub async fn on_failure(&self, target: &str) -> RpcResult<Endpoint> {
        let mut state = self.slot(target)?.lock().await;
        let lease = self.advance(target, &mut state).await?;
        Ok(lease.endpoint)
    }

    /// Report a connectivity failure seen on `lease`.
    ///
    /// Advances only if `lease` still refers to the active connection, so
    /// several operations failing on the same node move the target once.
    pub async fn report_failure(&self, lease: &Lease) -> RpcResult<Lease> {
        let mut state = self.slot(&lease.target)?.lock().await;
        let current = state.active.as_ref().map(|a| a.generation);

        if current == Some(lease.generation) {
            self.advance(&lease.target, &mut state).await
        } else if state.is_dropped_lease(lease) {
            tracing::warn!(url = %lease.endpoint.url, "dropping failed endpoint");
            state.drop_cursor();
            self.connect_from_cursor(&lease.target, &mut state).await
        } else {
            tracing::debug!(
                url = %lease.endpoint.url,
                "failure already handled, reusing current connection"
            );
            self.ensure_locked(&lease.target, &mut state).await
        }
    }

    /// Probe the target again and start over from the new best endpoint
    pub async fn reprobe(&self, target: &str) -> RpcResult<Vec<Endpoint>> {
        let mut state = self.slot(target)?.lock().await;
        let ranked = self.prober.probe(target, &state.candidates).await?;
        state.ranked = Some(ranked.clone());
        state.cursor = 0;
        state.active = None;
        Ok(ranked)
    }

    /// The endpoint currently in use, if connected
    pub async fn active_endpoint(&self, target: &str) -> RpcResult<Option<Endpoint>> {
        let state = self.slot(target)?.lock().await;
        Ok(state.active.as_ref().map(|a| a.endpoint.clone()))
    }

    /// The most recent ranking, with endpoints that failed since marked dead
    pub async fn ranked_endpoints(&self, target: &str) -> RpcResult<Option<Vec<Endpoint>>> {
        let state = self.slot(target)?.lock().await;
        Ok(state.ranked.clone())
    }

    /// Drop every active connection
    pub async fn shutdown(&self) {
        for (name, slot) in &self.targets {
            let mut state = slot.lock().await;
            if let Some(active) = state.active.take() {
                tracing::debug!(target_name = %name, url = %active.endpoint.url, "closing connection");
            }
        }
    }

    /// Run `op` with fail-over.
    ///
    /// On a connectivity error the failure is reported and `op` is retried
    /// on the next endpoint, at most `max_failovers` times. Any other error
    /// is returned as is.
    pub async fn with_failover<T, F, Fut>(&self, target: &str, mut op: F) -> Result<T>
    where
        F: FnMut(Lease) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut lease = self.ensure_connected(target).await?;
        let mut failovers = 0;

        loop {
            match op(lease.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if is_connectivity(&e) => {
                    tracing::warn!(
                        target_name = target,
                        url = %lease.endpoint.url,
                        error = %e,
                        "node failed, failing over"
                    );
                    let next = self.report_failure(&lease).await?;
                    if failovers >= self.max_failovers {
                        return Err(e);
                    }
                    failovers += 1;
                    lease = next;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn ensure_locked(&self, target: &str, state: &mut TargetState) -> RpcResult<Lease> {
        if let Some(lease) = state.lease(target) {
            return Ok(lease);
        }

        if state.ranked.is_none() {
            let ranked = self.prober.probe(target, &state.candidates).await?;
            state.ranked = Some(ranked);
            state.cursor = 0;
        }

        self.connect_from_cursor(target, state).await
    }

    async fn advance(&self, target: &str, state: &mut TargetState) -> RpcResult<Lease> {
        if let Some(active) = state.active.take() {
            tracing::warn!(target_name = target, url = %active.endpoint.url, "dropping failed endpoint");
            state.drop_cursor();
        }
        self.connect_from_cursor(target, state).await
    }

    /// Connect to the endpoint at the cursor, skipping any that refuse
    async fn connect_from_cursor(&self, target: &str, state: &mut TargetState) -> RpcResult<Lease> {
        loop {
            let next = state
                .ranked
                .as_ref()
                .and_then(|r| r.get(state.cursor))
                .cloned();
            let endpoint = match next {
                Some(ep) if !ep.alive => {
                    state.cursor += 1;
                    continue;
                }
                Some(ep) => ep,
                None => {
                    state.active = None;
                    state.ranked = None;
                    state.cursor = 0;
                    tracing::warn!(target_name = target, "all known-good endpoints failed");
                    return Err(RpcError::EndpointsExhausted {
                        target: target.to_string(),
                    });
                }
            };

            match self.transport.connect(&endpoint.url).await {
                Ok(session) => {
                    state.generation += 1;
                    tracing::info!(target_name = target, endpoint = %endpoint, "using endpoint");
                    let lease = Lease {
                        target: target.to_string(),
                        endpoint: endpoint.clone(),
                        session: session.clone(),
                        generation: state.generation,
                    };
                    state.active = Some(Active {
                        endpoint,
                        session,
                        generation: state.generation,
                    });
                    return Ok(lease);
                }
                Err(e) => {
                    tracing::warn!(target_name = target, url = %endpoint.url, error = %e, "connect failed");
                    state.drop_cursor();
                }
            }
        }
    }
}

fn is_connectivity(error: &Error) -> bool {
    error.as_rpc().is_some_and(RpcError::is_connectivity)
}

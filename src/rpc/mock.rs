//! Scripted in-memory node network for unit tests

use super::prober::{ConnectionTester, ProbeResult};
use super::transport::{Session, Transport};
use crate::error::{RpcError, RpcResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Arc<dyn Fn(&Value) -> RpcResult<Value> + Send + Sync>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Up,
    Down,
    Hanging,
}

struct Node {
    lag: Duration,
    state: NodeState,
}

#[derive(Default)]
struct State {
    nodes: HashMap<String, Node>,
    responders: HashMap<String, Responder>,
    calls: Vec<(String, String)>,
    connects: Vec<String>,
}

/// Every node shares the same chain data; nodes differ in lag and liveness
#[derive(Clone, Default)]
pub struct MockNetwork {
    state: Arc<Mutex<State>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(self, url: &str, lag_ms: u64) -> Self {
        self.insert(url, Duration::from_millis(lag_ms), NodeState::Up)
    }

    pub fn unreachable(self, url: &str) -> Self {
        self.insert(url, Duration::ZERO, NodeState::Down)
    }

    /// Probes never complete
    pub fn hanging(self, url: &str) -> Self {
        self.insert(url, Duration::ZERO, NodeState::Hanging)
    }

    fn insert(self, url: &str, lag: Duration, state: NodeState) -> Self {
        self.state
            .lock()
            .unwrap()
            .nodes
            .insert(url.to_string(), Node { lag, state });
        self
    }

    pub fn respond(self, method: &str, value: Value) -> Self {
        self.respond_with(method, move |_| Ok(value.clone()))
    }

    pub fn respond_with<F>(self, method: &str, f: F) -> Self
    where
        F: Fn(&Value) -> RpcResult<Value> + Send + Sync + 'static,
    {
        self.state
            .lock()
            .unwrap()
            .responders
            .insert(method.to_string(), Arc::new(f));
        self
    }

    /// Take a node down after the fact; open sessions start failing too
    pub fn kill(&self, url: &str) {
        if let Some(node) = self.state.lock().unwrap().nodes.get_mut(url) {
            node.state = NodeState::Down;
        }
    }

    /// Methods called against one node, in order
    pub fn calls_to(&self, url: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn connects_to(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .connects
            .iter()
            .filter(|u| *u == url)
            .count()
    }

    fn node_state(&self, url: &str) -> NodeState {
        self.state
            .lock()
            .unwrap()
            .nodes
            .get(url)
            .map(|n| n.state)
            .unwrap_or(NodeState::Down)
    }
}

#[async_trait]
impl ConnectionTester for MockNetwork {
    async fn test_connection(&self, url: &str) -> Option<ProbeResult> {
        let (state, lag) = {
            let guard = self.state.lock().unwrap();
            match guard.nodes.get(url) {
                Some(node) => (node.state, node.lag),
                None => return None,
            }
        };
        match state {
            NodeState::Up => Some(ProbeResult {
                url: url.to_string(),
                lag,
            }),
            NodeState::Down => None,
            NodeState::Hanging => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                None
            }
        }
    }
}

#[async_trait]
impl Transport for MockNetwork {
    async fn connect(&self, url: &str) -> RpcResult<Arc<dyn Session>> {
        self.state.lock().unwrap().connects.push(url.to_string());
        match self.node_state(url) {
            NodeState::Up => Ok(Arc::new(MockSession {
                url: url.to_string(),
                network: self.clone(),
            })),
            _ => Err(RpcError::Transport(format!("connection refused: {}", url))),
        }
    }
}

pub struct MockSession {
    url: String,
    network: MockNetwork,
}

impl std::fmt::Debug for MockSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSession").field("url", &self.url).finish()
    }
}

#[async_trait]
impl Session for MockSession {
    fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
        let responder = {
            let mut state = self.network.state.lock().unwrap();
            state.calls.push((self.url.clone(), method.to_string()));
            state.responders.get(method).cloned()
        };

        if self.network.node_state(&self.url) != NodeState::Up {
            return Err(RpcError::Transport(format!("{} went away", self.url)));
        }

        match responder {
            Some(f) => f(&params),
            None => Err(RpcError::Remote(format!("{}: method not found", method))),
        }
    }
}

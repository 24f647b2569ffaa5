//! Fail-over scenario through the public API
//!
//! Pool: A (200ms), B (50ms), C (unreachable). Probing ranks B before A,
//! queries start on B, move to A when B dies, and run out when A dies too.

use async_trait::async_trait;
use btsnft::{
    ConnectionManager, ConnectionTester, ProbeResult, QueryClient, RpcConfig, RpcError,
    RpcResult, Session, Transport,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Nodes {
    lag: Arc<Mutex<Vec<(String, u64)>>>,
    dead: Arc<Mutex<HashSet<String>>>,
}

impl Nodes {
    fn new(nodes: &[(&str, Option<u64>)]) -> Self {
        let this = Self::default();
        for (url, lag) in nodes {
            match lag {
                Some(ms) => this.lag.lock().unwrap().push((url.to_string(), *ms)),
                None => {
                    this.dead.lock().unwrap().insert(url.to_string());
                }
            }
        }
        this
    }

    fn kill(&self, url: &str) {
        self.dead.lock().unwrap().insert(url.to_string());
    }

    fn is_dead(&self, url: &str) -> bool {
        self.dead.lock().unwrap().contains(url)
    }
}

#[async_trait]
impl ConnectionTester for Nodes {
    async fn test_connection(&self, url: &str) -> Option<ProbeResult> {
        if self.is_dead(url) {
            return None;
        }
        let lag = self
            .lag
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, ms)| Duration::from_millis(*ms))?;
        Some(ProbeResult {
            url: url.to_string(),
            lag,
        })
    }
}

#[derive(Debug)]
struct NodeSession {
    url: String,
    dead: Arc<Mutex<HashSet<String>>>,
}

#[async_trait]
impl Session for NodeSession {
    fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, _params: Value) -> RpcResult<Value> {
        if self.dead.lock().unwrap().contains(&self.url) {
            return Err(RpcError::Transport(format!("{} reset the connection", self.url)));
        }
        match method {
            "get_objects" => Ok(json!([{"id": "1.2.100", "name": "served-by", "node": self.url}])),
            _ => Err(RpcError::Remote(format!("{}: unsupported", method))),
        }
    }
}

#[async_trait]
impl Transport for Nodes {
    async fn connect(&self, url: &str) -> RpcResult<Arc<dyn Session>> {
        if self.is_dead(url) {
            return Err(RpcError::Transport(format!("{} refused", url)));
        }
        Ok(Arc::new(NodeSession {
            url: url.to_string(),
            dead: self.dead.clone(),
        }))
    }
}

fn setup() -> (Nodes, Arc<ConnectionManager>) {
    let nodes = Nodes::new(&[
        ("wss://a", Some(200)),
        ("wss://b", Some(50)),
        ("wss://c", None),
    ]);
    let config = RpcConfig::default()
        .with_pool("mainnet", ["wss://a", "wss://b", "wss://c"])
        .with_probe_timeout(Duration::from_millis(500));
    let shared = Arc::new(nodes.clone());
    let manager = Arc::new(ConnectionManager::new(&config, shared.clone(), shared));
    (nodes, manager)
}

#[tokio::test]
async fn test_probe_ranks_reachable_nodes() {
    let (_, manager) = setup();
    let ranked = manager.reprobe("mainnet").await.unwrap();

    let urls: Vec<_> = ranked.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(urls, vec!["wss://b", "wss://a"]);
    assert_eq!(ranked[0].latency, Some(Duration::from_millis(50)));
}

#[tokio::test]
async fn test_manual_failover_sequence() {
    let (_, manager) = setup();

    let lease = manager.ensure_connected("mainnet").await.unwrap();
    assert_eq!(lease.url(), "wss://b");

    let next = manager.on_failure("mainnet").await.unwrap();
    assert_eq!(next.url, "wss://a");

    let err = manager.on_failure("mainnet").await.unwrap_err();
    assert!(matches!(err, RpcError::EndpointsExhausted { ref target } if target == "mainnet"));
}

#[tokio::test]
async fn test_queries_follow_failover() {
    let (nodes, manager) = setup();
    let client = QueryClient::new(manager.clone());

    let object = client.fetch_object("mainnet", "1.2.100").await.unwrap();
    assert_eq!(object["node"], "wss://b");

    nodes.kill("wss://b");
    let object = client.fetch_object("mainnet", "1.2.100").await.unwrap();
    assert_eq!(object["node"], "wss://a");
    assert_eq!(
        manager.active_endpoint("mainnet").await.unwrap().unwrap().url,
        "wss://a"
    );

    nodes.kill("wss://a");
    let err = client.fetch_object("mainnet", "1.2.100").await.unwrap_err();
    assert!(matches!(
        err.as_rpc(),
        Some(RpcError::EndpointsExhausted { .. })
    ));
    assert!(manager.active_endpoint("mainnet").await.unwrap().is_none());
}

#[tokio::test]
async fn test_all_unreachable_is_distinct_from_exhaustion() {
    let nodes = Nodes::new(&[("wss://x", None), ("wss://y", None)]);
    let config = RpcConfig::default().with_pool("mainnet", ["wss://x", "wss://y"]);
    let shared = Arc::new(nodes);
    let manager = ConnectionManager::new(&config, shared.clone(), shared);

    let err = manager.ensure_connected("mainnet").await.unwrap_err();
    assert!(matches!(err, RpcError::NoReachableEndpoint { .. }));
}

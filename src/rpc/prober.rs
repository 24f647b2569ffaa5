//! Endpoint probing: concurrent reachability and latency checks

use super::Endpoint;
use crate::error::{RpcError, RpcResult};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a successful connectivity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub url: String,
    pub lag: Duration,
}

/// Checks whether a node answers, and how fast
#[async_trait]
pub trait ConnectionTester: Send + Sync {
    /// `None` when the node is unreachable or refuses the handshake
    async fn test_connection(&self, url: &str) -> Option<ProbeResult>;
}

/// Ranks a target's candidate endpoints by measured latency
#[derive(Clone)]
pub struct Prober {
    tester: Arc<dyn ConnectionTester>,
    timeout: Duration,
}

impl Prober {
    pub fn new(tester: Arc<dyn ConnectionTester>, timeout: Duration) -> Self {
        Self { tester, timeout }
    }

    /// Probe every candidate concurrently.
    ///
    /// Returns the reachable endpoints sorted by ascending latency, ties
    /// keeping candidate order. Fails with `NoCandidates` for an empty
    /// list and `NoReachableEndpoint` when every check failed.
    pub async fn probe(&self, target: &str, candidates: &[String]) -> RpcResult<Vec<Endpoint>> {
        if candidates.is_empty() {
            return Err(RpcError::NoCandidates {
                target: target.to_string(),
            });
        }

        let checks = candidates.iter().map(|url| {
            let tester = self.tester.clone();
            let timeout = self.timeout;
            async move {
                match tokio::time::timeout(timeout, tester.test_connection(url)).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::debug!(url = %url, "probe timed out");
                        None
                    }
                }
            }
        });

        let mut reachable: Vec<Endpoint> = join_all(checks)
            .await
            .into_iter()
            .flatten()
            .map(|r| Endpoint::reachable(r.url, r.lag))
            .collect();

        if reachable.is_empty() {
            tracing::warn!(
                target_name = target,
                candidates = candidates.len(),
                "no node answered the connectivity probe"
            );
            return Err(RpcError::NoReachableEndpoint {
                target: target.to_string(),
            });
        }

        // sort_by_key is stable
        reachable.sort_by_key(|e| e.latency);

        tracing::info!(
            target_name = target,
            reachable = reachable.len(),
            candidates = candidates.len(),
            best = %reachable[0].url,
            "probed endpoints"
        );
        Ok(reachable)
    }
}

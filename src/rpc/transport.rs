//! Transport seam between the connection manager and a node RPC client

use crate::error::RpcResult;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A live connection to one node
#[async_trait]
pub trait Session: Send + Sync + fmt::Debug {
    /// URL this session was opened against
    fn url(&self) -> &str;

    /// Issue one database API call.
    ///
    /// Connectivity problems must surface as `RpcError::Transport` or
    /// `RpcError::Timeout`; an error object returned by the node is
    /// `RpcError::Remote`.
    async fn call(&self, method: &str, params: Value) -> RpcResult<Value>;
}

/// Opens sessions against node URLs
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self, url: &str) -> RpcResult<Arc<dyn Session>>;
}

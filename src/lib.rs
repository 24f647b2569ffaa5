//! btsnft - resilient read client for NFT data on graphene networks
//!
//! A Rust library and CLI for querying BitShares-style nodes for assets,
//! balances, order books and raw objects. Candidate nodes are probed for
//! latency, the fastest one is used, and connectivity failures fail over to
//! the next-best node without retrying a dead one.
//!
//! # Example
//!
//! ```rust,no_run
//! use btsnft::{ConfigFile, ConnectionManager, QueryClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigFile::load_default()?.unwrap_or_default().rpc_config();
//!     let manager = Arc::new(ConnectionManager::websocket(&config));
//!     let client = QueryClient::new(manager);
//!
//!     let balances = client.fetch_user_balances("mainnet", "1.2.1803677").await?;
//!     for balance in balances {
//!         println!("{} {}", balance.precise_amount, balance.split_symbol);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod query;
pub mod rpc;
pub mod types;

// Re-exports for convenience
pub use config::{
    ConfigFile, DisabledEndpoints, EndpointConfig, Network, RpcConfig, Settings, TargetConfig,
};
pub use error::{ConfigError, Error, Result, RpcError, RpcResult};
pub use output::{write_output, EndpointReport, OutputFormat, Render};
pub use query::{lookup_asset_symbols, QueryClient};
pub use rpc::{
    default_endpoints, ConnectionManager, ConnectionTester, Endpoint, Lease, ProbeResult, Prober,
    Session, Transport, WsSession, WsTransport,
};
pub use types::{
    scale_amount, AccountBalance, AssetRecord, DynamicData, NftDescription, Order, OrderBook,
    UserBalance, UNKNOWN,
};

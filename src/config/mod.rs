//! Configuration: networks, endpoint lists, runtime settings

mod endpoint;
mod file;

pub use endpoint::EndpointConfig;
pub use file::{ConfigFile, DisabledEndpoints, Settings, TargetConfig};

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A logical target: one named network with its own endpoint pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Network {
    Mainnet,
    Testnet,
    Custom(String),
}

impl Network {
    /// Key used for this network in config files and the connection manager
    pub fn name(&self) -> &str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Custom(name) => name,
        }
    }

    /// Networks that ship with built-in node lists
    pub fn builtin() -> [Network; 2] {
        [Network::Mainnet, Network::Testnet]
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::InvalidTarget("empty target name".to_string()));
        }
        match s.to_lowercase().as_str() {
            "mainnet" | "bitshares" | "bts" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            _ if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') => {
                Ok(Network::Custom(s.to_string()))
            }
            _ => Err(ConfigError::InvalidTarget(s.to_string())),
        }
    }
}

/// Runtime settings for probing, connecting and fail-over
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Candidate URLs per target, in configured order
    pub pools: BTreeMap<String, Vec<String>>,
    /// Upper bound on a single connectivity probe
    pub probe_timeout: Duration,
    /// Upper bound on a single RPC call
    pub request_timeout: Duration,
    /// How many times one operation may move to the next endpoint
    pub max_failovers: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            pools: BTreeMap::new(),
            probe_timeout: Duration::from_millis(3_000),
            request_timeout: Duration::from_secs(30),
            max_failovers: 1,
        }
    }
}

impl RpcConfig {
    /// Builder-style setter for one target's candidate list
    pub fn with_pool<I, S>(mut self, target: impl Into<String>, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pools
            .insert(target.into(), urls.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_failovers(mut self, max: u32) -> Self {
        self.max_failovers = max;
        self
    }
}

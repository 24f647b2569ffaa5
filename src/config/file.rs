//! Configuration file handling

use super::{EndpointConfig, Network, RpcConfig};
use crate::error::{ConfigError, Result};
use crate::rpc::default_endpoints;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Per-target node lists, keyed by target name
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,

    /// Disabled endpoints
    #[serde(default)]
    pub disabled_endpoints: DisabledEndpoints,
}

/// Global settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Target used when none is given on the command line
    #[serde(default = "default_target")]
    pub default_target: String,

    /// Connectivity probe timeout in milliseconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,

    /// Max fail-overs per query
    #[serde(default = "default_failovers")]
    pub max_failovers: u32,
}

fn default_target() -> String {
    Network::Mainnet.name().to_string()
}

fn default_probe_timeout() -> u64 {
    3_000
}

fn default_timeout() -> u64 {
    30
}

fn default_failovers() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_target: default_target(),
            probe_timeout_ms: default_probe_timeout(),
            request_timeout_seconds: default_timeout(),
            max_failovers: default_failovers(),
        }
    }
}

/// Node list for one target
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Candidate nodes, in preference order for tie-breaking
    #[serde(default)]
    pub nodes: Vec<EndpointConfig>,

    /// Append the built-in node list after `nodes` (mainnet/testnet only)
    #[serde(default)]
    pub include_defaults: bool,
}

/// Disabled endpoints configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisabledEndpoints {
    /// List of URLs to disable
    #[serde(default)]
    pub urls: Vec<String>,
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("btsnft")
            .join("config.toml")
    }

    /// Load from default path
    pub fn load_default() -> Result<Option<Self>> {
        let path = Self::default_path();
        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Load from a specific path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::InvalidFile(format!("{}: {}", path.display(), e)))?;

        let config: Self = toml::from_str(&content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Save to a specific path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::InvalidFile(format!("Failed to create directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFile(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::InvalidFile(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Check if an endpoint URL is disabled
    pub fn is_endpoint_disabled(&self, url: &str) -> bool {
        self.disabled_endpoints.urls.iter().any(|u| u == url)
    }

    /// Endpoints for one target after applying defaults and disabled lists
    pub fn endpoints_for(&self, network: &Network) -> Vec<EndpointConfig> {
        let mut endpoints = Vec::new();
        let configured = self.target_config(network);

        match configured {
            Some(target) if !target.nodes.is_empty() => {
                endpoints.extend(target.nodes.iter().cloned());
                if target.include_defaults {
                    for ep in default_endpoints(network) {
                        if !endpoints.iter().any(|e| e.url == ep.url) {
                            endpoints.push(ep);
                        }
                    }
                }
            }
            _ => endpoints = default_endpoints(network),
        }

        let disabled: HashSet<_> = self.disabled_endpoints.urls.iter().collect();
        endpoints.retain(|e| e.enabled && !disabled.contains(&e.url));
        endpoints
    }

    /// The `[targets.*]` table for `network`, whether keyed by its
    /// canonical name or by an alias such as `bts`
    fn target_config(&self, network: &Network) -> Option<&TargetConfig> {
        self.targets.get(network.name()).or_else(|| {
            self.targets
                .iter()
                .find(|(key, _)| key.parse::<Network>().ok().as_ref() == Some(network))
                .map(|(_, target)| target)
        })
    }

    /// All targets this file knows about: built-ins plus configured ones
    pub fn networks(&self) -> Vec<Network> {
        let mut networks: Vec<Network> = Network::builtin().to_vec();
        for name in self.targets.keys() {
            if let Ok(network) = name.parse::<Network>() {
                if !networks.contains(&network) {
                    networks.push(network);
                }
            }
        }
        networks
    }

    /// Runtime config: the read-only target → candidate mapping plus timeouts
    pub fn rpc_config(&self) -> RpcConfig {
        let pools = self
            .networks()
            .into_iter()
            .map(|network| {
                let urls = self
                    .endpoints_for(&network)
                    .into_iter()
                    .map(|e| e.url)
                    .collect();
                (network.name().to_string(), urls)
            })
            .collect();

        RpcConfig {
            pools,
            probe_timeout: Duration::from_millis(self.settings.probe_timeout_ms),
            request_timeout: Duration::from_secs(self.settings.request_timeout_seconds),
            max_failovers: self.settings.max_failovers,
        }
    }

    /// A starter file listing the built-in nodes explicitly
    pub fn template() -> Self {
        let targets = Network::builtin()
            .iter()
            .map(|network| {
                (
                    network.name().to_string(),
                    TargetConfig {
                        nodes: default_endpoints(network),
                        include_defaults: false,
                    },
                )
            })
            .collect();

        Self {
            settings: Settings::default(),
            targets,
            disabled_endpoints: DisabledEndpoints::default(),
        }
    }
}

//! Built-in public node lists
//!
//! Used for mainnet and testnet when the config file does not list nodes.
//! Order matters only as a tie-breaker after probing.

use crate::config::{EndpointConfig, Network};

/// Get default endpoints for a network
pub fn default_endpoints(network: &Network) -> Vec<EndpointConfig> {
    match network {
        Network::Mainnet => mainnet_endpoints(),
        Network::Testnet => testnet_endpoints(),
        Network::Custom(_) => Vec::new(), // Custom networks need user-provided nodes
    }
}

fn mainnet_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::new("wss://node.xbts.io/ws").with_note("XBTS"),
        EndpointConfig::new("wss://cloud.xbts.io/ws").with_note("XBTS"),
        EndpointConfig::new("wss://public.xbts.io/ws").with_note("XBTS"),
        EndpointConfig::new("wss://btsws.roelandp.nl/ws").with_note("Finland"),
        EndpointConfig::new("wss://dex.iobanker.com/ws").with_note("Germany"),
        EndpointConfig::new("wss://api.bts.mobi/ws").with_note("Virginia"),
        EndpointConfig::new("wss://eu.nodes.bitshares.ws"),
        EndpointConfig::new("wss://newyork.bitshares.im/ws"),
    ]
}

fn testnet_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::new("wss://testnet.xbts.io/ws").with_note("XBTS"),
        EndpointConfig::new("wss://api-testnet.61bts.com/ws"),
        EndpointConfig::new("wss://testnet.bitshares.im/ws"),
        EndpointConfig::new("wss://testnet.dex.trading/"),
    ]
}

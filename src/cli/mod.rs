//! CLI command modules
//!
//! Each subcommand group has its own module with argument definitions and handlers.

pub mod config;
pub mod nodes;
pub mod query;

use btsnft::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "btsnft")]
#[command(
    version,
    about = "Query NFT assets, balances and order books from BitShares nodes with automatic fail-over"
)]
#[command(after_help = r#"EXAMPLES:
    # Probe mainnet nodes and show them fastest first
    btsnft nodes probe

    # NFTs issued by an account
    btsnft issued 1.2.1803677

    # Asset details, including non-NFT assets
    btsnft assets 1.3.0 1.3.5662 --all

    # Balances as JSON, against testnet
    btsnft --target testnet --format json balances 1.2.22

    # Use only specific nodes
    btsnft --node wss://node.xbts.io/ws --node wss://api.bts.mobi/ws orderbook BTS NFTEA.GALLERY

CONFIG FILE:
    Default: ~/.config/btsnft/config.toml (create one with `btsnft config init`)
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Network to query (mainnet, testnet, or a target from the config file)
    #[arg(long, short = 'T', global = true)]
    pub target: Option<String>,

    /// Use only this node for the target (can be repeated)
    #[arg(long = "node", action = clap::ArgAction::Append, global = true)]
    pub nodes: Vec<String>,

    /// Config file path
    #[arg(long, env = "BTSNFT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Per-node probe timeout in milliseconds
    #[arg(long, global = true)]
    pub probe_timeout: Option<u64>,

    /// Per-call request timeout in seconds
    #[arg(long, global = true)]
    pub request_timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List or probe the nodes of a target
    Nodes {
        #[command(subcommand)]
        action: nodes::NodeCommands,
    },

    /// Look up assets by id or symbol
    Assets(query::AssetsArgs),

    /// NFTs issued by an account
    Issued {
        /// Account id (1.2.x)
        account: String,
    },

    /// Fetch a raw chain object
    Object {
        /// Object id (e.g. 1.3.0, 2.3.0)
        id: String,
    },

    /// Issuer and current supply of an asset
    Dynamic {
        /// Asset id or symbol
        asset: String,
    },

    /// Balances of an account
    Balances {
        /// Account id (1.2.x)
        account: String,
    },

    /// Order book for a market
    Orderbook(query::OrderBookArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: config::ConfigCommands,
    },
}

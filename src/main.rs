//! btsnft CLI - NFT queries against BitShares nodes with fail-over

mod cli;

use btsnft::{ConfigFile, ConnectionManager, Network, QueryClient, RpcConfig};
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(ConfigFile::default_path);

    if let Commands::Config { action } = &cli.command {
        return cli::config::handle(action, &config_path);
    }

    let config_file = load_config(&cli)?;
    let target = resolve_target(&cli, &config_file)?;
    let rpc_config = build_rpc_config(&cli, &config_file, &target);

    if let Commands::Nodes { action } = &cli.command {
        return cli::nodes::handle(action, &rpc_config, &target, cli.format).await;
    }

    let manager = Arc::new(ConnectionManager::websocket(&rpc_config));
    let client = QueryClient::new(manager.clone());

    let result = cli::query::run(&cli.command, &client, &target, cli.format).await;
    manager.shutdown().await;
    result
}

/// Explicit `--config` must exist; the default path is optional
fn load_config(cli: &Cli) -> anyhow::Result<ConfigFile> {
    match &cli.config {
        Some(path) => Ok(ConfigFile::load(path)?),
        None => Ok(ConfigFile::load_default()?.unwrap_or_default()),
    }
}

fn resolve_target(cli: &Cli, config_file: &ConfigFile) -> anyhow::Result<String> {
    let name = cli
        .target
        .as_deref()
        .unwrap_or(&config_file.settings.default_target);
    let network: Network = name.parse()?;
    Ok(network.name().to_string())
}

fn build_rpc_config(cli: &Cli, config_file: &ConfigFile, target: &str) -> RpcConfig {
    let mut rpc_config = config_file.rpc_config();

    // Nodes from the command line replace the target's pool
    if !cli.nodes.is_empty() {
        rpc_config = rpc_config.with_pool(target, cli.nodes.iter().cloned());
    }

    if let Some(ms) = cli.probe_timeout {
        rpc_config = rpc_config.with_probe_timeout(Duration::from_millis(ms));
    }
    if let Some(secs) = cli.request_timeout {
        rpc_config = rpc_config.with_request_timeout(Duration::from_secs(secs));
    }

    rpc_config
}

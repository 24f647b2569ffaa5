//! Node listing and probing commands

use btsnft::{write_output, ConnectionManager, Endpoint, EndpointReport, OutputFormat, RpcConfig};
use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Subcommand)]
pub enum NodeCommands {
    /// List the configured candidate nodes
    List,

    /// Probe every candidate, connect to the best one and show reachable
    /// nodes fastest first
    Probe,
}

pub async fn handle(
    action: &NodeCommands,
    config: &RpcConfig,
    target: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let reports: Vec<EndpointReport> = match action {
        NodeCommands::List => {
            let urls = config
                .pools
                .get(target)
                .ok_or_else(|| anyhow::anyhow!("Unknown target: {}", target))?;
            urls.iter()
                .map(|url| EndpointReport::new(&Endpoint::candidate(url.as_str()), None))
                .collect()
        }

        NodeCommands::Probe => {
            let manager = ConnectionManager::websocket(config);
            let spinner = (format == OutputFormat::Text).then(|| probe_spinner(target));

            let result = probe_and_connect(&manager, target).await;
            if let Some(pb) = &spinner {
                pb.finish_and_clear();
            }
            manager.shutdown().await;

            let (ranked, active) = result?;
            ranked
                .iter()
                .map(|ep| EndpointReport::new(ep, active.as_ref()))
                .collect()
        }
    };

    if format == OutputFormat::Text {
        println!("{} endpoints for {}:\n", reports.len(), target);
    }
    write_output(format, reports.as_slice(), &mut std::io::stdout())?;
    Ok(())
}

/// Rank the target's nodes, then connect the way a query would so the
/// chosen node can be marked. A node that refuses the connection shows as down.
async fn probe_and_connect(
    manager: &ConnectionManager,
    target: &str,
) -> btsnft::Result<(Vec<Endpoint>, Option<Endpoint>)> {
    let probed = manager.reprobe(target).await?;
    let active = match manager.ensure_connected(target).await {
        Ok(lease) => Some(lease.endpoint().clone()),
        Err(e) => {
            tracing::warn!(target_name = target, error = %e, "no node accepted a connection");
            None
        }
    };
    // No ranking left means every probed node refused
    let ranked = match manager.ranked_endpoints(target).await? {
        Some(ranked) => ranked,
        None => probed
            .into_iter()
            .map(|mut ep| {
                ep.mark_dead();
                ep
            })
            .collect(),
    };
    Ok((ranked, active))
}

fn probe_spinner(target: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Probing {} nodes...", target));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

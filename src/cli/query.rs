//! Read query commands

use super::Commands;
use btsnft::{write_output, OutputFormat, QueryClient, RpcError};
use clap::Args;

#[derive(Args)]
pub struct AssetsArgs {
    /// Asset ids (1.3.x) or symbols
    #[arg(required = true)]
    pub assets: Vec<String>,

    /// Include assets without an NFT marker
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct OrderBookArgs {
    /// Base asset symbol or id
    pub base: String,

    /// Quote asset symbol or id
    pub quote: String,

    /// Orders per side
    #[arg(long, short, default_value = "10")]
    pub limit: u32,
}

/// Run one query command against `target`
pub async fn run(
    command: &Commands,
    client: &QueryClient,
    target: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut out = std::io::stdout();

    match command {
        Commands::Assets(args) => {
            let assets = client.fetch_assets(target, &args.assets, !args.all).await?;
            write_output(format, assets.as_slice(), &mut out)?;
        }

        Commands::Issued { account } => {
            let assets = client.fetch_issued_assets(target, account).await?;
            write_output(format, assets.as_slice(), &mut out)?;
        }

        Commands::Object { id } => {
            let object = client.fetch_object(target, id).await?;
            write_output(format, &object, &mut out)?;
        }

        Commands::Dynamic { asset } => {
            let record = client
                .fetch_assets(target, std::slice::from_ref(asset), false)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| RpcError::NotFound(format!("asset {}", asset)))?;
            let data = client.fetch_dynamic_data(target, &record).await?;
            write_output(format, &data, &mut out)?;
        }

        Commands::Balances { account } => {
            let balances = client.fetch_user_balances(target, account).await?;
            write_output(format, balances.as_slice(), &mut out)?;
        }

        Commands::Orderbook(args) => {
            let book = client
                .fetch_order_book(target, &args.base, &args.quote, args.limit)
                .await?;
            write_output(format, &book, &mut out)?;
        }

        Commands::Nodes { .. } | Commands::Config { .. } => {
            anyhow::bail!("not a query command");
        }
    }

    Ok(())
}

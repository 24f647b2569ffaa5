//! Read-only query façade over the connection manager
//!
//! Every operation runs its whole RPC sequence on one lease through
//! [`ConnectionManager::with_failover`], so a fail-over never switches
//! nodes in the middle of an operation.

use crate::error::{Error, Result, RpcError};
use crate::rpc::{ConnectionManager, Lease};
use crate::types::{
    AccountBalance, AccountObject, AssetRecord, DynamicAssetData, DynamicData, FullAccount,
    OrderBook, UserBalance, UNKNOWN,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Look up assets by id or symbol on `lease`.
///
/// Null entries (unknown ids) are dropped. With `nft_only`, assets whose
/// description is empty, not JSON, or lacks an `nft_object` are dropped too.
pub async fn lookup_asset_symbols(
    lease: &Lease,
    asset_ids: &[String],
    nft_only: bool,
) -> Result<Vec<AssetRecord>> {
    if asset_ids.is_empty() {
        return Ok(Vec::new());
    }

    let records: Vec<Option<AssetRecord>> = lease
        .call_as("lookup_asset_symbols", json!([asset_ids]))
        .await?;

    let assets = records
        .into_iter()
        .flatten()
        .filter(|asset| !nft_only || asset.is_nft())
        .collect();
    Ok(assets)
}

/// Read queries against one or more targets
#[derive(Clone)]
pub struct QueryClient {
    manager: Arc<ConnectionManager>,
}

impl QueryClient {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Asset records for `asset_ids`
    pub async fn fetch_assets(
        &self,
        target: &str,
        asset_ids: &[String],
        nft_only: bool,
    ) -> Result<Vec<AssetRecord>> {
        self.manager
            .with_failover(target, |lease| async move {
                lookup_asset_symbols(&lease, asset_ids, nft_only).await
            })
            .await
    }

    /// NFTs issued by `account_id`
    pub async fn fetch_issued_assets(
        &self,
        target: &str,
        account_id: &str,
    ) -> Result<Vec<AssetRecord>> {
        self.manager
            .with_failover(target, |lease| async move {
                let accounts: Vec<(String, FullAccount)> = lease
                    .call_as("get_full_accounts", json!([[account_id], false]))
                    .await?;

                let (_, full) = accounts
                    .into_iter()
                    .next()
                    .ok_or_else(|| RpcError::NotFound(format!("account {}", account_id)))?;

                lookup_asset_symbols(&lease, &full.assets, true).await
            })
            .await
    }

    /// Raw object by id
    pub async fn fetch_object(&self, target: &str, object_id: &str) -> Result<Value> {
        self.manager
            .with_failover(target, |lease| async move {
                let objects: Vec<Value> = lease
                    .call_as("get_objects", json!([[object_id]]))
                    .await?;
                first_object(objects, object_id)
            })
            .await
    }

    /// Issuer name and current supply of `asset`.
    ///
    /// Both lookups run concurrently. A piece that cannot be fetched is
    /// reported as `"???"` instead of failing the call; if that was a
    /// connectivity failure the node is still reported to the manager.
    pub async fn fetch_dynamic_data(
        &self,
        target: &str,
        asset: &AssetRecord,
    ) -> Result<DynamicData> {
        let lease = self.manager.ensure_connected(target).await?;

        let issuer = fetch_typed::<AccountObject>(&lease, Some(asset.issuer.as_str()));
        let supply =
            fetch_typed::<DynamicAssetData>(&lease, asset.dynamic_asset_data_id.as_deref());
        let (issuer, supply) = tokio::join!(issuer, supply);

        let mut connectivity_failure = false;
        let issuer = match issuer {
            Ok(account) => account.name,
            Err(e) => {
                tracing::warn!(asset = %asset.id, error = %e, "issuer lookup failed");
                connectivity_failure |= e.as_rpc().is_some_and(RpcError::is_connectivity);
                UNKNOWN.to_string()
            }
        };
        let quantity = match supply {
            Ok(data) => data.current_supply,
            Err(e) => {
                tracing::warn!(asset = %asset.id, error = %e, "dynamic data lookup failed");
                connectivity_failure |= e.as_rpc().is_some_and(RpcError::is_connectivity);
                UNKNOWN.to_string()
            }
        };

        if connectivity_failure {
            if let Err(e) = self.manager.report_failure(&lease).await {
                tracing::warn!(target_name = target, error = %e, "fail-over after partial result failed");
            }
        }

        Ok(DynamicData { issuer, quantity })
    }

    /// Balances of `account_id`, joined with asset metadata.
    ///
    /// Balances whose asset cannot be resolved are dropped.
    pub async fn fetch_user_balances(
        &self,
        target: &str,
        account_id: &str,
    ) -> Result<Vec<UserBalance>> {
        self.manager
            .with_failover(target, |lease| async move {
                let balances: Vec<AccountBalance> = lease
                    .call_as("get_account_balances", json!([account_id, []]))
                    .await?;

                let ids: Vec<String> = balances.iter().map(|b| b.asset_id.clone()).collect();
                let assets: HashMap<String, AssetRecord> =
                    lookup_asset_symbols(&lease, &ids, false)
                        .await?
                        .into_iter()
                        .map(|a| (a.id.clone(), a))
                        .collect();

                let joined: Vec<UserBalance> = balances
                    .into_iter()
                    .filter_map(|balance| {
                        let asset = assets.get(&balance.asset_id)?.clone();
                        Some(UserBalance::new(balance, asset))
                    })
                    .collect();
                Ok::<_, Error>(joined)
            })
            .await
    }

    /// Order book between `base` and `quote`, `limit` entries deep per side
    pub async fn fetch_order_book(
        &self,
        target: &str,
        base: &str,
        quote: &str,
        limit: u32,
    ) -> Result<OrderBook> {
        self.manager
            .with_failover(target, |lease| async move {
                lease
                    .call_as("get_order_book", json!([base, quote, limit]))
                    .await
            })
            .await
    }
}

/// Fetch one object and decode it; `None` id is reported as not found
async fn fetch_typed<T: DeserializeOwned>(lease: &Lease, id: Option<&str>) -> Result<T> {
    let id = id.ok_or_else(|| RpcError::NotFound("object id missing".to_string()))?;
    let objects: Vec<Value> = lease.call_as("get_objects", json!([[id]])).await?;
    let object = first_object(objects, id)?;
    serde_json::from_value(object).map_err(|e| RpcError::Decode(format!("{}: {}", id, e)).into())
}

fn first_object(objects: Vec<Value>, id: &str) -> Result<Value> {
    match objects.into_iter().next() {
        Some(Value::Null) => Err(RpcError::NotFound(id.to_string()).into()),
        Some(object) => Ok(object),
        None => Err(Error::Rpc(RpcError::Empty(format!("get_objects {}", id)))),
    }
}

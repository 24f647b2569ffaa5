//! Chain records returned by the query façade

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Placeholder for a value that could not be looked up
pub const UNKNOWN: &str = "???";

/// An asset as returned by `lookup_asset_symbols`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    pub symbol: String,
    pub precision: u8,
    pub issuer: String,
    #[serde(default)]
    pub options: AssetOptions,
    #[serde(default)]
    pub dynamic_asset_data_id: Option<String>,
    /// Fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetOptions {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub max_supply: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AssetRecord {
    /// Parsed NFT description, if the description is JSON
    pub fn nft_description(&self) -> Option<NftDescription> {
        NftDescription::parse(&self.options.description)
    }

    /// Whether the description carries an NFT marker
    pub fn is_nft(&self) -> bool {
        self.nft_description().is_some_and(|d| d.has_marker())
    }

    /// Symbol up to the first `.`, e.g. `NFTEA` for `NFTEA.GALLERY`
    pub fn split_symbol(&self) -> &str {
        self.symbol.split('.').next().unwrap_or(&self.symbol)
    }
}

/// JSON document stored in an NFT asset's description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NftDescription {
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub nft_object: Option<Value>,
}

impl NftDescription {
    /// `None` for an empty or non-JSON-object description
    pub fn parse(description: &str) -> Option<Self> {
        if description.trim().is_empty() {
            return None;
        }
        serde_json::from_str(description).ok()
    }

    pub fn has_marker(&self) -> bool {
        self.nft_object.as_ref().is_some_and(is_truthy)
    }
}

/// JSON truthiness: null, false, 0 and "" are false
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// One row of `get_account_balances`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub asset_id: String,
    #[serde(deserialize_with = "de::i64_from_string_or_number")]
    pub amount: i64,
}

/// A balance joined with its asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBalance {
    pub asset_id: String,
    /// Raw integer amount in the asset's smallest unit
    pub amount: i64,
    /// `amount` scaled down by the asset precision, truncated
    pub precise_amount: i64,
    pub split_symbol: String,
    pub asset: AssetRecord,
}

impl UserBalance {
    pub fn new(balance: AccountBalance, asset: AssetRecord) -> Self {
        Self {
            precise_amount: scale_amount(balance.amount, asset.precision),
            split_symbol: asset.split_symbol().to_string(),
            asset_id: balance.asset_id,
            amount: balance.amount,
            asset,
        }
    }
}

/// Integer-divide `amount` by `10^precision`; non-positive amounts give 0.
///
/// A precision too large for `i64` also gives 0, since every
/// representable amount would truncate to zero anyway.
pub fn scale_amount(amount: i64, precision: u8) -> i64 {
    if amount <= 0 {
        return 0;
    }
    match 10i64.checked_pow(u32::from(precision)) {
        Some(divisor) => amount / divisor,
        None => 0,
    }
}

/// Issuer name and current supply of an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicData {
    pub issuer: String,
    pub quantity: String,
}

/// The subset of an account object the façade reads
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountObject {
    pub id: String,
    pub name: String,
}

/// The subset of an asset dynamic data object the façade reads
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DynamicAssetData {
    pub id: String,
    #[serde(deserialize_with = "de::string_or_number")]
    pub current_supply: String,
}

/// One entry of `get_full_accounts`
#[derive(Debug, Clone, Deserialize)]
pub struct FullAccount {
    pub account: AccountObject,
    /// Ids of assets this account issued
    #[serde(default)]
    pub assets: Vec<String>,
}

/// Order book snapshot from `get_order_book`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub base: String,
    pub quote: String,
    #[serde(default)]
    pub bids: Vec<Order>,
    #[serde(default)]
    pub asks: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "de::string_or_number")]
    pub price: String,
    #[serde(deserialize_with = "de::string_or_number")]
    pub quote: String,
    #[serde(deserialize_with = "de::string_or_number")]
    pub base: String,
}

/// Graphene nodes send 64-bit integers as either JSON numbers or strings
mod de {
    use super::*;
    use serde::de::Error;

    pub fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }

    pub fn opt_string_or_number<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(D::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }

    pub fn i64_from_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| D::Error::custom(format!("{} is not an i64", n))),
            Value::String(s) => s.parse().map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected integer, got {}", other))),
        }
    }
}

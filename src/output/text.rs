//! Plain-text rendering

use super::EndpointReport;
use crate::types::{AssetRecord, DynamicData, OrderBook, UserBalance};
use serde_json::Value;
use std::io::{self, Write};

/// Human-readable rendering of a query result
pub trait Render {
    fn render(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl Render for [AssetRecord] {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.is_empty() {
            return writeln!(out, "No assets found.");
        }
        writeln!(out, "{:<12} {:<24} {:>9} {:<12} NFT", "ID", "SYMBOL", "PRECISION", "ISSUER")?;
        for asset in self {
            writeln!(
                out,
                "{:<12} {:<24} {:>9} {:<12} {}",
                asset.id,
                asset.symbol,
                asset.precision,
                asset.issuer,
                if asset.is_nft() { "yes" } else { "no" }
            )?;
        }
        Ok(())
    }
}

impl Render for [UserBalance] {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.is_empty() {
            return writeln!(out, "No balances found.");
        }
        writeln!(out, "{:<12} {:<24} {:>20} {:>20}", "ASSET", "SYMBOL", "AMOUNT", "RAW")?;
        for balance in self {
            writeln!(
                out,
                "{:<12} {:<24} {:>20} {:>20}",
                balance.asset_id, balance.asset.symbol, balance.precise_amount, balance.amount
            )?;
        }
        Ok(())
    }
}

impl Render for DynamicData {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Issuer:   {}", self.issuer)?;
        writeln!(out, "Quantity: {}", self.quantity)
    }
}

impl Render for OrderBook {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{} / {}", self.quote, self.base)?;
        for (side, orders) in [("ASKS", &self.asks), ("BIDS", &self.bids)] {
            writeln!(out, "\n{}", side)?;
            if orders.is_empty() {
                writeln!(out, "  (none)")?;
                continue;
            }
            writeln!(out, "  {:>18} {:>18} {:>18}", "PRICE", self.quote, self.base)?;
            for order in orders {
                writeln!(
                    out,
                    "  {:>18} {:>18} {:>18}",
                    order.price, order.quote, order.base
                )?;
            }
        }
        Ok(())
    }
}

impl Render for Value {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        let pretty = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        writeln!(out, "{}", pretty)
    }
}

impl Render for [EndpointReport] {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.is_empty() {
            return writeln!(out, "No endpoints.");
        }
        for (rank, ep) in self.iter().enumerate() {
            let latency = ep
                .latency_ms
                .map(|ms| format!("{}ms", ms))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "{:>3}. {:<45} {:>8} {}{}",
                rank + 1,
                ep.url,
                latency,
                match ep.alive {
                    Some(true) => "up",
                    Some(false) => "down",
                    None => "-",
                },
                if ep.active { "  (active)" } else { "" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::Endpoint;
    use crate::types::Order;
    use std::time::Duration;

    fn rendered<T: Render + ?Sized>(value: &T) -> String {
        let mut out = Vec::new();
        value.render(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_empty_lists() {
        assert_eq!(rendered::<[AssetRecord]>(&[]), "No assets found.\n");
        assert_eq!(rendered::<[UserBalance]>(&[]), "No balances found.\n");
    }

    #[test]
    fn test_render_order_book() {
        let book = OrderBook {
            base: "BTS".into(),
            quote: "ART".into(),
            bids: vec![Order {
                price: "10".into(),
                quote: "1".into(),
                base: "10".into(),
            }],
            asks: vec![],
        };
        let text = rendered(&book);
        assert!(text.starts_with("ART / BTS"));
        assert!(text.contains("(none)"));
        assert!(text.contains("BIDS"));
    }

    #[test]
    fn test_render_endpoints_marks_active() {
        let reports = vec![
            EndpointReport {
                url: "wss://b".into(),
                latency_ms: Some(50),
                alive: Some(true),
                active: true,
            },
            EndpointReport {
                url: "wss://a".into(),
                latency_ms: Some(200),
                alive: Some(false),
                active: false,
            },
            EndpointReport {
                url: "wss://c".into(),
                latency_ms: None,
                alive: None,
                active: false,
            },
        ];
        let text = rendered(reports.as_slice());
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].contains("50ms") && lines[0].ends_with("(active)"));
        assert!(lines[1].ends_with("down"));
        assert!(!lines[2].contains("down") && lines[2].ends_with('-'));
    }

    #[test]
    fn test_unprobed_endpoint_is_not_reported_down() {
        let report = EndpointReport::new(&Endpoint::candidate("wss://x"), None);
        assert_eq!(report.alive, None);

        let mut probed = Endpoint::reachable("wss://x", Duration::from_millis(5));
        let active = probed.clone();
        assert!(EndpointReport::new(&probed, Some(&active)).active);
        probed.mark_dead();
        assert_eq!(EndpointReport::new(&probed, None).alive, Some(false));
    }
}

//! Output formatting for query results

mod text;

pub use text::Render;

use crate::error::{Error, Result};
use crate::rpc::Endpoint;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(Error::Other(format!("Unknown output format: {}", s))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// One endpoint as shown by `nodes` commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointReport {
    pub url: String,
    pub latency_ms: Option<u128>,
    /// `None` until the endpoint has been probed
    pub alive: Option<bool>,
    pub active: bool,
}

impl EndpointReport {
    pub fn new(endpoint: &Endpoint, active: Option<&Endpoint>) -> Self {
        Self {
            url: endpoint.url.clone(),
            latency_ms: endpoint.latency_ms(),
            alive: endpoint.is_probed().then_some(endpoint.alive),
            active: active.is_some_and(|a| a.url == endpoint.url),
        }
    }
}

/// Write `value` in `format`
pub fn write_output<T, W>(format: OutputFormat, value: &T, out: &mut W) -> Result<()>
where
    T: Serialize + Render + ?Sized,
    W: Write,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputFormat::Text => value.render(out)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DynamicData;

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_write_json() {
        let data = DynamicData {
            issuer: "nftea".into(),
            quantity: "???".into(),
        };
        let mut out = Vec::new();
        write_output(OutputFormat::Json, &data, &mut out).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["issuer"], "nftea");
        assert_eq!(parsed["quantity"], "???");
    }
}

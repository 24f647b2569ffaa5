//! Endpoint state as seen by the prober and connection manager

use std::fmt;
use std::time::Duration;

/// One candidate node for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    /// Measured connect latency; `None` until probed
    pub latency: Option<Duration>,
    /// Last known liveness; meaningless until probed
    pub alive: bool,
}

impl Endpoint {
    /// A configured but not yet probed endpoint
    pub fn candidate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            latency: None,
            alive: false,
        }
    }

    /// An endpoint that answered a probe
    pub fn reachable(url: impl Into<String>, latency: Duration) -> Self {
        Self {
            url: url.into(),
            latency: Some(latency),
            alive: true,
        }
    }

    pub fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// Whether a probe has measured this endpoint
    pub fn is_probed(&self) -> bool {
        self.latency.is_some()
    }

    pub fn latency_ms(&self) -> Option<u128> {
        self.latency.map(|l| l.as_millis())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.latency_ms() {
            Some(ms) => write!(f, "{} ({}ms)", self.url, ms),
            None => f.write_str(&self.url),
        }
    }
}

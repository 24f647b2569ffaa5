//! Node endpoint management: probing, fail-over and the transport seam

mod defaults;
mod endpoint;
mod manager;
#[cfg(test)]
pub(crate) mod mock;
mod prober;
mod transport;
mod websocket;

pub use defaults::default_endpoints;
pub use endpoint::Endpoint;
pub use manager::{ConnectionManager, Lease};
pub use prober::{ConnectionTester, ProbeResult, Prober};
pub use transport::{Session, Transport};
pub use websocket::{WsSession, WsTransport};

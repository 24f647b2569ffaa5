//! Error types for btsnft

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// RPC-related errors
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The RPC error behind this error, if any
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            Error::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

/// RPC-specific errors
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("No candidate endpoints configured for target '{target}'")]
    NoCandidates { target: String },

    #[error("No reachable endpoint for target '{target}'")]
    NoReachableEndpoint { target: String },

    #[error("All known-good endpoints for target '{target}' have failed")]
    EndpointsExhausted { target: String },

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Remote error from node: {0}")]
    Remote(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Empty response: {0}")]
    Empty(String),

    #[error("Invalid response from node: {0}")]
    Decode(String),
}

impl RpcError {
    /// Whether this failure means the endpoint itself is unusable.
    ///
    /// Only these errors trigger a fail-over; everything else is an
    /// answer from a healthy node.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, RpcError::Transport(_) | RpcError::Timeout(_))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    InvalidFile(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Config file parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for transport-level calls
pub type RpcResult<T> = std::result::Result<T, RpcError>;

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

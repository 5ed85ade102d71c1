//! Definitions of errors that can occur when resolving network configuration

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur when looking up or validating a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// No network is configured under the given name
    UnknownNetwork(String),
    /// No network is configured with the given chain ID
    UnknownChainId(u64),
    /// The chain ID is outside of the valid range
    InvalidChainId(u64),
    /// A URL in the network configuration is malformed
    InvalidUrl(String),
    /// The RPC endpoint requires an API key that was not provided
    MissingApiKey(&'static str),
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::UnknownNetwork(name) => write!(f, "unknown network: {}", name),
            NetworkError::UnknownChainId(id) => write!(f, "unknown chain id: {}", id),
            NetworkError::InvalidChainId(id) => write!(f, "invalid chain id: {}", id),
            NetworkError::InvalidUrl(s) => write!(f, "invalid url: {}", s),
            NetworkError::MissingApiKey(var) => write!(f, "missing api key, set {}", var),
        }
    }
}

impl Error for NetworkError {}

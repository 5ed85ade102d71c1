//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use chains::NetworkError;

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// One or more required environment variables are unset or empty
    MissingEnvVars(Vec<String>),
    /// An environment variable does not hold a valid address
    InvalidAddress {
        /// The name of the environment variable
        var: String,
        /// The value that failed to parse
        value: String,
    },
    /// Error resolving the network configuration
    Network(NetworkError),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// The RPC node serves a different chain than the one configured
    ChainIdMismatch {
        /// The chain ID in the network configuration
        expected: u64,
        /// The chain ID reported by the RPC node
        actual: u64,
    },
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// Error verifying contract source code on a block explorer
    Verification(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::MissingEnvVars(vars) => {
                write!(f, "missing environment variables: {}", vars.join(", "))
            }
            ScriptError::InvalidAddress { var, value } => {
                write!(f, "invalid address in {}: {:?}", var, value)
            }
            ScriptError::Network(e) => write!(f, "error resolving network: {}", e),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ChainIdMismatch { expected, actual } => write!(
                f,
                "chain id mismatch: network is configured for {} but node reports {}",
                expected, actual
            ),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::Verification(s) => write!(f, "error verifying contract: {}", s),
        }
    }
}

impl Error for ScriptError {}

impl From<NetworkError> for ScriptError {
    fn from(e: NetworkError) -> Self {
        ScriptError::Network(e)
    }
}

//! Static configuration of the networks the Galxe contracts are deployed to.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod constants;
pub mod errors;
pub mod networks;

pub use errors::NetworkError;
pub use networks::{
    network_by_chain_id, network_by_name, Accounts, Explorer, NetworkConfig, RpcEndpoint,
    ZkSyncConfig, NETWORKS,
};

//! The table of networks the contracts can be deployed to

use std::fmt::{self, Display};

use serde::Serialize;
use url::Url;

use crate::{
    constants::{
        ETHERSCAN_API_KEY_ENV_VAR, ETHERSCAN_V2_API_URL, INFURA_API_KEY_ENV_VAR, INFURA_DOMAIN,
        LOCAL_NODE_RPC_URL, MAX_CHAIN_ID, SNOWTRACE_API_KEY_ENV_VAR,
    },
    errors::NetworkError,
};

/// Where the JSON-RPC endpoint of a network lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcEndpoint {
    /// A public endpoint that needs no credentials
    Public(&'static str),
    /// An Infura endpoint, the project key is appended to the URL
    Infura {
        /// The Infura subdomain of the network, e.g. `mainnet`
        subdomain: &'static str,
    },
}

/// The accounts available to sign transactions on a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accounts {
    /// The unlocked accounts of a local development node
    Local,
    /// The deployer key, read from `PRIVATE_KEY`
    Deployer,
}

/// zkSync-specific settings for a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZkSyncConfig {
    /// The name of the L1 network the rollup settles to
    pub eth_network: &'static str,
    /// The contract verification endpoint of the zkSync block explorer
    pub verify_url: &'static str,
}

/// An Etherscan-compatible block explorer API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Explorer {
    /// The URL of the explorer's API
    pub api_url: &'static str,
    /// The environment variable holding the explorer API key
    pub api_key_env: &'static str,
}

/// The deployment configuration of a single network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    /// The canonical name of the network
    pub name: &'static str,
    /// The EIP-155 chain ID of the network
    pub chain_id: u64,
    /// The JSON-RPC endpoint of the network
    pub rpc: RpcEndpoint,
    /// The accounts used to sign transactions
    pub accounts: Accounts,
    /// Set if the network is a zkSync rollup
    pub zksync: Option<ZkSyncConfig>,
    /// The block explorer used for source verification, if any
    pub explorer: Option<Explorer>,
}

impl NetworkConfig {
    /// Whether the network is a zkSync rollup
    pub fn is_zksync(&self) -> bool {
        self.zksync.is_some()
    }

    /// Whether the network is a local development node
    pub fn is_local(&self) -> bool {
        self.accounts == Accounts::Local
    }

    /// Resolve the RPC URL of the network.
    ///
    /// Infura endpoints require the project key, which is otherwise ignored.
    pub fn rpc_url(&self, infura_key: Option<&str>) -> Result<Url, NetworkError> {
        let url = match self.rpc {
            RpcEndpoint::Public(url) => url.to_string(),
            RpcEndpoint::Infura { subdomain } => {
                let key = infura_key
                    .filter(|k| !k.is_empty())
                    .ok_or(NetworkError::MissingApiKey(INFURA_API_KEY_ENV_VAR))?;
                format!("https://{subdomain}.{INFURA_DOMAIN}/{key}")
            }
        };

        parse_http_url(&url)
    }

    /// Check that the chain ID is in range and that every URL is well-formed
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.chain_id == 0 || self.chain_id > MAX_CHAIN_ID {
            return Err(NetworkError::InvalidChainId(self.chain_id));
        }

        // Infura URLs are checked with a placeholder key
        self.rpc_url(Some("key"))?;

        if let Some(zksync) = self.zksync {
            parse_http_url(zksync.verify_url)?;
        }
        if let Some(explorer) = self.explorer {
            parse_http_url(explorer.api_url)?;
        }

        Ok(())
    }
}

impl Display for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Parse a URL, requiring an http(s) scheme and a host
fn parse_http_url(url: &str) -> Result<Url, NetworkError> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(NetworkError::InvalidUrl(url.to_string()));
    }

    Ok(parsed)
}

/// Look up a network by its canonical name
pub fn network_by_name(name: &str) -> Result<&'static NetworkConfig, NetworkError> {
    NETWORKS
        .iter()
        .find(|n| n.name == name)
        .ok_or_else(|| NetworkError::UnknownNetwork(name.to_string()))
}

/// Look up a network by its chain ID
pub fn network_by_chain_id(chain_id: u64) -> Result<&'static NetworkConfig, NetworkError> {
    NETWORKS
        .iter()
        .find(|n| n.chain_id == chain_id)
        .ok_or(NetworkError::UnknownChainId(chain_id))
}

/// Shorthand for a network reachable through a public endpoint, signing with the deployer key
const fn public(name: &'static str, chain_id: u64, url: &'static str) -> NetworkConfig {
    NetworkConfig {
        name,
        chain_id,
        rpc: RpcEndpoint::Public(url),
        accounts: Accounts::Deployer,
        zksync: None,
        explorer: None,
    }
}

/// Shorthand for a network with an Etherscan-compatible explorer
const fn with_explorer(
    network: NetworkConfig,
    api_url: &'static str,
    api_key_env: &'static str,
) -> NetworkConfig {
    NetworkConfig {
        explorer: Some(Explorer {
            api_url,
            api_key_env,
        }),
        ..network
    }
}

/// Every network the contracts can be deployed to
pub static NETWORKS: &[NetworkConfig] = &[
    NetworkConfig {
        name: "hardhat",
        chain_id: 31337,
        rpc: RpcEndpoint::Public(LOCAL_NODE_RPC_URL),
        accounts: Accounts::Local,
        zksync: None,
        explorer: None,
    },
    with_explorer(
        public("avalanche", 43114, "https://api.avax.network/ext/bc/C/rpc"),
        "https://api.snowtrace.io/api",
        SNOWTRACE_API_KEY_ENV_VAR,
    ),
    with_explorer(
        public("bsc", 56, "https://bsc-dataseed1.binance.org"),
        ETHERSCAN_V2_API_URL,
        ETHERSCAN_API_KEY_ENV_VAR,
    ),
    with_explorer(
        public("bsc-testnet", 97, "https://rpc.ankr.com/bsc_testnet_chapel"),
        ETHERSCAN_V2_API_URL,
        ETHERSCAN_API_KEY_ENV_VAR,
    ),
    // Retired by Etherscan, verified through Sourcify
    public("goerli", 5, "https://rpc.ankr.com/eth_goerli"),
    NetworkConfig {
        name: "mainnet",
        chain_id: 1,
        rpc: RpcEndpoint::Infura { subdomain: "mainnet" },
        accounts: Accounts::Deployer,
        zksync: None,
        explorer: Some(Explorer {
            api_url: ETHERSCAN_V2_API_URL,
            api_key_env: ETHERSCAN_API_KEY_ENV_VAR,
        }),
    },
    with_explorer(
        public("polygon-mainnet", 137, "https://rpc-mainnet.maticvigil.com"),
        ETHERSCAN_V2_API_URL,
        ETHERSCAN_API_KEY_ENV_VAR,
    ),
    // Retired by Etherscan, verified through Sourcify
    public("polygon-mumbai", 80001, "https://rpc-mumbai.maticvigil.com"),
    NetworkConfig {
        name: "sepolia",
        chain_id: 11155111,
        rpc: RpcEndpoint::Infura { subdomain: "sepolia" },
        accounts: Accounts::Deployer,
        zksync: None,
        explorer: Some(Explorer {
            api_url: ETHERSCAN_V2_API_URL,
            api_key_env: ETHERSCAN_API_KEY_ENV_VAR,
        }),
    },
    // Verified through the zkSync explorer rather than Etherscan
    NetworkConfig {
        name: "zkSyncEra",
        chain_id: 324,
        rpc: RpcEndpoint::Public("https://mainnet.era.zksync.io"),
        accounts: Accounts::Deployer,
        zksync: Some(ZkSyncConfig {
            eth_network: "mainnet",
            verify_url: "https://zksync2-mainnet-explorer.zksync.io/contract_verification",
        }),
        explorer: None,
    },
    public("blast-testnet", 168587773, "https://sepolia.blast.io"),
    public("blast-mainnet", 81457, "https://rpc.blast.io"),
    public("shardeum-sphinx", 8082, "https://dev110.shardeum.org/"),
    public("kroma-sepolia", 2358, "https://api.sepolia.kroma.network/"),
    public("kroma-mainnet", 255, "https://api.kroma.network/"),
    public(
        "zeta-mainnet",
        7000,
        "https://zetachain-evm.blockpi.network/v1/rpc/public",
    ),
    public("cronos-mainnet", 25, "https://evm.cronos.org"),
    public("zircuit-testnet", 48899, "https://zircuit1.p2pify.com"),
    public(
        "zksync-era-sepolia",
        300,
        "https://rpc.ankr.com/zksync_era_sepolia",
    ),
];

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_all_networks_valid() {
        for network in NETWORKS {
            assert!(
                network.validate().is_ok(),
                "invalid network config: {}",
                network
            );
        }
    }

    #[test]
    fn test_names_and_chain_ids_unique() {
        assert!(NETWORKS.iter().map(|n| n.name).all_unique());
        assert!(NETWORKS.iter().map(|n| n.chain_id).all_unique());
    }

    #[test]
    fn test_lookup() {
        let zksync = network_by_name("zkSyncEra").unwrap();
        assert_eq!(zksync.chain_id, 324);
        assert!(zksync.is_zksync());
        assert_eq!(zksync.zksync.unwrap().eth_network, "mainnet");

        assert_eq!(network_by_chain_id(97).unwrap().name, "bsc-testnet");
        assert_eq!(network_by_chain_id(168587773).unwrap().name, "blast-testnet");

        assert_eq!(
            network_by_name("ropsten"),
            Err(NetworkError::UnknownNetwork("ropsten".to_string()))
        );
        assert_eq!(
            network_by_chain_id(3),
            Err(NetworkError::UnknownChainId(3))
        );
    }

    #[test]
    fn test_infura_requires_key() {
        let mainnet = network_by_name("mainnet").unwrap();
        assert_eq!(
            mainnet.rpc_url(None),
            Err(NetworkError::MissingApiKey(INFURA_API_KEY_ENV_VAR))
        );
        assert_eq!(
            mainnet.rpc_url(Some("")),
            Err(NetworkError::MissingApiKey(INFURA_API_KEY_ENV_VAR))
        );

        let url = mainnet.rpc_url(Some("abc123")).unwrap();
        assert_eq!(url.as_str(), "https://mainnet.infura.io/v3/abc123");

        // Public endpoints ignore the key
        let bsc = network_by_name("bsc").unwrap();
        assert_eq!(
            bsc.rpc_url(Some("abc123")).unwrap().as_str(),
            "https://bsc-dataseed1.binance.org/"
        );
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let base = *network_by_name("bsc").unwrap();

        let zero_id = NetworkConfig {
            chain_id: 0,
            ..base
        };
        assert_eq!(zero_id.validate(), Err(NetworkError::InvalidChainId(0)));

        let huge_id = NetworkConfig {
            chain_id: MAX_CHAIN_ID + 1,
            ..base
        };
        assert_eq!(
            huge_id.validate(),
            Err(NetworkError::InvalidChainId(MAX_CHAIN_ID + 1))
        );

        let bad_url = NetworkConfig {
            rpc: RpcEndpoint::Public("bsc-dataseed1.binance.org"),
            ..base
        };
        assert!(matches!(
            bad_url.validate(),
            Err(NetworkError::InvalidUrl(_))
        ));

        let bad_scheme = NetworkConfig {
            rpc: RpcEndpoint::Public("ftp://bsc-dataseed1.binance.org"),
            ..base
        };
        assert!(matches!(
            bad_scheme.validate(),
            Err(NetworkError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_explorers() {
        for name in ["mainnet", "sepolia", "bsc", "bsc-testnet", "polygon-mainnet"] {
            let explorer = network_by_name(name).unwrap().explorer.unwrap();
            assert_eq!(explorer.api_url, ETHERSCAN_V2_API_URL);
            assert_eq!(explorer.api_key_env, ETHERSCAN_API_KEY_ENV_VAR);
        }

        let avalanche = network_by_name("avalanche").unwrap().explorer.unwrap();
        assert_eq!(avalanche.api_key_env, SNOWTRACE_API_KEY_ENV_VAR);

        // zkSync networks verify through their own explorer
        assert!(NETWORKS
            .iter()
            .filter(|n| n.is_zksync())
            .all(|n| n.explorer.is_none()));
        assert!(network_by_name("goerli").unwrap().explorer.is_none());
    }

    #[test]
    fn test_serialize_network() {
        let json = serde_json::to_value(network_by_name("zkSyncEra").unwrap()).unwrap();
        assert_eq!(json["chain_id"], 324);
        assert_eq!(json["rpc"]["public"], "https://mainnet.era.zksync.io");
        assert_eq!(json["zksync"]["eth_network"], "mainnet");
    }
}

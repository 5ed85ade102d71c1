//! Constants used in the network configuration

/// The largest chain ID that can be safely used by wallets and tooling.
///
/// This is the bound specified in EIP-2294 (`2^52 - 20`), which keeps chain IDs
/// within the integer precision of JSON numbers.
pub const MAX_CHAIN_ID: u64 = 4_503_599_627_370_476;

/// The name of the default network, a local development node
pub const DEFAULT_NETWORK: &str = "hardhat";

/// The RPC URL of a local development node
pub const LOCAL_NODE_RPC_URL: &str = "http://127.0.0.1:8545";

/// The environment variable holding the Infura project key
pub const INFURA_API_KEY_ENV_VAR: &str = "INFURA_API_KEY";

/// The domain under which Infura serves its RPC endpoints
pub const INFURA_DOMAIN: &str = "infura.io/v3";

/// The environment variable holding the Etherscan API key
pub const ETHERSCAN_API_KEY_ENV_VAR: &str = "ETHERSCAN_API_KEY";

/// The environment variable holding the Snowtrace API key
pub const SNOWTRACE_API_KEY_ENV_VAR: &str = "SNOWTRACE_API_KEY";

/// The Etherscan V2 API, serving every Etherscan-family explorer by `chainid`
pub const ETHERSCAN_V2_API_URL: &str = "https://api.etherscan.io/v2/api";

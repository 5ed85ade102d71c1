//! Constants used in the deploy scripts

use alloy_primitives::{address, Address};

// -------------------------
// | Environment variables |
// -------------------------

/// The environment variable holding the deployer's private key
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// The environment variable holding the Galxe signer address
pub const GALAXY_SIGNER_ENV_VAR: &str = "GALAXY_SIGNER";

/// The environment variable holding the campaign setter address
pub const CAMPAIGN_SETTER_ENV_VAR: &str = "CAMPAIGN_SETTER";

/// The environment variable holding the contract owner address
pub const CONTRACT_OWNER_ENV_VAR: &str = "CONTRACT_OWNER";

/// The environment variable holding the treasure manager address
pub const TREASURE_MANAGER_ENV_VAR: &str = "TREASURE_MANAGER";

/// The environment variable holding the `SpaceBalance` owner address
pub const SPACE_BALANCE_OWNER_ENV_VAR: &str = "SPACE_BALANCE_OWNER";

/// The environment variable holding the `SpaceBalance` treasurer address
pub const SPACE_BALANCE_TREASURER_ENV_VAR: &str = "SPACE_BALANCE_TREASURER";

/// The private key of the first account of a local Hardhat or Anvil node,
/// used when no deployer key is configured for a local network
pub const LOCAL_NODE_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

// -------------
// | Contracts |
// -------------

/// The name of the `SpaceStationV2` contract artifact
pub const SPACE_STATION_CONTRACT: &str = "SpaceStationV2";

/// The name of the V3 star NFT factory contract artifact
pub const STAR_NFT_FACTORY_V3_CONTRACT: &str = "StarNFTV3NaiveFactory";

/// The name of the V4 star NFT factory contract artifact
pub const STAR_NFT_FACTORY_V4_CONTRACT: &str = "StarNFTV4NaiveFactory";

/// The name of the `SpaceBalance` contract artifact
pub const SPACE_BALANCE_CONTRACT: &str = "SpaceBalance";

/// The base URI from which star NFT metadata is served
pub const STAR_NFT_METADATA_URI: &str = "https://graphigo.prd.galaxy.eco/metadata/";

// -------------
// | Artifacts |
// -------------

/// The default directory holding the Hardhat compilation artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The extension of an artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The suffix of the debug file pointing an artifact to its build info
pub const DEBUG_ARTIFACT_SUFFIX: &str = ".dbg.json";

/// The directory of the build info files, which carry no contract artifacts
pub const BUILD_INFO_DIR: &str = "build-info";

/// The prefix of an unresolved library link placeholder in bytecode
pub const LINK_PLACEHOLDER_PREFIX: &str = "__$";

// --------------
// | Deployment |
// --------------

/// The address of the deterministic deployment proxy.
///
/// The proxy forwards `salt ++ init_code` to `CREATE2`, see
/// https://github.com/Arachnid/deterministic-deployment-proxy
pub const DETERMINISTIC_DEPLOYMENT_PROXY: Address =
    address!("4e59b44847b379578588920ca78fbf26c0b4956c");

// ----------------
// | Verification |
// ----------------

/// The Sourcify server, verifying contracts on networks without an
/// Etherscan-compatible explorer
pub const SOURCIFY_API_URL: &str = "https://sourcify.dev/server";

/// The code format of a standard JSON compiler input
pub const STANDARD_JSON_CODE_FORMAT: &str = "solidity-standard-json-input";

/// The interval between verification status checks, in seconds
pub const VERIFICATION_POLL_INTERVAL_SECS: u64 = 5;

/// The number of verification status checks before giving up
pub const MAX_VERIFICATION_POLLS: usize = 24;

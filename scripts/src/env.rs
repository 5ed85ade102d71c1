//! Reading and validating the environment variables consumed by the deploy scripts

use std::{collections::HashMap, str::FromStr};

use alloy_primitives::Address;
use chains::Accounts;

use crate::{
    constants::{
        CAMPAIGN_SETTER_ENV_VAR, CONTRACT_OWNER_ENV_VAR, GALAXY_SIGNER_ENV_VAR,
        LOCAL_NODE_PRIVATE_KEY, PRIVATE_KEY_ENV_VAR, SPACE_BALANCE_OWNER_ENV_VAR,
        SPACE_BALANCE_TREASURER_ENV_VAR, TREASURE_MANAGER_ENV_VAR,
    },
    errors::ScriptError,
};

/// A source of environment variables
pub trait EnvSource {
    /// Get the value of a variable, if it is set
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Read the given variables, returning their values in order.
///
/// Fails with every unset or empty variable if any are missing.
pub fn require_vars(source: &impl EnvSource, keys: &[&str]) -> Result<Vec<String>, ScriptError> {
    let mut values = Vec::with_capacity(keys.len());
    let mut missing = Vec::new();
    for key in keys {
        match source.var(key).filter(|v| !v.is_empty()) {
            Some(value) => values.push(value),
            None => missing.push(key.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(ScriptError::MissingEnvVars(missing));
    }

    Ok(values)
}

/// Read an optional variable, treating an empty value as unset
pub fn optional_var(source: &impl EnvSource, key: &str) -> Option<String> {
    source.var(key).filter(|v| !v.is_empty())
}

/// Parse the value of an address-valued variable
fn parse_address(var: &str, value: &str) -> Result<Address, ScriptError> {
    Address::from_str(value.trim()).map_err(|_| ScriptError::InvalidAddress {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Parse the value of an address-valued variable that must not be the zero address
fn parse_nonzero_address(var: &str, value: &str) -> Result<Address, ScriptError> {
    let address = parse_address(var, value)?;
    if address.is_zero() {
        return Err(ScriptError::InvalidAddress {
            var: var.to_string(),
            value: value.to_string(),
        });
    }

    Ok(address)
}

/// Validate the deployer key together with the contract parameters.
///
/// The deployer key is only required when the network signs with it; local
/// nodes fall back to their first unlocked account. Returns the deployer
/// config and the parameter values in the order of `keys`.
fn require_with_deployer(
    source: &impl EnvSource,
    accounts: Accounts,
    keys: &[&str],
) -> Result<(DeployerEnv, Vec<String>), ScriptError> {
    let mut all_keys = keys.to_vec();
    if accounts == Accounts::Deployer {
        all_keys.insert(0, PRIVATE_KEY_ENV_VAR);
    }

    let mut values = require_vars(source, &all_keys)?;
    let private_key = match accounts {
        Accounts::Deployer => values.remove(0),
        Accounts::Local => optional_var(source, PRIVATE_KEY_ENV_VAR)
            .unwrap_or_else(|| LOCAL_NODE_PRIVATE_KEY.to_string()),
    };

    Ok((DeployerEnv { private_key }, values))
}

/// The deployer credentials
#[derive(Clone)]
pub struct DeployerEnv {
    /// The hex-encoded private key of the deployer
    pub private_key: String,
}

impl DeployerEnv {
    /// Read the deployer credentials for a network with the given accounts
    pub fn from_env(source: &impl EnvSource, accounts: Accounts) -> Result<Self, ScriptError> {
        require_with_deployer(source, accounts, &[]).map(|(deployer, _)| deployer)
    }
}

/// The environment consumed when deploying `SpaceStationV2`
#[derive(Clone)]
pub struct SpaceStationEnv {
    /// The deployer credentials
    pub deployer: DeployerEnv,
    /// The address whose signatures authorize campaign claims
    pub galaxy_signer: Address,
    /// The address allowed to configure campaigns
    pub campaign_setter: Address,
    /// The owner of the contract
    pub contract_owner: Address,
    /// The address receiving campaign fees
    pub treasure_manager: Address,
}

impl SpaceStationEnv {
    /// The variables consumed, besides the deployer key
    pub const VARS: [&'static str; 4] = [
        GALAXY_SIGNER_ENV_VAR,
        CAMPAIGN_SETTER_ENV_VAR,
        CONTRACT_OWNER_ENV_VAR,
        TREASURE_MANAGER_ENV_VAR,
    ];

    /// Read and validate the environment
    pub fn from_env(source: &impl EnvSource, accounts: Accounts) -> Result<Self, ScriptError> {
        let (deployer, values) = require_with_deployer(source, accounts, &Self::VARS)?;

        Ok(Self {
            deployer,
            galaxy_signer: parse_address(GALAXY_SIGNER_ENV_VAR, &values[0])?,
            campaign_setter: parse_address(CAMPAIGN_SETTER_ENV_VAR, &values[1])?,
            contract_owner: parse_address(CONTRACT_OWNER_ENV_VAR, &values[2])?,
            treasure_manager: parse_address(TREASURE_MANAGER_ENV_VAR, &values[3])?,
        })
    }
}

/// The environment consumed when deploying a star NFT factory
#[derive(Clone)]
pub struct StarNftFactoryEnv {
    /// The deployer credentials
    pub deployer: DeployerEnv,
    /// The owner of the factory
    pub contract_owner: Address,
    /// The address receiving minting fees
    pub treasure_manager: Address,
}

impl StarNftFactoryEnv {
    /// The variables consumed, besides the deployer key
    pub const VARS: [&'static str; 2] = [CONTRACT_OWNER_ENV_VAR, TREASURE_MANAGER_ENV_VAR];

    /// Read and validate the environment
    pub fn from_env(source: &impl EnvSource, accounts: Accounts) -> Result<Self, ScriptError> {
        let (deployer, values) = require_with_deployer(source, accounts, &Self::VARS)?;

        Ok(Self {
            deployer,
            contract_owner: parse_address(CONTRACT_OWNER_ENV_VAR, &values[0])?,
            treasure_manager: parse_address(TREASURE_MANAGER_ENV_VAR, &values[1])?,
        })
    }
}

/// The environment consumed when deploying `SpaceBalance`
#[derive(Clone)]
pub struct SpaceBalanceEnv {
    /// The deployer credentials
    pub deployer: DeployerEnv,
    /// The owner set when initializing the contract
    pub owner: Address,
    /// The treasurer set when initializing the contract
    pub treasurer: Address,
}

impl SpaceBalanceEnv {
    /// The variables consumed, besides the deployer key
    pub const VARS: [&'static str; 2] = [
        SPACE_BALANCE_OWNER_ENV_VAR,
        SPACE_BALANCE_TREASURER_ENV_VAR,
    ];

    /// Read and validate the environment.
    ///
    /// The owner and treasurer may not be the zero address.
    pub fn from_env(source: &impl EnvSource, accounts: Accounts) -> Result<Self, ScriptError> {
        let (deployer, values) = require_with_deployer(source, accounts, &Self::VARS)?;

        Ok(Self {
            deployer,
            owner: parse_nonzero_address(SPACE_BALANCE_OWNER_ENV_VAR, &values[0])?,
            treasurer: parse_nonzero_address(SPACE_BALANCE_TREASURER_ENV_VAR, &values[1])?,
        })
    }
}

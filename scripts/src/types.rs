//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy_primitives::Address;
use alloy_sol_types::SolValue;
use clap::ValueEnum;

use crate::constants::{
    SPACE_BALANCE_CONTRACT, SPACE_STATION_CONTRACT, STAR_NFT_FACTORY_V3_CONTRACT,
    STAR_NFT_FACTORY_V4_CONTRACT, STAR_NFT_METADATA_URI,
};

/// The contracts the scripts can deploy
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeployableContract {
    /// The `SpaceStationV2` campaign contract
    SpaceStation,
    /// A star NFT factory contract
    StarNftFactory,
    /// The `SpaceBalance` contract
    SpaceBalance,
}

impl Display for DeployableContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployableContract::SpaceStation => write!(f, "space-station"),
            DeployableContract::StarNftFactory => write!(f, "star-nft-factory"),
            DeployableContract::SpaceBalance => write!(f, "space-balance"),
        }
    }
}

/// The versions of the star NFT factory
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum StarNftFactoryVersion {
    /// `StarNFTV3NaiveFactory`
    V3,
    /// `StarNFTV4NaiveFactory`
    V4,
}

impl StarNftFactoryVersion {
    /// The version deployed when none is requested.
    ///
    /// zkSync networks only carry the V4 factory.
    pub fn default_for(zksync: bool) -> Self {
        if zksync {
            StarNftFactoryVersion::V4
        } else {
            StarNftFactoryVersion::V3
        }
    }

    /// The name of the contract artifact
    pub fn contract_name(&self) -> &'static str {
        match self {
            StarNftFactoryVersion::V3 => STAR_NFT_FACTORY_V3_CONTRACT,
            StarNftFactoryVersion::V4 => STAR_NFT_FACTORY_V4_CONTRACT,
        }
    }
}

/// Arguments to a contract constructor
pub trait ConstructorArgs {
    /// The name of the contract artifact
    fn contract_name(&self) -> &'static str;

    /// The number of constructor parameters
    fn num_args(&self) -> usize;

    /// ABI-encode the arguments as constructor parameters
    fn abi_encode(&self) -> Vec<u8>;
}

/// Constructor arguments of `SpaceStationV2`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpaceStationArgs {
    /// The address whose signatures authorize campaign claims
    pub galaxy_signer: Address,
    /// The address allowed to configure campaigns
    pub campaign_setter: Address,
    /// The owner of the contract
    pub contract_owner: Address,
    /// The address receiving campaign fees
    pub treasure_manager: Address,
}

impl ConstructorArgs for SpaceStationArgs {
    fn contract_name(&self) -> &'static str {
        SPACE_STATION_CONTRACT
    }

    fn num_args(&self) -> usize {
        4
    }

    fn abi_encode(&self) -> Vec<u8> {
        (
            self.galaxy_signer,
            self.campaign_setter,
            self.contract_owner,
            self.treasure_manager,
        )
            .abi_encode_params()
    }
}

/// Constructor arguments of the star NFT factories
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StarNftFactoryArgs {
    /// The factory version to deploy
    pub version: StarNftFactoryVersion,
    /// The owner of the factory
    pub contract_owner: Address,
    /// The address receiving minting fees
    pub treasure_manager: Address,
    /// The base URI of the NFT metadata
    pub metadata_uri: String,
}

impl StarNftFactoryArgs {
    /// Build the arguments with the Galxe metadata URI
    pub fn new(
        version: StarNftFactoryVersion,
        contract_owner: Address,
        treasure_manager: Address,
    ) -> Self {
        Self {
            version,
            contract_owner,
            treasure_manager,
            metadata_uri: STAR_NFT_METADATA_URI.to_string(),
        }
    }
}

impl ConstructorArgs for StarNftFactoryArgs {
    fn contract_name(&self) -> &'static str {
        self.version.contract_name()
    }

    fn num_args(&self) -> usize {
        3
    }

    fn abi_encode(&self) -> Vec<u8> {
        (
            self.contract_owner,
            self.treasure_manager,
            self.metadata_uri.clone(),
        )
            .abi_encode_params()
    }
}

/// Constructor arguments of `SpaceBalance`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpaceBalanceArgs {
    /// The initial owner, the deployer, which hands over ownership on initialization
    pub deployer: Address,
}

impl ConstructorArgs for SpaceBalanceArgs {
    fn contract_name(&self) -> &'static str {
        SPACE_BALANCE_CONTRACT
    }

    fn num_args(&self) -> usize {
        1
    }

    fn abi_encode(&self) -> Vec<u8> {
        (self.deployer,).abi_encode_params()
    }
}

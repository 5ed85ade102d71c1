//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use alloy_primitives::Address;
use chains::{constants::DEFAULT_NETWORK, network_by_name, NetworkConfig};
use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{
        deploy_space_balance, deploy_space_station, deploy_star_nft_factory, list_networks,
        verify_contract,
    },
    constants::DEFAULT_ARTIFACTS_DIR,
    env::{DeployerEnv, EnvSource, SpaceBalanceEnv, SpaceStationEnv, StarNftFactoryEnv},
    errors::ScriptError,
    types::{DeployableContract, StarNftFactoryVersion},
    utils::{DeployContext, DeployOptions},
};

/// Deploy the Galxe contracts to any supported network
#[derive(Parser)]
#[command(name = "deploy")]
pub struct Cli {
    /// Name of the network to deploy to
    #[arg(short, long, env = "NETWORK", default_value = DEFAULT_NETWORK, value_parser = network_by_name)]
    pub network: &'static NetworkConfig,

    /// Network RPC URL, overriding the one configured for the network
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Directory holding the Hardhat compilation artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// File in which to record deployed addresses
    #[arg(short, long)]
    pub deployments_path: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Run the selected command against the selected network
    pub async fn run(self, env: &impl EnvSource) -> Result<(), ScriptError> {
        let opts = DeployOptions {
            network: self.network,
            rpc_url: self.rpc_url,
            artifacts_dir: self.artifacts_dir,
            deployments_path: self.deployments_path,
        };
        self.command.run(&opts, env).await
    }
}

/// The deploy scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy `SpaceStationV2`
    DeploySpaceStation,
    /// Deploy a star NFT factory
    DeployStarNftFactory(DeployStarNftFactoryArgs),
    /// Deploy `SpaceBalance` at its deterministic address
    DeploySpaceBalance(DeploySpaceBalanceArgs),
    /// Verify the source code of a deployed contract
    Verify(VerifyArgs),
    /// List the supported networks
    Networks,
}

impl Command {
    /// Run the command.
    ///
    /// The environment is validated before connecting to the network.
    pub async fn run(self, opts: &DeployOptions, env: &impl EnvSource) -> Result<(), ScriptError> {
        let accounts = opts.network.accounts;
        match self {
            Command::DeploySpaceStation => {
                let config = SpaceStationEnv::from_env(env, accounts)?;
                let ctx = DeployContext::connect(opts, &config.deployer, env).await?;
                deploy_space_station(&ctx, &config).await.map(|_| ())
            }
            Command::DeployStarNftFactory(args) => {
                let config = StarNftFactoryEnv::from_env(env, accounts)?;
                let ctx = DeployContext::connect(opts, &config.deployer, env).await?;
                deploy_star_nft_factory(&ctx, &config, args.factory_version)
                    .await
                    .map(|_| ())
            }
            Command::DeploySpaceBalance(args) => {
                let config = SpaceBalanceEnv::from_env(env, accounts)?;
                let ctx = DeployContext::connect(opts, &config.deployer, env).await?;
                deploy_space_balance(&ctx, &config, args.skip_initialize)
                    .await
                    .map(|_| ())
            }
            Command::Verify(args) => {
                let deployer = DeployerEnv::from_env(env, accounts)?;
                let ctx = DeployContext::connect(opts, &deployer, env).await?;
                verify_contract(&ctx, &args, env).await
            }
            Command::Networks => {
                list_networks();
                Ok(())
            }
        }
    }
}

/// Deploy a star NFT factory
#[derive(Args)]
pub struct DeployStarNftFactoryArgs {
    /// The factory version, defaults to v4 on zkSync networks and v3 elsewhere
    #[arg(long, value_enum)]
    pub factory_version: Option<StarNftFactoryVersion>,
}

/// Deploy `SpaceBalance` at its deterministic address
#[derive(Args)]
pub struct DeploySpaceBalanceArgs {
    /// Leave the contract uninitialized after deploying it
    #[arg(long)]
    pub skip_initialize: bool,
}

/// Verify the source code of a deployed contract
#[derive(Args)]
pub struct VerifyArgs {
    /// The contract to verify
    #[arg(short, long, value_enum)]
    pub contract: DeployableContract,

    /// The address of the contract, read from the deployments file if unset
    #[arg(short, long)]
    pub address: Option<Address>,

    /// The star NFT factory version, see `deploy-star-nft-factory`
    #[arg(long, value_enum)]
    pub factory_version: Option<StarNftFactoryVersion>,

    /// The zksolc version the contract was compiled with, on zkSync networks
    #[arg(long)]
    pub zksolc_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["deploy", "deploy-space-station"]).unwrap();

        assert_eq!(cli.network.name, "hardhat");
        assert_eq!(cli.artifacts_dir, PathBuf::from("artifacts"));
        assert!(cli.deployments_path.is_none());
        assert!(matches!(cli.command, Command::DeploySpaceStation));
    }

    #[test]
    fn test_parse_network_and_factory_version() {
        let cli = Cli::try_parse_from([
            "deploy",
            "--network",
            "zkSyncEra",
            "--deployments-path",
            "deployments.json",
            "deploy-star-nft-factory",
            "--factory-version",
            "v3",
        ])
        .unwrap();

        assert_eq!(cli.network.chain_id, 324);
        assert_eq!(
            cli.deployments_path,
            Some(PathBuf::from("deployments.json"))
        );
        match cli.command {
            Command::DeployStarNftFactory(args) => {
                assert_eq!(args.factory_version, Some(StarNftFactoryVersion::V3))
            }
            _ => panic!("expected deploy-star-nft-factory"),
        }
    }

    #[test]
    fn test_parse_unknown_network() {
        let result = Cli::try_parse_from(["deploy", "--network", "ropsten", "networks"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_verify() {
        let cli = Cli::try_parse_from([
            "deploy",
            "-n",
            "bsc",
            "verify",
            "--contract",
            "space-balance",
            "--address",
            "0x1212121212121212121212121212121212121212",
        ])
        .unwrap();

        match cli.command {
            Command::Verify(args) => {
                assert_eq!(args.contract, DeployableContract::SpaceBalance);
                assert_eq!(args.address, Some(Address::repeat_byte(0x12)));
                assert!(args.zksolc_version.is_none());
            }
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn test_parse_skip_initialize() {
        let cli =
            Cli::try_parse_from(["deploy", "deploy-space-balance", "--skip-initialize"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::DeploySpaceBalance(DeploySpaceBalanceArgs {
                skip_initialize: true
            })
        ));
    }
}

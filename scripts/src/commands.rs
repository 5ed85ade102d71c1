//! Implementations of the various deploy scripts

use alloy_primitives::{keccak256, Address};
use alloy_sol_types::SolCall;
use chains::{NetworkConfig, RpcEndpoint, NETWORKS};
use tracing::{info, warn};

use crate::{
    cli::VerifyArgs,
    constants::SPACE_BALANCE_CONTRACT,
    env::{EnvSource, SpaceBalanceEnv, SpaceStationEnv, StarNftFactoryEnv},
    errors::ScriptError,
    solidity::initializeCall,
    types::{
        ConstructorArgs, DeployableContract, SpaceBalanceArgs, SpaceStationArgs,
        StarNftFactoryArgs, StarNftFactoryVersion,
    },
    utils::{deploy_contract, deploy_deterministic, send_call, DeployContext},
    verify::{VerificationRequest, Verifier},
};

/// Deploy the contract described by the given constructor arguments,
/// logging and recording its address
async fn deploy_with_args(
    ctx: &DeployContext,
    args: &impl ConstructorArgs,
) -> Result<Address, ScriptError> {
    let contract_name = args.contract_name();
    let artifact = ctx.load_artifact(contract_name)?;
    let code = artifact.deploy_code(args)?;

    info!("Deploying {} to {}", contract_name, ctx.network);
    let address = deploy_contract(&ctx.provider, code).await?;
    info!("{} deployed to: {:#x}", contract_name, address);

    ctx.record_deployment(contract_name, address)?;
    Ok(address)
}

/// Deploy `SpaceStationV2`
pub async fn deploy_space_station(
    ctx: &DeployContext,
    env: &SpaceStationEnv,
) -> Result<Address, ScriptError> {
    info!("galaxy signer: {:#x}", env.galaxy_signer);
    info!("campaign setter: {:#x}", env.campaign_setter);
    info!("contract owner: {:#x}", env.contract_owner);
    info!("treasure manager: {:#x}", env.treasure_manager);

    let args = SpaceStationArgs {
        galaxy_signer: env.galaxy_signer,
        campaign_setter: env.campaign_setter,
        contract_owner: env.contract_owner,
        treasure_manager: env.treasure_manager,
    };
    deploy_with_args(ctx, &args).await
}

/// Deploy a star NFT factory.
///
/// If no version is given, the default version of the network is deployed.
pub async fn deploy_star_nft_factory(
    ctx: &DeployContext,
    env: &StarNftFactoryEnv,
    version: Option<StarNftFactoryVersion>,
) -> Result<Address, ScriptError> {
    let version = version.unwrap_or(StarNftFactoryVersion::default_for(ctx.network.is_zksync()));
    info!("contract owner: {:#x}", env.contract_owner);
    info!("treasure manager: {:#x}", env.treasure_manager);

    let args = StarNftFactoryArgs::new(version, env.contract_owner, env.treasure_manager);
    deploy_with_args(ctx, &args).await
}

/// Deploy `SpaceBalance` through the deterministic deployment proxy, then
/// hand it over to its owner and treasurer.
///
/// `initialize` is sent even if the contract already existed, and a revert is
/// returned as an error.
pub async fn deploy_space_balance(
    ctx: &DeployContext,
    env: &SpaceBalanceEnv,
    skip_initialize: bool,
) -> Result<Address, ScriptError> {
    info!("owner: {:#x}", env.owner);
    info!("treasurer: {:#x}", env.treasurer);

    let args = SpaceBalanceArgs {
        deployer: ctx.deployer,
    };
    let artifact = ctx.load_artifact(args.contract_name())?;
    let code = artifact.deploy_code(&args)?;

    let salt = keccak256(SPACE_BALANCE_CONTRACT.as_bytes());
    let (address, deployed) = deploy_deterministic(&ctx.provider, salt, code).await?;
    info!("{} deployed to: {:#x}", SPACE_BALANCE_CONTRACT, address);
    ctx.record_deployment(SPACE_BALANCE_CONTRACT, address)?;

    if skip_initialize {
        return Ok(address);
    }
    if !deployed {
        // A previous run may have deployed without initializing
        warn!("{} already existed, initializing it anyway", SPACE_BALANCE_CONTRACT);
    }

    let calldata = initializeCall {
        owner: env.owner,
        treasurer: env.treasurer,
    }
    .abi_encode();
    let receipt = send_call(&ctx.provider, address, calldata).await?;
    info!("initialize tx: {:#x}", receipt.transaction_hash);

    Ok(address)
}

/// The constructor arguments a contract was deployed with, rebuilt from the environment
pub fn verification_args(
    contract: DeployableContract,
    version: Option<StarNftFactoryVersion>,
    network: &NetworkConfig,
    deployer: Address,
    env: &impl EnvSource,
) -> Result<Box<dyn ConstructorArgs>, ScriptError> {
    let args: Box<dyn ConstructorArgs> = match contract {
        DeployableContract::SpaceStation => {
            let env = SpaceStationEnv::from_env(env, network.accounts)?;
            Box::new(SpaceStationArgs {
                galaxy_signer: env.galaxy_signer,
                campaign_setter: env.campaign_setter,
                contract_owner: env.contract_owner,
                treasure_manager: env.treasure_manager,
            })
        }
        DeployableContract::StarNftFactory => {
            let env = StarNftFactoryEnv::from_env(env, network.accounts)?;
            let version =
                version.unwrap_or(StarNftFactoryVersion::default_for(network.is_zksync()));
            Box::new(StarNftFactoryArgs::new(
                version,
                env.contract_owner,
                env.treasure_manager,
            ))
        }
        DeployableContract::SpaceBalance => Box::new(SpaceBalanceArgs { deployer }),
    };

    Ok(args)
}

/// Verify the source code of a deployed contract on the network's block explorer
pub async fn verify_contract(
    ctx: &DeployContext,
    args: &VerifyArgs,
    env: &impl EnvSource,
) -> Result<(), ScriptError> {
    let verifier = Verifier::for_network(ctx.network, env)?;
    let constructor_args = verification_args(
        args.contract,
        args.factory_version,
        ctx.network,
        ctx.deployer,
        env,
    )?;

    let contract_name = constructor_args.contract_name();
    let address = match args.address {
        Some(address) => address,
        None => ctx.recorded_deployment(contract_name)?,
    };
    let artifact = ctx.load_artifact(contract_name)?;

    let request = VerificationRequest::new(
        address,
        &artifact,
        constructor_args.abi_encode(),
        args.zksolc_version.clone(),
    )?;
    info!("Verifying {} at {:#x} on {}", request.contract_name, address, ctx.network);
    verifier.verify(&request).await
}

/// A short description of where a network's RPC endpoint lives
fn describe_rpc(network: &NetworkConfig) -> String {
    match network.rpc {
        RpcEndpoint::Public(url) => url.to_string(),
        RpcEndpoint::Infura { subdomain } => format!("infura ({})", subdomain),
    }
}

/// Log the table of supported networks
pub fn list_networks() {
    for network in NETWORKS.iter() {
        let mut notes = Vec::new();
        if network.is_local() {
            notes.push("local");
        }
        if network.is_zksync() {
            notes.push("zksync");
        }
        if network.explorer.is_some() {
            notes.push("etherscan");
        } else if !network.is_local() && !network.is_zksync() {
            notes.push("sourcify");
        }

        info!(
            "{:<20} {:>10}  {} {}",
            network.name,
            network.chain_id,
            describe_rpc(network),
            notes.join(",")
        );
    }
}

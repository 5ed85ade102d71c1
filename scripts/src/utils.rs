//! Utilities for the deploy scripts.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    network::TransactionBuilder,
    primitives::utils::format_ether,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes, B256};
use chains::{constants::INFURA_API_KEY_ENV_VAR, NetworkConfig};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    artifacts::ContractArtifact,
    constants::DETERMINISTIC_DEPLOYMENT_PROXY,
    env::{optional_var, DeployerEnv, EnvSource},
    errors::ScriptError,
};

// ----------
// | Client |
// ----------

/// Sets up the client with which to send transactions, signing with the given private key.
///
/// Returns the client and the address of the signer.
pub fn setup_client(priv_key: &str, rpc_url: Url) -> Result<(DynProvider, Address), ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let address = signer.address();

    let provider = ProviderBuilder::new().wallet(signer).connect_http(rpc_url);
    Ok((DynProvider::new(provider), address))
}

/// Resolve the RPC URL to use for a network, preferring an explicit override
pub fn resolve_rpc_url(
    network: &NetworkConfig,
    rpc_override: Option<&str>,
    env: &impl EnvSource,
) -> Result<Url, ScriptError> {
    match rpc_override {
        Some(url) => Url::parse(url).map_err(|e| ScriptError::ClientInitialization(e.to_string())),
        None => {
            let infura_key = optional_var(env, INFURA_API_KEY_ENV_VAR);
            Ok(network.rpc_url(infura_key.as_deref())?)
        }
    }
}

/// Options shared by every command that talks to a network
#[derive(Clone, Debug)]
pub struct DeployOptions {
    /// The network to deploy to
    pub network: &'static NetworkConfig,
    /// An RPC URL overriding the one in the network configuration
    pub rpc_url: Option<String>,
    /// The directory holding the compilation artifacts
    pub artifacts_dir: PathBuf,
    /// The file in which to record deployed addresses, if any
    pub deployments_path: Option<PathBuf>,
}

/// Everything a deploy script needs, constructed once per run
pub struct DeployContext {
    /// The network being deployed to
    pub network: &'static NetworkConfig,
    /// The client used to send transactions
    pub provider: DynProvider,
    /// The address of the deployer
    pub deployer: Address,
    /// The directory holding the compilation artifacts
    pub artifacts_dir: PathBuf,
    /// The file in which to record deployed addresses, if any
    pub deployments_path: Option<PathBuf>,
}

impl DeployContext {
    /// Connect to the network, checking that the node serves the configured chain
    pub async fn connect(
        opts: &DeployOptions,
        deployer: &DeployerEnv,
        env: &impl EnvSource,
    ) -> Result<Self, ScriptError> {
        let network = opts.network;
        let rpc_url = resolve_rpc_url(network, opts.rpc_url.as_deref(), env)?;
        info!("Connecting to {} (chain id {})", network, network.chain_id);

        let (provider, deployer_address) = setup_client(&deployer.private_key, rpc_url)?;
        Self::from_provider(opts, provider, deployer_address).await
    }

    /// Build the context over an existing client, checking that it serves the
    /// configured chain
    pub async fn from_provider(
        opts: &DeployOptions,
        provider: DynProvider,
        deployer: Address,
    ) -> Result<Self, ScriptError> {
        let network = opts.network;
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        if chain_id != network.chain_id {
            return Err(ScriptError::ChainIdMismatch {
                expected: network.chain_id,
                actual: chain_id,
            });
        }

        let ctx = Self {
            network,
            provider,
            deployer,
            artifacts_dir: opts.artifacts_dir.clone(),
            deployments_path: opts.deployments_path.clone(),
        };
        ctx.log_deployer_balance().await?;

        Ok(ctx)
    }

    /// Log the address and balance of the deployer
    pub async fn log_deployer_balance(&self) -> Result<(), ScriptError> {
        let balance = self
            .provider
            .get_balance(self.deployer)
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        info!(
            "Deployer: {:#x} Balance: {} ({} wei)",
            self.deployer,
            format_ether(balance),
            balance
        );
        if balance.is_zero() {
            warn!("Deployer has no funds on {}", self.network);
        }

        Ok(())
    }

    /// Load the artifact of the named contract
    pub fn load_artifact(&self, contract_name: &str) -> Result<ContractArtifact, ScriptError> {
        ContractArtifact::load(&self.artifacts_dir, contract_name)
    }

    /// Record a deployed address in the deployments file, if one is configured
    pub fn record_deployment(&self, contract_name: &str, address: Address) -> Result<(), ScriptError> {
        if let Some(path) = &self.deployments_path {
            write_deployed_address(path, self.network.name, contract_name, address)?;
            info!("Recorded {} in {}", contract_name, path.display());
        }

        Ok(())
    }

    /// The address of a previously recorded deployment
    pub fn recorded_deployment(&self, contract_name: &str) -> Result<Address, ScriptError> {
        let path = self.deployments_path.as_ref().ok_or_else(|| {
            ScriptError::ReadDeployments("no deployments file configured".to_string())
        })?;
        read_deployment(path, self.network.name, contract_name)
    }
}

// ----------------
// | Transactions |
// ----------------

/// Send a transaction and wait for it to be included successfully.
///
/// Failures are reported through the given error constructor.
async fn send_tx(
    provider: &DynProvider,
    tx: TransactionRequest,
    err: fn(String) -> ScriptError,
) -> Result<TransactionReceipt, ScriptError> {
    let pending = provider
        .send_transaction(tx)
        .await
        .map_err(|e| err(e.to_string()))?;
    info!("Sent transaction {:#x}", pending.tx_hash());

    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| err(e.to_string()))?;
    check_receipt(receipt, err)
}

/// Fail if the transaction of the receipt reverted
fn check_receipt(
    receipt: TransactionReceipt,
    err: fn(String) -> ScriptError,
) -> Result<TransactionReceipt, ScriptError> {
    if !receipt.status() {
        return Err(err(format!(
            "transaction {:#x} reverted",
            receipt.transaction_hash
        )));
    }

    info!("Gas used: {}", receipt.gas_used);
    Ok(receipt)
}

/// Deploy a contract with the given init code, returning its address
pub async fn deploy_contract(provider: &DynProvider, code: Bytes) -> Result<Address, ScriptError> {
    let tx = TransactionRequest::default().with_deploy_code(code);
    let receipt = send_tx(provider, tx, ScriptError::ContractDeployment).await?;

    receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment("receipt carries no contract address".to_string())
    })
}

/// Call a contract method, returning the receipt of the transaction
pub async fn send_call(
    provider: &DynProvider,
    to: Address,
    calldata: Vec<u8>,
) -> Result<TransactionReceipt, ScriptError> {
    let tx = TransactionRequest::default()
        .with_to(to)
        .with_input(calldata);
    send_tx(provider, tx, ScriptError::ContractInteraction).await
}

/// The address at which the deterministic deployment proxy creates a contract
pub fn deterministic_address(salt: B256, init_code: &[u8]) -> Address {
    DETERMINISTIC_DEPLOYMENT_PROXY.create2_from_code(salt.0, init_code)
}

/// Deploy a contract through the deterministic deployment proxy.
///
/// Returns the address of the contract and whether it was deployed by this call,
/// which is not the case if code already exists at the address.
pub async fn deploy_deterministic(
    provider: &DynProvider,
    salt: B256,
    init_code: Bytes,
) -> Result<(Address, bool), ScriptError> {
    let proxy_code = provider
        .get_code_at(DETERMINISTIC_DEPLOYMENT_PROXY)
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
    if proxy_code.is_empty() {
        return Err(ScriptError::ContractDeployment(format!(
            "deterministic deployment proxy not found at {:#x}",
            DETERMINISTIC_DEPLOYMENT_PROXY
        )));
    }

    let address = deterministic_address(salt, &init_code);
    if has_code(provider, address).await? {
        info!("Reusing existing deployment at {:#x}", address);
        return Ok((address, false));
    }

    // The proxy expects the salt followed by the init code
    let calldata = [salt.as_slice(), &init_code[..]].concat();
    let tx = TransactionRequest::default()
        .with_to(DETERMINISTIC_DEPLOYMENT_PROXY)
        .with_input(calldata);
    send_tx(provider, tx, ScriptError::ContractDeployment).await?;

    if !has_code(provider, address).await? {
        return Err(ScriptError::ContractDeployment(format!(
            "no code at expected address {:#x}",
            address
        )));
    }

    Ok((address, true))
}

/// Whether there is contract code at the given address
async fn has_code(provider: &DynProvider, address: Address) -> Result<bool, ScriptError> {
    let code = provider
        .get_code_at(address)
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
    Ok(!code.is_empty())
}

// ---------------
// | Deployments |
// ---------------

/// Read the deployments file, starting from an empty object if it does not exist
fn read_deployments_file(path: &Path) -> Result<Value, ScriptError> {
    if !path.exists() {
        return Ok(json!({}));
    }

    let contents =
        fs::read_to_string(path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
    let parsed: Value =
        serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
    if !parsed.is_object() {
        return Err(ScriptError::ReadDeployments(
            "deployments file is not a JSON object".to_string(),
        ));
    }

    Ok(parsed)
}

/// Record the address of a contract deployed on a network.
///
/// The file maps network names to objects mapping contract names to addresses.
pub fn write_deployed_address(
    path: &Path,
    network: &str,
    contract_name: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut deployments = read_deployments_file(path)?;
    if deployments.get(network).is_some_and(|v| !v.is_object()) {
        return Err(ScriptError::WriteDeployments(format!(
            "entry for {} is not a JSON object",
            network
        )));
    }

    deployments[network][contract_name] = Value::String(format!("{address:#x}"));

    let contents = serde_json::to_string_pretty(&deployments)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

/// Read the address of a contract deployed on a network
pub fn read_deployment(
    path: &Path,
    network: &str,
    contract_name: &str,
) -> Result<Address, ScriptError> {
    let deployments = read_deployments_file(path)?;
    let addr_str = deployments
        .get(network)
        .and_then(|n| n.get(contract_name))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ScriptError::ReadDeployments(format!(
                "no deployment of {} on {} in {}",
                contract_name,
                network,
                path.display()
            ))
        })?;

    Address::from_str(addr_str).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

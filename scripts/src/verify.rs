//! Source code verification on block explorers
//!
//! Etherscan-compatible explorers, the zkSync explorer and Sourcify all accept
//! a verification request and process it asynchronously, so each request is
//! followed by polling until the verifier reports a final status. Networks
//! without an Etherscan-compatible explorer are verified on Sourcify.

use std::{collections::BTreeMap, time::Duration};

use alloy_primitives::{hex, Address};
use chains::NetworkConfig;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::sleep;
use tracing::info;

use crate::{
    artifacts::{BuildInfo, ContractArtifact},
    constants::{
        MAX_VERIFICATION_POLLS, SOURCIFY_API_URL, STANDARD_JSON_CODE_FORMAT,
        VERIFICATION_POLL_INTERVAL_SECS,
    },
    env::{require_vars, EnvSource},
    errors::ScriptError,
};

/// A contract to verify
#[derive(Clone, Debug)]
pub struct VerificationRequest {
    /// The address of the deployed contract
    pub address: Address,
    /// The fully qualified name of the contract, `<source>:<contract>`
    pub contract_name: String,
    /// The compiler run that produced the deployed bytecode
    pub build_info: BuildInfo,
    /// The ABI-encoded constructor arguments
    pub constructor_args: Vec<u8>,
    /// The zksolc version, for zkSync contracts compiled with it
    pub zksolc_version: Option<String>,
}

impl VerificationRequest {
    /// Build a request for a contract deployed from the given artifact
    pub fn new(
        address: Address,
        artifact: &ContractArtifact,
        constructor_args: Vec<u8>,
        zksolc_version: Option<String>,
    ) -> Result<Self, ScriptError> {
        Ok(Self {
            address,
            contract_name: artifact.qualified_name(),
            build_info: artifact.build_info()?,
            constructor_args,
            zksolc_version,
        })
    }
}

/// The status of a verification request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    /// The explorer has not finished processing the request
    Pending,
    /// The contract is verified
    Verified,
    /// The explorer rejected the request
    Failed(String),
}

/// A block explorer that verifies contract sources
#[derive(Clone, Debug)]
pub enum Verifier {
    /// An Etherscan-compatible explorer API
    Etherscan {
        /// The URL of the explorer API
        api_url: String,
        /// The explorer API key
        api_key: String,
        /// The chain the contract lives on
        chain_id: u64,
    },
    /// The zkSync explorer verification endpoint
    ZkSync {
        /// The URL of the verification endpoint
        verify_url: String,
    },
    /// The Sourcify verification server
    Sourcify {
        /// The URL of the Sourcify server
        api_url: String,
        /// The chain the contract lives on
        chain_id: u64,
    },
}

impl Verifier {
    /// The verifier of the given network
    pub fn for_network(network: &NetworkConfig, env: &impl EnvSource) -> Result<Self, ScriptError> {
        if let Some(zksync) = network.zksync {
            return Ok(Verifier::ZkSync {
                verify_url: zksync.verify_url.to_string(),
            });
        }

        if network.is_local() {
            return Err(ScriptError::Verification(format!(
                "contracts on {} cannot be verified",
                network
            )));
        }

        let Some(explorer) = network.explorer else {
            return Ok(Verifier::Sourcify {
                api_url: SOURCIFY_API_URL.to_string(),
                chain_id: network.chain_id,
            });
        };
        let mut api_key = require_vars(env, &[explorer.api_key_env])?;

        Ok(Verifier::Etherscan {
            api_url: explorer.api_url.to_string(),
            api_key: api_key.remove(0),
            chain_id: network.chain_id,
        })
    }

    /// Submit the request and wait for the explorer to process it
    pub async fn verify(&self, request: &VerificationRequest) -> Result<(), ScriptError> {
        let client = reqwest::Client::new();
        match self {
            Verifier::Etherscan {
                api_url,
                api_key,
                chain_id,
            } => verify_etherscan(&client, api_url, api_key, *chain_id, request).await,
            Verifier::ZkSync { verify_url } => verify_zksync(&client, verify_url, request).await,
            Verifier::Sourcify { api_url, chain_id } => {
                verify_sourcify(&client, api_url, *chain_id, request).await
            }
        }
    }
}

// -------------
// | Etherscan |
// -------------

/// A response of an Etherscan-compatible API
#[derive(Clone, Debug, Deserialize)]
pub struct EtherscanResponse {
    /// `"1"` on success, `"0"` otherwise
    pub status: String,
    /// A short description of the status
    pub message: String,
    /// The payload, or an error message
    pub result: String,
}

/// Whether an explorer message reports that the contract is already verified
fn is_already_verified(message: &str) -> bool {
    message.to_lowercase().contains("already verified")
}

/// The form parameters of an Etherscan `verifysourcecode` request
pub fn etherscan_verify_params(
    request: &VerificationRequest,
    api_key: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("apikey", api_key.to_string()),
        ("module", "contract".to_string()),
        ("action", "verifysourcecode".to_string()),
        ("contractaddress", format!("{:#x}", request.address)),
        ("sourceCode", request.build_info.input.to_string()),
        ("codeformat", STANDARD_JSON_CODE_FORMAT.to_string()),
        ("contractname", request.contract_name.clone()),
        (
            "compilerversion",
            format!("v{}", request.build_info.solc_long_version),
        ),
        // The misspelling is part of the Etherscan API
        ("constructorArguements", hex::encode(&request.constructor_args)),
    ]
}

/// The query parameters of an Etherscan `checkverifystatus` request
pub fn etherscan_status_query(
    api_key: &str,
    guid: &str,
    chain_id: u64,
) -> Vec<(&'static str, String)> {
    vec![
        ("chainid", chain_id.to_string()),
        ("apikey", api_key.to_string()),
        ("module", "contract".to_string()),
        ("action", "checkverifystatus".to_string()),
        ("guid", guid.to_string()),
    ]
}

/// Interpret the response to an Etherscan `checkverifystatus` request
pub fn etherscan_status(response: &EtherscanResponse) -> VerificationStatus {
    if response.result == "Pending in queue" {
        VerificationStatus::Pending
    } else if response.status == "1" || is_already_verified(&response.result) {
        VerificationStatus::Verified
    } else {
        VerificationStatus::Failed(response.result.clone())
    }
}

/// Send a request to an Etherscan-compatible API
async fn etherscan_request(
    request: reqwest::RequestBuilder,
) -> Result<EtherscanResponse, ScriptError> {
    request
        .send()
        .await
        .map_err(|e| ScriptError::Verification(e.to_string()))?
        .json()
        .await
        .map_err(|e| ScriptError::Verification(e.to_string()))
}

/// Verify a contract on an Etherscan-compatible explorer
async fn verify_etherscan(
    client: &reqwest::Client,
    api_url: &str,
    api_key: &str,
    chain_id: u64,
    request: &VerificationRequest,
) -> Result<(), ScriptError> {
    // The V2 API reads the chain from the query string
    let chain = [("chainid", chain_id.to_string())];
    let params = etherscan_verify_params(request, api_key);
    let submitted =
        etherscan_request(client.post(api_url).query(&chain).form(&params)).await?;

    if submitted.status != "1" {
        if is_already_verified(&submitted.result) {
            info!("{} is already verified", request.contract_name);
            return Ok(());
        }
        return Err(ScriptError::Verification(submitted.result));
    }

    let guid = submitted.result;
    info!("Submitted verification of {}, guid {}", request.contract_name, guid);

    let query = etherscan_status_query(api_key, &guid, chain_id);
    for _ in 0..MAX_VERIFICATION_POLLS {
        sleep(Duration::from_secs(VERIFICATION_POLL_INTERVAL_SECS)).await;

        let response = etherscan_request(client.get(api_url).query(&query)).await?;
        match etherscan_status(&response) {
            VerificationStatus::Pending => continue,
            VerificationStatus::Verified => {
                info!("Verified {} at {:#x}", request.contract_name, request.address);
                return Ok(());
            }
            VerificationStatus::Failed(reason) => return Err(ScriptError::Verification(reason)),
        }
    }

    Err(ScriptError::Verification(
        "timed out waiting for verification".to_string(),
    ))
}

// ----------
// | zkSync |
// ----------

/// The body of a zkSync explorer verification request
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkSyncVerifyBody {
    /// The address of the deployed contract
    pub contract_address: String,
    /// The standard JSON compiler input
    pub source_code: Value,
    /// The format of `source_code`
    pub code_format: &'static str,
    /// The fully qualified name of the contract
    pub contract_name: String,
    /// The solc version
    pub compiler_solc_version: String,
    /// The zksolc version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_zksolc_version: Option<String>,
    /// Whether the optimizer was enabled
    pub optimization_used: bool,
    /// The hex-encoded constructor arguments
    pub constructor_arguments: String,
}

impl From<&VerificationRequest> for ZkSyncVerifyBody {
    fn from(request: &VerificationRequest) -> Self {
        Self {
            contract_address: format!("{:#x}", request.address),
            source_code: request.build_info.input.clone(),
            code_format: STANDARD_JSON_CODE_FORMAT,
            contract_name: request.contract_name.clone(),
            compiler_solc_version: request.build_info.solc_version.clone(),
            compiler_zksolc_version: request.zksolc_version.clone(),
            optimization_used: request.build_info.optimization_used(),
            constructor_arguments: hex::encode_prefixed(&request.constructor_args),
        }
    }
}

/// The status of a zkSync verification request
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkSyncStatusResponse {
    /// One of `queued`, `in_progress`, `successful` or `failed`
    pub status: String,
    /// The reason of a failure
    pub error: Option<String>,
    /// Compiler errors of a failed compilation
    #[serde(default)]
    pub compilation_errors: Vec<String>,
}

/// Interpret the response to a zkSync verification status request
pub fn zksync_status(response: &ZkSyncStatusResponse) -> VerificationStatus {
    match response.status.as_str() {
        "successful" => VerificationStatus::Verified,
        "queued" | "in_progress" => VerificationStatus::Pending,
        other => {
            let mut reason = response.error.clone().unwrap_or_else(|| other.to_string());
            if !response.compilation_errors.is_empty() {
                reason = format!("{}: {}", reason, response.compilation_errors.join("; "));
            }
            VerificationStatus::Failed(reason)
        }
    }
}

/// Verify a contract on the zkSync explorer
async fn verify_zksync(
    client: &reqwest::Client,
    verify_url: &str,
    request: &VerificationRequest,
) -> Result<(), ScriptError> {
    let body = ZkSyncVerifyBody::from(request);
    let response = client
        .post(verify_url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ScriptError::Verification(e.to_string()))?;
    if !response.status().is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ScriptError::Verification(text));
    }

    let id: u64 = response
        .json()
        .await
        .map_err(|e| ScriptError::Verification(e.to_string()))?;
    info!("Submitted verification of {}, id {}", request.contract_name, id);

    let status_url = format!("{}/{}", verify_url.trim_end_matches('/'), id);
    for _ in 0..MAX_VERIFICATION_POLLS {
        sleep(Duration::from_secs(VERIFICATION_POLL_INTERVAL_SECS)).await;

        let response: ZkSyncStatusResponse = client
            .get(&status_url)
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?
            .json()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;
        match zksync_status(&response) {
            VerificationStatus::Pending => continue,
            VerificationStatus::Verified => {
                info!("Verified {} at {:#x}", request.contract_name, request.address);
                return Ok(());
            }
            VerificationStatus::Failed(reason) => return Err(ScriptError::Verification(reason)),
        }
    }

    Err(ScriptError::Verification(
        "timed out waiting for verification".to_string(),
    ))
}

// ------------
// | Sourcify |
// ------------

/// The body of a Sourcify metadata verification request
#[derive(Clone, Debug, Serialize)]
pub struct SourcifyVerifyBody {
    /// The contents of the compiled source files, by path
    pub sources: BTreeMap<String, String>,
    /// The compiler metadata of the contract
    pub metadata: Value,
}

impl SourcifyVerifyBody {
    /// Build the body from the compiler run of the request
    pub fn from_request(request: &VerificationRequest) -> Result<Self, ScriptError> {
        let (source_name, contract_name) =
            request.contract_name.rsplit_once(':').ok_or_else(|| {
                ScriptError::Verification(format!(
                    "{} is not a fully qualified name",
                    request.contract_name
                ))
            })?;

        let metadata = request
            .build_info
            .contract_metadata(source_name, contract_name)
            .ok_or_else(|| {
                ScriptError::Verification(format!(
                    "no compiler metadata for {} in the build info",
                    request.contract_name
                ))
            })?;
        let metadata =
            serde_json::from_str(metadata).map_err(|e| ScriptError::Verification(e.to_string()))?;

        Ok(Self {
            sources: request.build_info.sources(),
            metadata,
        })
    }
}

/// The response to a submitted Sourcify request
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourcifySubmitted {
    /// The ID of the verification job
    verification_id: String,
}

/// An error reported by Sourcify
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcifyError {
    /// A machine-readable error code
    #[serde(default)]
    pub custom_code: String,
    /// A description of the error
    pub message: String,
}

/// The verification state of a contract on Sourcify
#[derive(Clone, Debug, Deserialize)]
pub struct SourcifyContract {
    /// `exact_match` or `match` once verified
    #[serde(rename = "match")]
    pub match_status: Option<String>,
}

/// The status of a Sourcify verification job
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcifyJobResponse {
    /// Whether Sourcify has finished processing the job
    pub is_job_completed: bool,
    /// The contract, once processed
    pub contract: Option<SourcifyContract>,
    /// The reason of a failure
    pub error: Option<SourcifyError>,
}

/// Interpret the status of a Sourcify verification job
pub fn sourcify_status(response: &SourcifyJobResponse) -> VerificationStatus {
    if !response.is_job_completed {
        return VerificationStatus::Pending;
    }

    let matched = response
        .contract
        .as_ref()
        .and_then(|c| c.match_status.as_ref())
        .is_some();
    if matched {
        return VerificationStatus::Verified;
    }

    let reason = response
        .error
        .as_ref()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| "bytecode does not match".to_string());
    VerificationStatus::Failed(reason)
}

/// Verify a contract on Sourcify
async fn verify_sourcify(
    client: &reqwest::Client,
    api_url: &str,
    chain_id: u64,
    request: &VerificationRequest,
) -> Result<(), ScriptError> {
    let api_url = api_url.trim_end_matches('/');
    let body = SourcifyVerifyBody::from_request(request)?;
    let submit_url = format!(
        "{}/v2/verify/metadata/{}/{:#x}",
        api_url, chain_id, request.address
    );

    let response = client
        .post(&submit_url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ScriptError::Verification(e.to_string()))?;
    if response.status() == StatusCode::CONFLICT {
        info!("{} is already verified", request.contract_name);
        return Ok(());
    }
    if !response.status().is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ScriptError::Verification(text));
    }

    let submitted: SourcifySubmitted = response
        .json()
        .await
        .map_err(|e| ScriptError::Verification(e.to_string()))?;
    info!(
        "Submitted verification of {}, id {}",
        request.contract_name, submitted.verification_id
    );

    let status_url = format!("{}/v2/verify/{}", api_url, submitted.verification_id);
    for _ in 0..MAX_VERIFICATION_POLLS {
        sleep(Duration::from_secs(VERIFICATION_POLL_INTERVAL_SECS)).await;

        let response: SourcifyJobResponse = client
            .get(&status_url)
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?
            .json()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;
        match sourcify_status(&response) {
            VerificationStatus::Pending => continue,
            VerificationStatus::Verified => {
                info!("Verified {} at {:#x}", request.contract_name, request.address);
                return Ok(());
            }
            VerificationStatus::Failed(reason) => return Err(ScriptError::Verification(reason)),
        }
    }

    Err(ScriptError::Verification(
        "timed out waiting for verification".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chains::network_by_name;
    use serde_json::json;

    use super::*;

    /// A request for a contract with a single address argument
    fn request() -> VerificationRequest {
        VerificationRequest {
            address: Address::repeat_byte(0x12),
            contract_name: "contracts/SpaceBalance.sol:SpaceBalance".to_string(),
            build_info: BuildInfo {
                solc_version: "0.8.19".to_string(),
                solc_long_version: "0.8.19+commit.7dd6d404".to_string(),
                input: json!({
                    "sources": {
                        "contracts/SpaceBalance.sol": { "content": "contract SpaceBalance {}" }
                    },
                    "settings": { "optimizer": { "enabled": true, "runs": 800 } }
                }),
                output: json!({
                    "contracts": {
                        "contracts/SpaceBalance.sol": {
                            "SpaceBalance": { "metadata": "{\"version\":1}" }
                        }
                    }
                }),
            },
            constructor_args: vec![0xab, 0xcd],
            zksolc_version: None,
        }
    }

    /// An Etherscan response
    fn etherscan(status: &str, result: &str) -> EtherscanResponse {
        EtherscanResponse {
            status: status.to_string(),
            message: String::new(),
            result: result.to_string(),
        }
    }

    #[test]
    fn test_etherscan_params() {
        let params: HashMap<_, _> = etherscan_verify_params(&request(), "key")
            .into_iter()
            .collect();

        assert_eq!(params["apikey"], "key");
        assert_eq!(params["action"], "verifysourcecode");
        assert_eq!(
            params["contractaddress"],
            "0x1212121212121212121212121212121212121212"
        );
        assert_eq!(params["compilerversion"], "v0.8.19+commit.7dd6d404");
        assert_eq!(params["constructorArguements"], "abcd");
        assert_eq!(
            params["contractname"],
            "contracts/SpaceBalance.sol:SpaceBalance"
        );

        let source: Value = serde_json::from_str(&params["sourceCode"]).unwrap();
        assert_eq!(source["settings"]["optimizer"]["runs"], 800);
    }

    #[test]
    fn test_etherscan_status_query() {
        let query: HashMap<_, _> = etherscan_status_query("key", "guid-1", 56)
            .into_iter()
            .collect();
        assert_eq!(query["chainid"], "56");
        assert_eq!(query["action"], "checkverifystatus");
        assert_eq!(query["guid"], "guid-1");
    }

    #[test]
    fn test_etherscan_status() {
        assert_eq!(
            etherscan_status(&etherscan("0", "Pending in queue")),
            VerificationStatus::Pending
        );
        assert_eq!(
            etherscan_status(&etherscan("1", "Pass - Verified")),
            VerificationStatus::Verified
        );
        assert_eq!(
            etherscan_status(&etherscan("0", "Already Verified")),
            VerificationStatus::Verified
        );
        assert_eq!(
            etherscan_status(&etherscan("0", "Fail - Unable to verify")),
            VerificationStatus::Failed("Fail - Unable to verify".to_string())
        );
    }

    #[test]
    fn test_zksync_body() {
        let mut req = request();
        let body = serde_json::to_value(ZkSyncVerifyBody::from(&req)).unwrap();
        assert_eq!(body["codeFormat"], "solidity-standard-json-input");
        assert_eq!(body["compilerSolcVersion"], "0.8.19");
        assert_eq!(body["constructorArguments"], "0xabcd");
        assert_eq!(body["optimizationUsed"], true);
        assert!(body.get("compilerZksolcVersion").is_none());

        req.zksolc_version = Some("v1.3.13".to_string());
        let body = serde_json::to_value(ZkSyncVerifyBody::from(&req)).unwrap();
        assert_eq!(body["compilerZksolcVersion"], "v1.3.13");
    }

    #[test]
    fn test_zksync_status() {
        let parse = |v: Value| serde_json::from_value::<ZkSyncStatusResponse>(v).unwrap();

        assert_eq!(
            zksync_status(&parse(json!({ "status": "in_progress" }))),
            VerificationStatus::Pending
        );
        assert_eq!(
            zksync_status(&parse(json!({ "status": "successful" }))),
            VerificationStatus::Verified
        );
        assert_eq!(
            zksync_status(&parse(json!({
                "status": "failed",
                "error": "compilation failed",
                "compilationErrors": ["bad pragma"]
            }))),
            VerificationStatus::Failed("compilation failed: bad pragma".to_string())
        );
    }

    #[test]
    fn test_sourcify_body() {
        let body = serde_json::to_value(SourcifyVerifyBody::from_request(&request()).unwrap())
            .unwrap();
        assert_eq!(body["metadata"]["version"], 1);
        assert_eq!(
            body["sources"]["contracts/SpaceBalance.sol"],
            "contract SpaceBalance {}"
        );

        // The metadata is looked up by the qualified name
        let mut req = request();
        req.contract_name = "contracts/SpaceBalance.sol:Other".to_string();
        assert!(matches!(
            SourcifyVerifyBody::from_request(&req),
            Err(ScriptError::Verification(_))
        ));
    }

    #[test]
    fn test_sourcify_status() {
        let parse = |v: Value| serde_json::from_value::<SourcifyJobResponse>(v).unwrap();

        assert_eq!(
            sourcify_status(&parse(json!({ "isJobCompleted": false }))),
            VerificationStatus::Pending
        );
        assert_eq!(
            sourcify_status(&parse(json!({
                "isJobCompleted": true,
                "contract": { "match": "exact_match", "chainId": "255" }
            }))),
            VerificationStatus::Verified
        );
        assert_eq!(
            sourcify_status(&parse(json!({
                "isJobCompleted": true,
                "contract": { "match": null },
                "error": { "customCode": "no_match", "message": "bytecode mismatch" }
            }))),
            VerificationStatus::Failed("bytecode mismatch".to_string())
        );
    }

    #[test]
    fn test_verifier_for_network() {
        let empty: HashMap<String, String> = HashMap::new();

        let zksync = Verifier::for_network(network_by_name("zkSyncEra").unwrap(), &empty).unwrap();
        assert!(matches!(zksync, Verifier::ZkSync { .. }));

        match Verifier::for_network(network_by_name("bsc").unwrap(), &empty) {
            Err(ScriptError::MissingEnvVars(vars)) => assert_eq!(vars, vec!["ETHERSCAN_API_KEY"]),
            _ => panic!("expected the api key to be required"),
        }

        let env: HashMap<String, String> =
            [("ETHERSCAN_API_KEY".to_string(), "k".to_string())].into();
        match Verifier::for_network(network_by_name("bsc").unwrap(), &env).unwrap() {
            Verifier::Etherscan {
                api_url,
                api_key,
                chain_id,
            } => {
                assert_eq!(api_url, "https://api.etherscan.io/v2/api");
                assert_eq!(api_key, "k");
                assert_eq!(chain_id, 56);
            }
            _ => panic!("expected an etherscan verifier"),
        }

        // Networks without an explorer fall back to Sourcify
        match Verifier::for_network(network_by_name("kroma-mainnet").unwrap(), &empty).unwrap() {
            Verifier::Sourcify { api_url, chain_id } => {
                assert_eq!(api_url, "https://sourcify.dev/server");
                assert_eq!(chain_id, 255);
            }
            _ => panic!("expected a sourcify verifier"),
        }

        assert!(matches!(
            Verifier::for_network(network_by_name("hardhat").unwrap(), &env),
            Err(ScriptError::Verification(_))
        ));
    }
}

//! Loading contract factories from Hardhat compilation artifacts
//!
//! Hardhat writes one artifact per contract under
//! `<artifacts>/<source path>/<Contract>.json`, next to a `<Contract>.dbg.json`
//! file pointing at the build info that holds the full compiler input.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::json_abi::JsonAbi;
use alloy_primitives::{hex, Bytes};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    constants::{ARTIFACT_EXTENSION, BUILD_INFO_DIR, DEBUG_ARTIFACT_SUFFIX, LINK_PLACEHOLDER_PREFIX},
    errors::ScriptError,
    types::ConstructorArgs,
};

/// The on-disk layout of a Hardhat artifact
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    /// The name of the contract
    contract_name: String,
    /// The path of the source file, relative to the project root
    source_name: String,
    /// The contract ABI
    abi: JsonAbi,
    /// The hex-encoded creation bytecode
    bytecode: String,
}

/// The on-disk layout of a Hardhat debug artifact
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugArtifact {
    /// The path of the build info, relative to the debug artifact
    build_info: String,
}

/// The compiler run that produced an artifact
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// The short compiler version, e.g. `0.8.19`
    pub solc_version: String,
    /// The full compiler version, e.g. `0.8.19+commit.7dd6d404`
    pub solc_long_version: String,
    /// The standard JSON input given to the compiler
    pub input: Value,
    /// The standard JSON output of the compiler
    #[serde(default)]
    pub output: Value,
}

impl BuildInfo {
    /// Whether the optimizer was enabled for the compilation
    pub fn optimization_used(&self) -> bool {
        self.input["settings"]["optimizer"]["enabled"]
            .as_bool()
            .unwrap_or(false)
    }

    /// The metadata the compiler emitted for a contract, a JSON document
    pub fn contract_metadata(&self, source_name: &str, contract_name: &str) -> Option<&str> {
        self.output["contracts"][source_name][contract_name]["metadata"].as_str()
    }

    /// The contents of the compiled source files, by path
    pub fn sources(&self) -> BTreeMap<String, String> {
        let Some(sources) = self.input["sources"].as_object() else {
            return BTreeMap::new();
        };

        sources
            .iter()
            .filter_map(|(path, source)| {
                let content = source["content"].as_str()?;
                Some((path.clone(), content.to_string()))
            })
            .collect()
    }
}

/// A contract factory: the ABI and creation bytecode of a contract
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    /// The name of the contract
    pub contract_name: String,
    /// The path of the source file, relative to the project root
    pub source_name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: Bytes,
    /// The path of the artifact file
    pub path: PathBuf,
}

impl ContractArtifact {
    /// Find and load the artifact of the named contract
    pub fn load(artifacts_dir: &Path, contract_name: &str) -> Result<Self, ScriptError> {
        let path = find_artifact(artifacts_dir, contract_name)?;
        Self::from_file(&path)
    }

    /// Load an artifact from the given file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        let raw: RawArtifact = serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

        if raw.bytecode.contains(LINK_PLACEHOLDER_PREFIX) {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} requires library linking",
                raw.contract_name
            )));
        }

        let bytecode: Bytes = hex::decode(&raw.bytecode)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .into();
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has no bytecode, is it abstract?",
                raw.contract_name
            )));
        }

        Ok(Self {
            contract_name: raw.contract_name,
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
            path: path.to_path_buf(),
        })
    }

    /// The fully qualified name of the contract, `<source>:<contract>`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// The number of parameters of the contract's constructor
    pub fn num_constructor_inputs(&self) -> usize {
        self.abi
            .constructor
            .as_ref()
            .map(|c| c.inputs.len())
            .unwrap_or(0)
    }

    /// The init code deploying the contract with the given constructor arguments,
    /// i.e. the creation bytecode followed by the ABI-encoded arguments
    pub fn deploy_code(&self, args: &impl ConstructorArgs) -> Result<Bytes, ScriptError> {
        let expected = self.num_constructor_inputs();
        if expected != args.num_args() {
            return Err(ScriptError::CalldataConstruction(format!(
                "{} expects {} constructor arguments, got {}",
                self.contract_name,
                expected,
                args.num_args()
            )));
        }

        let mut code = self.bytecode.to_vec();
        code.extend(args.abi_encode());
        Ok(code.into())
    }

    /// Load the build info of the compilation that produced the artifact
    pub fn build_info(&self) -> Result<BuildInfo, ScriptError> {
        let file_name = format!("{}{}", self.contract_name, DEBUG_ARTIFACT_SUFFIX);
        let dbg_path = self.path.with_file_name(file_name);
        let dbg: DebugArtifact = read_json(&dbg_path)?;

        let parent = dbg_path.parent().unwrap_or_else(|| Path::new("."));
        read_json(&parent.join(dbg.build_info))
    }
}

/// Read and deserialize a JSON file
fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))
}

/// Find the artifact of the named contract under the artifacts directory.
///
/// Fails if no artifact or more than one artifact carries the name.
pub fn find_artifact(artifacts_dir: &Path, contract_name: &str) -> Result<PathBuf, ScriptError> {
    let file_name = format!("{contract_name}.{ARTIFACT_EXTENSION}");
    let mut matches = Vec::new();
    collect_matches(artifacts_dir, &file_name, &mut matches)?;

    match matches.len() {
        0 => Err(ScriptError::ArtifactParsing(format!(
            "no artifact for {} in {}",
            contract_name,
            artifacts_dir.display()
        ))),
        1 => Ok(matches.remove(0)),
        _ => Err(ScriptError::ArtifactParsing(format!(
            "multiple artifacts for {}: {:?}",
            contract_name, matches
        ))),
    }
}

/// Recursively collect the files with the given name, skipping build info
fn collect_matches(
    dir: &Path,
    file_name: &str,
    matches: &mut Vec<PathBuf>,
) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", dir.display(), e)))?;

    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();

        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == BUILD_INFO_DIR) {
                continue;
            }
            collect_matches(&path, file_name, matches)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            matches.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_helpers {
    //! Fixtures for tests that need artifacts on disk

    use std::{fs, path::Path};

    use serde_json::json;

    /// Write a Hardhat artifact, its debug file and build info under `dir`
    pub fn write_artifact(dir: &Path, source: &str, name: &str, inputs: &[&str], bytecode: &str) {
        let contract_dir = dir.join(source);
        fs::create_dir_all(&contract_dir).unwrap();
        fs::create_dir_all(dir.join("build-info")).unwrap();

        let inputs: Vec<_> = inputs
            .iter()
            .enumerate()
            .map(|(i, ty)| json!({ "internalType": ty, "name": format!("arg{i}"), "type": ty }))
            .collect();
        let artifact = json!({
            "_format": "hh-sol-artifact-1",
            "contractName": name,
            "sourceName": source,
            "abi": [{
                "inputs": inputs,
                "stateMutability": "nonpayable",
                "type": "constructor"
            }],
            "bytecode": bytecode,
            "deployedBytecode": "0x",
            "linkReferences": {},
            "deployedLinkReferences": {}
        });
        fs::write(contract_dir.join(format!("{name}.json")), artifact.to_string()).unwrap();

        let dbg = json!({ "_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/abc.json" });
        fs::write(contract_dir.join(format!("{name}.dbg.json")), dbg.to_string()).unwrap();

        let metadata = json!({
            "compiler": { "version": "0.8.19+commit.7dd6d404" },
            "language": "Solidity",
            "settings": { "compilationTarget": { source: name } },
            "version": 1
        });
        let build_info = json!({
            "_format": "hh-sol-build-info-1",
            "id": "abc",
            "solcVersion": "0.8.19",
            "solcLongVersion": "0.8.19+commit.7dd6d404",
            "input": {
                "language": "Solidity",
                "sources": { source: { "content": "contract C {}" } },
                "settings": { "optimizer": { "enabled": true, "runs": 800 } }
            },
            "output": {
                "contracts": {
                    source: { name: { "metadata": metadata.to_string() } }
                }
            }
        });
        fs::write(dir.join("build-info/abc.json"), build_info.to_string()).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use tempfile::tempdir;

    use super::{test_helpers::write_artifact, *};
    use crate::types::{SpaceBalanceArgs, SpaceStationArgs};

    #[test]
    fn test_load_and_deploy_code() {
        let dir = tempdir().unwrap();
        write_artifact(
            dir.path(),
            "contracts/SpaceBalance.sol",
            "SpaceBalance",
            &["address"],
            "0x6080604052",
        );

        let artifact = ContractArtifact::load(dir.path(), "SpaceBalance").unwrap();
        assert_eq!(artifact.qualified_name(), "contracts/SpaceBalance.sol:SpaceBalance");
        assert_eq!(artifact.num_constructor_inputs(), 1);

        let args = SpaceBalanceArgs {
            deployer: Address::repeat_byte(0x42),
        };
        let code = artifact.deploy_code(&args).unwrap();
        assert_eq!(&code[..5], &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(&code[5..], args.abi_encode().as_slice());

        // A mismatched argument tuple is rejected
        let wrong = SpaceStationArgs {
            galaxy_signer: Address::ZERO,
            campaign_setter: Address::ZERO,
            contract_owner: Address::ZERO,
            treasure_manager: Address::ZERO,
        };
        assert!(matches!(
            artifact.deploy_code(&wrong),
            Err(ScriptError::CalldataConstruction(_))
        ));
    }

    #[test]
    fn test_build_info() {
        let dir = tempdir().unwrap();
        write_artifact(dir.path(), "contracts/A.sol", "A", &[], "0x00");

        let build_info = ContractArtifact::load(dir.path(), "A")
            .unwrap()
            .build_info()
            .unwrap();
        assert_eq!(build_info.solc_version, "0.8.19");
        assert_eq!(build_info.solc_long_version, "0.8.19+commit.7dd6d404");
        assert!(build_info.optimization_used());

        let metadata: Value =
            serde_json::from_str(build_info.contract_metadata("contracts/A.sol", "A").unwrap())
                .unwrap();
        assert_eq!(metadata["settings"]["compilationTarget"]["contracts/A.sol"], "A");
        assert!(build_info.contract_metadata("contracts/A.sol", "B").is_none());

        let sources = build_info.sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources["contracts/A.sol"], "contract C {}");
    }

    #[test]
    fn test_missing_and_ambiguous_artifacts() {
        let dir = tempdir().unwrap();
        assert!(find_artifact(dir.path(), "A").is_err());

        write_artifact(dir.path(), "contracts/A.sol", "A", &[], "0x00");
        assert!(find_artifact(dir.path(), "A").is_ok());

        write_artifact(dir.path(), "contracts/other/A.sol", "A", &[], "0x00");
        assert!(find_artifact(dir.path(), "A").is_err());
    }

    #[test]
    fn test_reject_unusable_bytecode() {
        let dir = tempdir().unwrap();
        write_artifact(dir.path(), "contracts/I.sol", "I", &[], "0x");
        assert!(ContractArtifact::load(dir.path(), "I").is_err());

        let linked = "0x6080__$cb3bb3b18b0b5c5ad3ecc5e0d3bc51a1fd$__6040";
        write_artifact(dir.path(), "contracts/L.sol", "L", &[], linked);
        assert!(ContractArtifact::load(dir.path(), "L").is_err());
    }
}

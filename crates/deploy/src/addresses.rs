//! Contract address books derived from deployment artifacts.

use std::{collections::BTreeMap, path::Path};

use alloy_core::primitives::Address;
use anyhow::Context;
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::DevnetError, fs::FsHandler};

/// Deployment artifact holding the L2 output oracle proxy.
pub const L2_OUTPUT_ORACLE_PROXY: &str = "L2OutputOracleProxy";

/// SDK contract name -> deployment artifact it is read from.
const SDK_CONTRACTS: [(&str, &str); 4] = [
    ("L1CrossDomainMessenger", "Proxy__OVM_L1CrossDomainMessenger"),
    ("L1StandardBridge", "Proxy__OVM_L1StandardBridge"),
    ("OptimismPortal", "OptimismPortalProxy"),
    ("L2OutputOracle", L2_OUTPUT_ORACLE_PROXY),
];

/// Legacy contracts the SDK still expects to find. None of them is deployed on this devnet.
const SDK_LEGACY_CONTRACTS: [&str; 4] = [
    "AddressManager",
    "StateCommitmentChain",
    "CanonicalTransactionChain",
    "BondManager",
];

/// Contract name -> deployed address, built from the deployment directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Deref)]
#[serde(transparent)]
pub struct AddressBook(BTreeMap<String, String>);

impl AddressBook {
    /// Read every `*.json` artifact in `deployment_dir` and collect its `address` field, keyed
    /// by the file stem.
    pub fn from_deployment_dir(deployment_dir: &Path) -> anyhow::Result<Self> {
        let entries = std::fs::read_dir(deployment_dir).with_context(|| {
            format!(
                "Failed to list deployment directory {}",
                deployment_dir.display()
            )
        })?;

        let mut addresses = BTreeMap::new();
        for entry in entries {
            let path = entry
                .context("Failed to read deployment directory entry")?
                .path();

            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let artifact: Value = FsHandler::read_json(&path)?;
            let address = artifact
                .get("address")
                .and_then(Value::as_str)
                .ok_or_else(|| DevnetError::missing_key("address", path.display().to_string()))?;

            tracing::trace!(contract = name, address, "Deployment artifact read");
            addresses.insert(name.to_string(), address.to_string());
        }

        tracing::debug!(count = addresses.len(), "Address book built from deployment artifacts");
        Ok(Self(addresses))
    }

    /// Read a previously persisted address book.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        FsHandler::read_json(path).context("Failed to load address book")
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        FsHandler::write_json(path, self).context("Failed to save address book")
    }

    /// Address of `contract`, failing if the deployment did not produce it.
    pub fn require(&self, contract: &str) -> anyhow::Result<&str> {
        self.0
            .get(contract)
            .map(String::as_str)
            .ok_or_else(|| DevnetError::missing_key(contract, "address book").into())
    }

    pub fn l2_output_oracle_proxy(&self) -> anyhow::Result<&str> {
        self.require(L2_OUTPUT_ORACLE_PROXY)
    }

    /// Build the address book handed to SDK consumers.
    pub fn sdk_addresses(&self) -> anyhow::Result<SdkAddressBook> {
        let mut sdk: BTreeMap<String, String> = SDK_LEGACY_CONTRACTS
            .iter()
            .map(|name| (name.to_string(), Address::ZERO.to_string()))
            .collect();

        for (sdk_name, artifact) in SDK_CONTRACTS {
            sdk.insert(sdk_name.to_string(), self.require(artifact)?.to_string());
        }

        Ok(SdkAddressBook(sdk))
    }
}

impl FromIterator<(String, String)> for AddressBook {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The address book shape expected by SDK consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Deref)]
#[serde(transparent)]
pub struct SdkAddressBook(BTreeMap<String, String>);

impl SdkAddressBook {
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        FsHandler::write_json(path, self).context("Failed to save SDK address book")
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    const ZERO: &str = "0x0000000000000000000000000000000000000000";

    fn write_artifact(dir: &Path, name: &str, address: &str) {
        std::fs::write(
            dir.join(format!("{name}.json")),
            serde_json::json!({ "address": address, "abi": [] }).to_string(),
        )
        .unwrap();
    }

    #[test]
    fn test_derive_sdk_addresses() {
        let dir = TempDir::new("deployments").unwrap();
        write_artifact(dir.path(), "Proxy__OVM_L1CrossDomainMessenger", "0xAAA");
        write_artifact(dir.path(), "OptimismPortalProxy", "0xBBB");
        write_artifact(dir.path(), "L2OutputOracleProxy", "0xCCC");
        write_artifact(dir.path(), "Proxy__OVM_L1StandardBridge", "0xDDD");
        std::fs::write(dir.path().join(".chainId"), "714").unwrap();

        let book = AddressBook::from_deployment_dir(dir.path()).unwrap();
        assert_eq!(book.len(), 4);
        assert_eq!(book.l2_output_oracle_proxy().unwrap(), "0xCCC");

        let sdk = book.sdk_addresses().unwrap();
        let expected: BTreeMap<String, String> = [
            ("L1CrossDomainMessenger", "0xAAA"),
            ("OptimismPortal", "0xBBB"),
            ("L2OutputOracle", "0xCCC"),
            ("L1StandardBridge", "0xDDD"),
            ("AddressManager", ZERO),
            ("StateCommitmentChain", ZERO),
            ("CanonicalTransactionChain", ZERO),
            ("BondManager", ZERO),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(*sdk, expected);
    }

    #[test]
    fn test_missing_sdk_contract_is_fatal() {
        let book: AddressBook = [("OptimismPortalProxy".to_string(), "0xBBB".to_string())]
            .into_iter()
            .collect();

        let err = book.sdk_addresses().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DevnetError>(),
            Some(DevnetError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_artifact_without_address_is_fatal() {
        let dir = TempDir::new("deployments").unwrap();
        std::fs::write(dir.path().join("Broken.json"), r#"{"abi": []}"#).unwrap();

        assert!(AddressBook::from_deployment_dir(dir.path()).is_err());
    }
}

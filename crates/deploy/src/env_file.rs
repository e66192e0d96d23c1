//! Base-chain environment file (`ops-bedrock/l1.env`).

use std::{collections::BTreeMap, path::Path};

use alloy_core::primitives::Address;
use anyhow::Context;

use crate::error::DevnetError;

pub const CHAIN_ID_KEY: &str = "BSC_CHAIN_ID";
pub const INIT_HOLDER_KEY: &str = "INIT_HOLDER";
pub const INIT_HOLDER_PRV_KEY: &str = "INIT_HOLDER_PRV";

/// Base-chain identity and the funded account used for deployments and service signing.
#[derive(Clone, PartialEq, Eq)]
pub struct L1Env {
    pub chain_id: u64,
    /// Funded account address, kept as written in the file.
    pub init_holder: String,
    /// Private key of `init_holder`.
    pub init_holder_prv: String,
}

impl std::fmt::Debug for L1Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L1Env")
            .field("chain_id", &self.chain_id)
            .field("init_holder", &self.init_holder)
            .field("init_holder_prv", &"<redacted>")
            .finish()
    }
}

impl L1Env {
    /// Parse a dotenv file without touching the process environment.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let vars = dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .collect::<Result<BTreeMap<String, String>, _>>()
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let env = Self::from_vars(&vars, &path.display().to_string())?;
        tracing::info!(
            path = %path.display(),
            chain_id = env.chain_id,
            init_holder = %env.init_holder,
            "Loaded L1 environment"
        );

        Ok(env)
    }

    fn from_vars(vars: &BTreeMap<String, String>, source_name: &str) -> anyhow::Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .cloned()
                .ok_or_else(|| DevnetError::missing_key(key, source_name))
        };

        let chain_id = get(CHAIN_ID_KEY)?;
        let chain_id = chain_id
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{CHAIN_ID_KEY} is not a decimal chain id: {chain_id}"))?;

        let init_holder = get(INIT_HOLDER_KEY)?;
        init_holder
            .parse::<Address>()
            .with_context(|| format!("{INIT_HOLDER_KEY} is not an address: {init_holder}"))?;

        Ok(Self {
            chain_id,
            init_holder,
            init_holder_prv: get(INIT_HOLDER_PRV_KEY)?,
        })
    }
}

//! Genesis and rollup config generator.

mod cmd;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use cmd::GenesisCmdBuilder;

use crate::{
    paths::DevnetPaths,
    process::{CommandRunner, Invocation},
};

/// Default command used to run the generator from the `op-node` directory.
pub fn default_command() -> Vec<String> {
    ["go", "run", "cmd/main.go"].map(String::from).to_vec()
}

/// Genesis timestamp as `0x`-prefixed hex seconds since the epoch.
pub fn genesis_timestamp(now: DateTime<Utc>) -> String {
    format!("{:#x}", now.timestamp())
}

/// Rollup config fields consumed by the bring-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupConfig {
    pub batch_inbox_address: String,
}

/// The external genesis generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisGenerator {
    /// Command line the generator arguments are appended to.
    pub command: Vec<String>,
    /// Directory the generator runs from.
    pub workdir: PathBuf,
}

impl GenesisGenerator {
    pub fn new(command: Vec<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            workdir: workdir.into(),
        }
    }

    /// Produce the L1 genesis, L2 genesis and rollup config from `deploy_config`.
    pub async fn generate_devnet<R: CommandRunner>(
        &self,
        runner: &R,
        env: BTreeMap<String, String>,
        paths: &DevnetPaths,
        deploy_config: &Path,
    ) -> anyhow::Result<()> {
        let args = GenesisCmdBuilder::devnet(
            deploy_config,
            &paths.genesis_l1,
            &paths.genesis_l2,
            &paths.rollup_config,
        )
        .build();

        let invocation = Invocation::new(&self.command, &self.workdir)?
            .args(args)
            .env(env);

        runner
            .run(&invocation)
            .await
            .context("Failed to generate devnet genesis files")
    }

    /// Produce the L2 genesis and rollup config against contracts deployed on `l1_rpc`.
    pub async fn generate_l2<R: CommandRunner>(
        &self,
        runner: &R,
        env: BTreeMap<String, String>,
        paths: &DevnetPaths,
        l1_rpc: &str,
    ) -> anyhow::Result<()> {
        let args = GenesisCmdBuilder::l2(
            l1_rpc,
            &paths.deploy_config,
            &paths.deployment_dir,
            &paths.genesis_l2,
            &paths.rollup_config,
        )
        .build();

        let invocation = Invocation::new(&self.command, &self.workdir)?
            .args(args)
            .env(env);

        runner
            .run(&invocation)
            .await
            .context("Failed to generate L2 genesis and rollup config")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_genesis_timestamp() {
        let now = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        assert_eq!(now.timestamp(), 1_700_000_000);
        assert_eq!(genesis_timestamp(now), "0x6553f100");
    }

    #[test]
    fn test_rollup_config_requires_inbox() {
        let config: RollupConfig = serde_json::from_str(
            r#"{"batch_inbox_address": "0xff00000000000000000000000000000000000900", "l2_chain_id": 901}"#,
        )
        .unwrap();
        assert_eq!(config.batch_inbox_address, "0xff00000000000000000000000000000000000900");

        assert!(serde_json::from_str::<RollupConfig>(r#"{"l2_chain_id": 901}"#).is_err());
    }
}

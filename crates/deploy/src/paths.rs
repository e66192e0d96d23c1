//! Filesystem layout of a monorepo checkout and its `.devnet` working directory.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Name of the per-monorepo working directory.
pub const DEVNET_DIR_NAME: &str = ".devnet";

/// Name of the deploy-config template shared by both bring-up modes.
pub const DEPLOY_CONFIG_FILENAME: &str = "devnetL1.json";

/// Every path the bring-up reads from or writes to.
///
/// All persisted state (markers and artifacts) lives under [`DevnetPaths::devnet_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevnetPaths {
    pub monorepo_dir: PathBuf,
    pub devnet_dir: PathBuf,
    pub contracts_bedrock_dir: PathBuf,
    pub deployment_dir: PathBuf,
    pub deploy_config_dir: PathBuf,
    pub op_node_dir: PathBuf,
    pub ops_bedrock_dir: PathBuf,

    /// Sentinel marking the prestate genesis as generated.
    pub done_file: PathBuf,
    pub genesis_l1: PathBuf,
    pub genesis_l2: PathBuf,
    pub rollup_config: PathBuf,
    pub addresses_json: PathBuf,
    pub sdk_addresses_json: PathBuf,

    /// The deploy-config template (`devnetL1.json`).
    pub deploy_config: PathBuf,
    /// Scratch deploy-config written in prestate mode.
    pub temp_deploy_config: PathBuf,
    /// Backup of the template taken before it is patched in place.
    pub deploy_config_backup: PathBuf,

    /// dotenv file describing the base chain.
    pub l1_env_file: PathBuf,
}

impl DevnetPaths {
    /// Derive the layout from a monorepo root.
    pub fn new(monorepo_dir: impl Into<PathBuf>) -> Self {
        let monorepo_dir = monorepo_dir.into();
        let devnet_dir = monorepo_dir.join(DEVNET_DIR_NAME);
        let contracts_bedrock_dir = monorepo_dir.join("packages").join("contracts-bedrock");
        let deploy_config_dir = contracts_bedrock_dir.join("deploy-config");
        let ops_bedrock_dir = monorepo_dir.join("ops-bedrock");

        Self {
            deployment_dir: contracts_bedrock_dir.join("deployments").join("devnetL1"),
            deploy_config: deploy_config_dir.join(DEPLOY_CONFIG_FILENAME),
            op_node_dir: monorepo_dir.join("op-node"),
            l1_env_file: ops_bedrock_dir.join("l1.env"),

            done_file: devnet_dir.join("done"),
            genesis_l1: devnet_dir.join("genesis-l1.json"),
            genesis_l2: devnet_dir.join("genesis-l2.json"),
            rollup_config: devnet_dir.join("rollup.json"),
            addresses_json: devnet_dir.join("addresses.json"),
            sdk_addresses_json: devnet_dir.join("sdk-addresses.json"),
            temp_deploy_config: devnet_dir.join("deploy-config.json"),
            deploy_config_backup: devnet_dir.join(format!("{DEPLOY_CONFIG_FILENAME}.bak")),

            monorepo_dir,
            devnet_dir,
            contracts_bedrock_dir,
            deploy_config_dir,
            ops_bedrock_dir,
        }
    }

    /// Resolve `monorepo_dir` to an absolute path and derive the layout from it.
    pub fn resolve(monorepo_dir: &Path) -> anyhow::Result<Self> {
        let monorepo_dir = monorepo_dir.canonicalize().with_context(|| {
            format!(
                "Failed to resolve monorepo directory {}",
                monorepo_dir.display()
            )
        })?;

        Ok(Self::new(monorepo_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = DevnetPaths::new("/repo");

        assert_eq!(paths.devnet_dir, PathBuf::from("/repo/.devnet"));
        assert_eq!(paths.done_file, PathBuf::from("/repo/.devnet/done"));
        assert_eq!(
            paths.deploy_config,
            PathBuf::from("/repo/packages/contracts-bedrock/deploy-config/devnetL1.json")
        );
        assert_eq!(
            paths.deploy_config_backup,
            PathBuf::from("/repo/.devnet/devnetL1.json.bak")
        );
        assert_eq!(
            paths.deployment_dir,
            PathBuf::from("/repo/packages/contracts-bedrock/deployments/devnetL1")
        );
        assert_eq!(paths.l1_env_file, PathBuf::from("/repo/ops-bedrock/l1.env"));
    }
}

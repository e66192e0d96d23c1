//! Command builder for the genesis generator.

use std::path::{Path, PathBuf};

/// What the generator should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GenesisTarget {
    /// L1 genesis, L2 genesis and rollup config, with the L1 contracts in the L1 genesis.
    Devnet { outfile_l1: PathBuf },
    /// L2 genesis and rollup config against contracts already deployed on a running L1.
    L2 {
        l1_rpc: String,
        deployment_dir: PathBuf,
    },
}

/// Builder for `genesis devnet` and `genesis l2` commands.
#[derive(Debug, Clone)]
pub struct GenesisCmdBuilder {
    target: GenesisTarget,
    deploy_config: PathBuf,
    outfile_l2: PathBuf,
    outfile_rollup: PathBuf,
}

impl GenesisCmdBuilder {
    /// `genesis devnet`: every genesis artifact from a deploy config alone.
    pub fn devnet(
        deploy_config: impl AsRef<Path>,
        outfile_l1: impl AsRef<Path>,
        outfile_l2: impl AsRef<Path>,
        outfile_rollup: impl AsRef<Path>,
    ) -> Self {
        Self {
            target: GenesisTarget::Devnet {
                outfile_l1: outfile_l1.as_ref().to_path_buf(),
            },
            deploy_config: deploy_config.as_ref().to_path_buf(),
            outfile_l2: outfile_l2.as_ref().to_path_buf(),
            outfile_rollup: outfile_rollup.as_ref().to_path_buf(),
        }
    }

    /// `genesis l2`: L2 artifacts from a deploy config and a deployment directory.
    pub fn l2(
        l1_rpc: impl Into<String>,
        deploy_config: impl AsRef<Path>,
        deployment_dir: impl AsRef<Path>,
        outfile_l2: impl AsRef<Path>,
        outfile_rollup: impl AsRef<Path>,
    ) -> Self {
        Self {
            target: GenesisTarget::L2 {
                l1_rpc: l1_rpc.into(),
                deployment_dir: deployment_dir.as_ref().to_path_buf(),
            },
            deploy_config: deploy_config.as_ref().to_path_buf(),
            outfile_l2: outfile_l2.as_ref().to_path_buf(),
            outfile_rollup: outfile_rollup.as_ref().to_path_buf(),
        }
    }

    /// Build the generator arguments as a vector of strings.
    pub fn build(self) -> Vec<String> {
        let mut cmd = vec!["genesis".to_string()];

        match self.target {
            GenesisTarget::Devnet { outfile_l1 } => {
                cmd.push("devnet".to_string());
                cmd.push("--deploy-config".to_string());
                cmd.push(self.deploy_config.display().to_string());
                cmd.push("--outfile.l1".to_string());
                cmd.push(outfile_l1.display().to_string());
            }
            GenesisTarget::L2 {
                l1_rpc,
                deployment_dir,
            } => {
                cmd.push("l2".to_string());
                cmd.push("--l1-rpc".to_string());
                cmd.push(l1_rpc);
                cmd.push("--deploy-config".to_string());
                cmd.push(self.deploy_config.display().to_string());
                cmd.push("--deployment-dir".to_string());
                cmd.push(deployment_dir.display().to_string());
            }
        }

        cmd.push("--outfile.l2".to_string());
        cmd.push(self.outfile_l2.display().to_string());
        cmd.push("--outfile.rollup".to_string());
        cmd.push(self.outfile_rollup.display().to_string());

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devnet_cmd() {
        let cmd = GenesisCmdBuilder::devnet(
            "/d/deploy-config.json",
            "/d/genesis-l1.json",
            "/d/genesis-l2.json",
            "/d/rollup.json",
        )
        .build();

        assert_eq!(
            cmd,
            [
                "genesis",
                "devnet",
                "--deploy-config",
                "/d/deploy-config.json",
                "--outfile.l1",
                "/d/genesis-l1.json",
                "--outfile.l2",
                "/d/genesis-l2.json",
                "--outfile.rollup",
                "/d/rollup.json",
            ]
        );
    }

    #[test]
    fn test_l2_cmd() {
        let cmd = GenesisCmdBuilder::l2(
            "http://localhost:8545",
            "/r/devnetL1.json",
            "/r/deployments/devnetL1",
            "/d/genesis-l2.json",
            "/d/rollup.json",
        )
        .build();

        assert_eq!(
            cmd,
            [
                "genesis",
                "l2",
                "--l1-rpc",
                "http://localhost:8545",
                "--deploy-config",
                "/r/devnetL1.json",
                "--deployment-dir",
                "/r/deployments/devnetL1",
                "--outfile.l2",
                "/d/genesis-l2.json",
                "--outfile.rollup",
                "/d/rollup.json",
            ]
        );
    }
}

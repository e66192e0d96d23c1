//! L1 contract deployment.

mod cmd;

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;

pub use cmd::HardhatDeployCmdBuilder;

use crate::{
    env_file::L1Env,
    process::{CommandRunner, Invocation},
};

/// Default command the deployment arguments are appended to.
pub fn default_command() -> Vec<String> {
    ["yarn", "hardhat"].map(String::from).to_vec()
}

pub const DEFAULT_NETWORK: &str = "devnetL1";
pub const DEFAULT_TAG: &str = "l1";

/// Environment the deployment task reads.
#[derive(Clone, PartialEq, Eq)]
pub struct ContractDeployEnv {
    pub chain_id: u64,
    pub l1_rpc: String,
    pub deployer_key: String,
}

impl std::fmt::Debug for ContractDeployEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractDeployEnv")
            .field("chain_id", &self.chain_id)
            .field("l1_rpc", &self.l1_rpc)
            .field("deployer_key", &"<redacted>")
            .finish()
    }
}

impl ContractDeployEnv {
    pub fn from_l1_env(l1_env: &L1Env, l1_rpc: impl Into<String>) -> Self {
        Self {
            chain_id: l1_env.chain_id,
            l1_rpc: l1_rpc.into(),
            deployer_key: l1_env.init_holder_prv.clone(),
        }
    }

    pub fn vars(&self) -> [(&'static str, String); 3] {
        [
            ("CHAIN_ID", self.chain_id.to_string()),
            ("L1_RPC", self.l1_rpc.clone()),
            ("PRIVATE_KEY_DEPLOYER", self.deployer_key.clone()),
        ]
    }
}

/// Runs the contract deployment task from the contracts package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDeployer {
    pub command: Vec<String>,
    pub network: String,
    pub tags: Vec<String>,
    pub workdir: PathBuf,
}

impl ContractDeployer {
    pub fn new(command: Vec<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            network: DEFAULT_NETWORK.to_string(),
            tags: vec![DEFAULT_TAG.to_string()],
            workdir: workdir.into(),
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Deploy the L1 contracts. `env` is the base environment the deploy variables are
    /// layered over.
    pub async fn deploy<R: CommandRunner>(
        &self,
        runner: &R,
        mut env: BTreeMap<String, String>,
        deploy_env: &ContractDeployEnv,
    ) -> anyhow::Result<()> {
        env.extend(
            deploy_env
                .vars()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value)),
        );

        let args = HardhatDeployCmdBuilder::new(&self.network)
            .tags(&self.tags)
            .build();

        let invocation = Invocation::new(&self.command, &self.workdir)?
            .args(args)
            .env(env);

        tracing::info!(
            network = %self.network,
            chain_id = deploy_env.chain_id,
            l1_rpc = %deploy_env.l1_rpc,
            "Deploying L1 contracts"
        );

        runner
            .run(&invocation)
            .await
            .context("Failed to deploy L1 contracts")
    }
}

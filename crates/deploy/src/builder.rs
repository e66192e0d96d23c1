//! Builder module for creating a [`Deployer`].
//!
//! The builder resolves the monorepo layout, creates the `.devnet` working directory and
//! captures the process environment once, so every collaborator started during the run sees
//! the same base environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::{
    ComposeBackend, ContainerBackend, Deployer, DevnetPaths, DevnetSettings, ProcessEnv,
    ServiceLauncher,
    fs::FsHandler,
    process::{CommandRunner, ProcessRunner},
    services::{ContractDeployer, GenesisGenerator},
};

/// Builder for creating a [`Deployer`].
///
/// # Example
///
/// ```no_run
/// use devnet_up_deploy::{BringUpMode, DeployerBuilder};
///
/// # async fn example() -> anyhow::Result<()> {
/// let deployer = DeployerBuilder::new("/path/to/monorepo").build()?;
/// deployer.run(BringUpMode::Prestate).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeployerBuilder {
    /// Root of the monorepo checkout (required).
    monorepo_dir: PathBuf,
    /// Settings, defaults when not provided.
    settings: Option<DevnetSettings>,
    /// Base environment of the collaborators, the current process environment when not provided.
    env: Option<ProcessEnv>,
    /// Token cancelling the unbounded readiness waits.
    cancel: Option<CancellationToken>,
}

/// Everything a deployer needs apart from its backend and runner.
struct Prepared {
    paths: DevnetPaths,
    settings: DevnetSettings,
    env: ProcessEnv,
    cancel: CancellationToken,
}

impl DeployerBuilder {
    pub fn new(monorepo_dir: impl Into<PathBuf>) -> Self {
        Self {
            monorepo_dir: monorepo_dir.into(),
            settings: None,
            env: None,
            cancel: None,
        }
    }

    pub fn settings(mut self, settings: DevnetSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Set the base environment handed to every external command.
    pub fn env(mut self, env: ProcessEnv) -> Self {
        self.env = Some(env);
        self
    }

    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn prepare(self) -> Result<Prepared> {
        let paths = DevnetPaths::resolve(&self.monorepo_dir)?;
        FsHandler::create_devnet_directory(&paths.devnet_dir)?;

        let settings = self.settings.unwrap_or_default();

        tracing::info!(
            monorepo_dir = %paths.monorepo_dir.display(),
            devnet_dir = %paths.devnet_dir.display(),
            l1_rpc_url = %settings.l1_rpc_url,
            "Building devnet deployer..."
        );

        Ok(Prepared {
            paths,
            settings,
            env: self.env.unwrap_or_else(ProcessEnv::from_current),
            cancel: self.cancel.unwrap_or_default(),
        })
    }

    /// Build a [`Deployer`] driving the compose CLI and real child processes.
    pub fn build(self) -> Result<Deployer> {
        let prepared = self.prepare()?;

        let backend = ComposeBackend::new(&prepared.paths.ops_bedrock_dir, prepared.env.clone())
            .with_command(prepared.settings.compose_command.clone());

        Ok(Self::assemble(prepared, backend, ProcessRunner))
    }

    /// Build a [`Deployer`] on top of a custom container backend and command runner.
    pub fn build_with<B, R>(self, backend: B, runner: R) -> Result<Deployer<B, R>>
    where
        B: ContainerBackend,
        R: CommandRunner,
    {
        let prepared = self.prepare().context("Failed to prepare devnet deployer")?;
        Ok(Self::assemble(prepared, backend, runner))
    }

    fn assemble<B, R>(prepared: Prepared, backend: B, runner: R) -> Deployer<B, R>
    where
        B: ContainerBackend,
        R: CommandRunner,
    {
        let Prepared {
            paths,
            settings,
            env,
            cancel,
        } = prepared;

        let genesis = GenesisGenerator::new(settings.genesis_command.clone(), &paths.op_node_dir);
        let contracts =
            ContractDeployer::new(settings.deploy_command.clone(), &paths.contracts_bedrock_dir)
                .with_network(&settings.hardhat_network)
                .with_tags(settings.deploy_tags.clone());

        Deployer {
            paths,
            settings,
            env,
            cancel,
            launcher: ServiceLauncher::new(backend),
            runner,
            genesis,
            contracts,
        }
    }
}

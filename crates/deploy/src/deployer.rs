use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    AddressBook, ComposeBackend, ContainerBackend, DevnetPaths, DevnetSettings, ProcessEnv,
    ServiceLauncher,
    deploy_config::{ConfigMaterializer, Overrides},
    env_file::L1Env,
    fs::FsHandler,
    gate::{StepMarker, run_once_guarded},
    probe::{HttpProbe, TcpProbe},
    process::{CommandRunner, ProcessRunner},
    rpc::{ChainFacts, L1Rpc},
    services::{
        ContractDeployEnv, ContractDeployer, GenesisGenerator, L1Service, L2Service,
        OpBatcherService, OpNodeService, OpProposerService, ServiceGroup, ServiceName,
        genesis::{RollupConfig, genesis_timestamp},
    },
};

/// The default name for the devnet settings file written to the working directory.
pub const DEVNET_CONF_FILENAME: &str = "Devnet.toml";

/// Deploy-config keys that receive the funded account address in deploy mode.
const INIT_HOLDER_KEYS: [&str; 10] = [
    "batchSenderAddress",
    "l2OutputOracleProposer",
    "baseFeeVaultRecipient",
    "l1FeeVaultRecipient",
    "sequencerFeeVaultRecipient",
    "proxyAdminOwner",
    "finalSystemOwner",
    "portalGuardian",
    "controller",
    "governanceTokenOwner",
];

const L1_WAIT_MESSAGE: &str = "Waiting for L1 to come up. The base chain initialises on first start, \
     which can take a long time; check the logs of the l1 container for progress.";
const L2_WAIT_MESSAGE: &str = "Waiting for L2 to come up...";

/// How the L1 contracts end up on the base chain.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum BringUpMode {
    /// Contracts are part of a generated L1 genesis.
    #[default]
    Prestate,
    /// Contracts are deployed live to a running base chain.
    Deploy,
}

/// What a completed bring-up did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevnetReport {
    pub mode: BringUpMode,
    /// Every service started, in launch order.
    pub launched: Vec<ServiceName>,
    /// Deployed contract addresses, in deploy mode.
    pub addresses: Option<AddressBook>,
}

/// Record of the last bring-up, persisted next to the devnet artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevnetManifest {
    pub mode: BringUpMode,
    pub monorepo_dir: PathBuf,
    pub settings: DevnetSettings,
}

/// Main deployer that orchestrates a devnet bring-up.
///
/// Every step runs sequentially. Expensive steps are guarded by markers under the `.devnet`
/// directory so that a second run after a successful one skips straight to starting services.
pub struct Deployer<B = ComposeBackend, R = ProcessRunner> {
    pub(crate) paths: DevnetPaths,
    pub(crate) settings: DevnetSettings,
    pub(crate) env: ProcessEnv,
    pub(crate) cancel: CancellationToken,
    pub(crate) launcher: ServiceLauncher<B>,
    pub(crate) runner: R,
    pub(crate) genesis: GenesisGenerator,
    pub(crate) contracts: ContractDeployer,
}

impl<B, R> Deployer<B, R> {
    pub fn paths(&self) -> &DevnetPaths {
        &self.paths
    }

    pub fn settings(&self) -> &DevnetSettings {
        &self.settings
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Save the effective settings of a run to `.devnet/Devnet.toml`.
    pub fn save_config(&self, mode: BringUpMode) -> Result<PathBuf> {
        let manifest = DevnetManifest {
            mode,
            monorepo_dir: self.paths.monorepo_dir.clone(),
            settings: self.settings.clone(),
        };

        let path = self.paths.devnet_dir.join(DEVNET_CONF_FILENAME);
        let content =
            toml::to_string_pretty(&manifest).context("Failed to serialize devnet settings to TOML")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(path)
    }
}

impl<B: ContainerBackend, R: CommandRunner> Deployer<B, R> {
    /// Bring the devnet up in `mode`.
    pub async fn run(&self, mode: BringUpMode) -> Result<DevnetReport> {
        tracing::info!(%mode, "Starting devnet bring-up...");
        self.save_config(mode)?;

        let report = match mode {
            BringUpMode::Prestate => self.run_prestate().await,
            BringUpMode::Deploy => self.run_deploy().await,
        }
        .with_context(|| format!("Devnet bring-up in {mode} mode failed"))?;

        tracing::info!(%mode, services = report.launched.len(), "Devnet ready.");
        Ok(report)
    }

    /// Bring up a devnet whose L1 contracts are baked into the L1 genesis.
    async fn run_prestate(&self) -> Result<DevnetReport> {
        let mut launched = Vec::new();

        run_once_guarded(
            "generate genesis files",
            &StepMarker::sentinel(&self.paths.done_file),
            || self.generate_prestate_genesis(),
        )
        .await?;

        tracing::info!("Bringing up L1.");
        self.launch(ServiceGroup::new().with(&L1Service), &mut launched)
            .await?;
        self.tcp_probe(self.settings.l1_port).wait_ready().await?;

        tracing::info!("Bringing up L2.");
        self.launch(ServiceGroup::new().with(&L2Service), &mut launched)
            .await?;
        self.tcp_probe(self.settings.l2_port).wait_ready().await?;

        tracing::info!("Bringing up the services.");
        let services = ServiceGroup::new()
            .with(&OpProposerService::default())
            .with(&OpBatcherService::default());
        self.launch(services, &mut launched).await?;

        Ok(DevnetReport {
            mode: BringUpMode::Prestate,
            launched,
            addresses: None,
        })
    }

    /// Bring up a devnet whose L1 contracts are deployed to a running base chain.
    async fn run_deploy(&self) -> Result<DevnetReport> {
        let mut launched = Vec::new();

        if FsHandler::exists(&self.paths.genesis_l1)? {
            tracing::info!("L1 genesis already generated.");
        } else {
            tracing::info!("Generating L1 genesis.");
            FsHandler::write_json(&self.paths.genesis_l1, &L1Service::genesis_template()?)?;
        }

        tracing::info!("Starting L1.");
        self.launch(ServiceGroup::new().with(&L1Service), &mut launched)
            .await?;
        self.http_probe(&self.settings.l1_rpc_url, L1_WAIT_MESSAGE)
            .wait_ready()
            .await?;

        let l1_env = L1Env::from_file(&self.paths.l1_env_file)?;
        let facts = L1Rpc::new(&self.settings.l1_rpc_url)?
            .chain_facts()
            .await
            .context("Failed to read L1 chain facts")?;

        tracing::info!("Generating network config.");
        let backup = ConfigMaterializer::materialize_in_place(
            &self.paths.deploy_config,
            &deploy_overrides(&l1_env, &facts),
            &self.paths.deploy_config_backup,
        )?;

        let addresses = run_once_guarded(
            "deploy L1 contracts",
            &StepMarker::artifact(&self.paths.addresses_json),
            || self.deploy_contracts(&l1_env),
        )
        .await?
        .or_restore(|| AddressBook::load(&self.paths.addresses_json))?;

        run_once_guarded(
            "generate L2 genesis and rollup config",
            &StepMarker::artifact(&self.paths.genesis_l2),
            || {
                self.genesis.generate_l2(
                    &self.runner,
                    self.env.overlay(Vec::<(String, String)>::new()),
                    &self.paths,
                    &self.settings.tools_l1_rpc_url,
                )
            },
        )
        .await?;

        let rollup: RollupConfig = FsHandler::read_json(&self.paths.rollup_config)
            .context("Failed to read rollup config")?;
        backup.restore()?;

        tracing::info!("Bringing up L2.");
        self.launch(ServiceGroup::new().with(&L2Service), &mut launched)
            .await?;
        self.http_probe(&self.settings.l2_rpc_url, L2_WAIT_MESSAGE)
            .wait_ready()
            .await?;

        tracing::info!("Bringing up everything else.");
        let key = Some(l1_env.init_holder_prv.clone());
        let inbox = Some(rollup.batch_inbox_address.clone());
        let services = ServiceGroup::new()
            .with(&OpNodeService {
                batch_inbox_address: inbox.clone(),
            })
            .with(&OpProposerService {
                l2_output_oracle: addresses.l2_output_oracle_proxy()?.to_string(),
                proposer_key: key.clone(),
            })
            .with(&OpBatcherService {
                batch_inbox_address: inbox,
                batcher_key: key,
            });
        self.launch(services, &mut launched).await?;

        Ok(DevnetReport {
            mode: BringUpMode::Deploy,
            launched,
            addresses: Some(addresses),
        })
    }

    async fn generate_prestate_genesis(&self) -> Result<()> {
        tracing::info!("Creating genesis files");

        let overrides =
            Overrides::new().set("l1GenesisBlockTimestamp", genesis_timestamp(Utc::now()));
        let deploy_config = ConfigMaterializer::materialize(
            &self.paths.deploy_config,
            &overrides,
            &self.paths.temp_deploy_config,
        )?;

        self.genesis
            .generate_devnet(
                &self.runner,
                self.env.overlay(Vec::<(String, String)>::new()),
                &self.paths,
                &deploy_config,
            )
            .await
    }

    /// Deploy the L1 contracts and persist the address books derived from the deployment.
    async fn deploy_contracts(&self, l1_env: &L1Env) -> Result<AddressBook> {
        let deploy_env = ContractDeployEnv::from_l1_env(l1_env, &self.settings.tools_l1_rpc_url);
        self.contracts
            .deploy(
                &self.runner,
                self.env.overlay(Vec::<(String, String)>::new()),
                &deploy_env,
            )
            .await?;

        let addresses = AddressBook::from_deployment_dir(&self.paths.deployment_dir)?;
        let sdk_addresses = addresses.sdk_addresses()?;
        addresses.save(&self.paths.addresses_json)?;
        sdk_addresses.save(&self.paths.sdk_addresses_json)?;

        tracing::info!(contracts = addresses.len(), "Contract addresses saved");
        Ok(addresses)
    }

    async fn launch(&self, group: ServiceGroup, launched: &mut Vec<ServiceName>) -> Result<()> {
        self.launcher.launch(&group).await?;
        launched.extend_from_slice(group.services());
        Ok(())
    }

    fn tcp_probe(&self, port: u16) -> TcpProbe {
        TcpProbe::new(&self.settings.probe_host, port)
            .max_attempts(self.settings.tcp_max_attempts)
            .interval(self.settings.tcp_retry_interval())
    }

    fn http_probe(&self, url: &str, wait_message: &str) -> HttpProbe {
        HttpProbe::block_number(url)
            .interval(self.settings.http_retry_interval())
            .wait_message(wait_message)
            .with_cancellation(self.cancel.clone())
    }
}

/// Overrides applied to the deploy-config template before contracts are deployed live.
fn deploy_overrides(l1_env: &L1Env, facts: &ChainFacts) -> Overrides {
    Overrides::new()
        .set("l1GenesisBlockTimestamp", facts.block_timestamp.clone())
        .set("l1StartingBlockTag", facts.block_tag.clone())
        .set("l1ChainID", l1_env.chain_id)
        .set_all(INIT_HOLDER_KEYS, l1_env.init_holder.clone())
}

//! Tunables of a bring-up, layered from defaults, an optional TOML file and `DEVNET_*`
//! environment variables.

use std::{path::Path, time::Duration};

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::services::{
    contracts,
    genesis,
    l1::DEFAULT_RPC_PORT as L1_RPC_PORT,
    l2::DEFAULT_RPC_PORT as L2_RPC_PORT,
};

/// Prefix of the environment variables overriding settings.
pub const ENV_PREFIX: &str = "DEVNET_";

/// Command-line settings read from the environment as whitespace separated words.
const LIST_KEYS: [&str; 4] = ["compose_command", "genesis_command", "deploy_command", "deploy_tags"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevnetSettings {
    /// Base-chain JSON-RPC endpoint, used by the readiness probe and the chain-facts queries.
    pub l1_rpc_url: String,
    /// Base-chain endpoint handed to the genesis generator and the contract deployer.
    pub tools_l1_rpc_url: String,
    /// L2 JSON-RPC endpoint probed after the L2 node is started.
    pub l2_rpc_url: String,

    /// Host the TCP readiness probes connect to.
    pub probe_host: String,
    pub l1_port: u16,
    pub l2_port: u16,

    pub tcp_max_attempts: usize,
    pub tcp_retry_interval_ms: u64,
    pub http_retry_interval_ms: u64,

    /// Program and leading arguments. From the environment, e.g.
    /// `DEVNET_COMPOSE_COMMAND="docker compose"`, the value is split on whitespace.
    pub compose_command: Vec<String>,
    pub genesis_command: Vec<String>,
    pub deploy_command: Vec<String>,
    pub hardhat_network: String,
    /// Split on whitespace when set through `DEVNET_DEPLOY_TAGS`.
    pub deploy_tags: Vec<String>,
}

impl Default for DevnetSettings {
    fn default() -> Self {
        Self {
            l1_rpc_url: format!("http://127.0.0.1:{L1_RPC_PORT}"),
            tools_l1_rpc_url: format!("http://localhost:{L1_RPC_PORT}"),
            l2_rpc_url: format!("http://127.0.0.1:{L2_RPC_PORT}"),
            probe_host: "127.0.0.1".to_string(),
            l1_port: L1_RPC_PORT,
            l2_port: L2_RPC_PORT,
            tcp_max_attempts: 10,
            tcp_retry_interval_ms: 1_000,
            http_retry_interval_ms: 5_000,
            compose_command: crate::compose::default_command(),
            genesis_command: genesis::default_command(),
            deploy_command: contracts::default_command(),
            hardhat_network: contracts::DEFAULT_NETWORK.to_string(),
            deploy_tags: vec![contracts::DEFAULT_TAG.to_string()],
        }
    }
}

impl DevnetSettings {
    /// Merge defaults, then `file` if it exists, then `DEVNET_*` variables.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(file) = file {
            if !file.exists() {
                anyhow::bail!("Settings file {} does not exist", file.display());
            }
            figment = figment.merge(Toml::file(file));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&LIST_KEYS));
        for (key, value) in Env::prefixed(ENV_PREFIX).only(&LIST_KEYS).iter() {
            let words: Vec<String> = value.split_whitespace().map(String::from).collect();
            figment = figment.merge(Serialized::default(key.as_str(), words));
        }

        let settings: Self = figment
            .extract()
            .context("Failed to load devnet settings")?;

        tracing::debug!(?settings, "Settings loaded");
        Ok(settings)
    }

    pub fn tcp_retry_interval(&self) -> Duration {
        Duration::from_millis(self.tcp_retry_interval_ms)
    }

    pub fn http_retry_interval(&self) -> Duration {
        Duration::from_millis(self.http_retry_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DevnetSettings::default();
        assert_eq!(settings.l1_rpc_url, "http://127.0.0.1:8545");
        assert_eq!(settings.tools_l1_rpc_url, "http://localhost:8545");
        assert_eq!(settings.l2_port, 9545);
        assert_eq!(settings.tcp_max_attempts, 10);
        assert_eq!(settings.http_retry_interval(), Duration::from_secs(5));
        assert_eq!(settings.compose_command, ["docker-compose"]);
        assert_eq!(settings.genesis_command, ["go", "run", "cmd/main.go"]);
        assert_eq!(settings.deploy_command, ["yarn", "hardhat"]);
    }

    #[test]
    fn test_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "Devnet.toml",
                r#"
                    l1_port = 18545
                    compose_command = ["docker", "compose"]
                "#,
            )?;
            jail.set_env("DEVNET_TCP_MAX_ATTEMPTS", "3");

            let settings = DevnetSettings::load(Some(Path::new("Devnet.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(settings.l1_port, 18545);
            assert_eq!(settings.compose_command, ["docker", "compose"]);
            assert_eq!(settings.tcp_max_attempts, 3);
            assert_eq!(settings.l2_port, 9545);
            Ok(())
        });
    }

    #[test]
    fn test_list_settings_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DEVNET_COMPOSE_COMMAND", "docker  compose");
            jail.set_env("DEVNET_DEPLOY_TAGS", "l1 l2");
            jail.set_env("DEVNET_HARDHAT_NETWORK", "sepolia");

            let settings = DevnetSettings::load(None).map_err(|e| e.to_string())?;
            assert_eq!(settings.compose_command, ["docker", "compose"]);
            assert_eq!(settings.deploy_tags, ["l1", "l2"]);
            assert_eq!(settings.hardhat_network, "sepolia");
            assert_eq!(settings.deploy_command, ["yarn", "hardhat"]);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new("settings").unwrap();
        assert!(DevnetSettings::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}

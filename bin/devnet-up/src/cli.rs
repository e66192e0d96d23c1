use std::path::PathBuf;

use clap::Parser;
use devnet_up_deploy::BringUpMode;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "devnet-up")]
#[command(
    author,
    version,
    about = "Bring up a local rollup devnet from a monorepo checkout"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "DEVNET_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Root of the monorepo checkout.
    ///
    /// Genesis files, deployment outputs and step markers are stored in `<dir>/.devnet`.
    #[arg(long, env = "DEVNET_MONOREPO_DIR", default_value = ".")]
    pub monorepo_dir: PathBuf,

    /// Deploy the L1 contracts to a running base chain instead of baking them into the L1
    /// genesis.
    #[arg(long, overrides_with = "no_deploy")]
    pub deploy: bool,

    /// Bake the L1 contracts into the L1 genesis (default).
    #[arg(long, overrides_with = "deploy")]
    pub no_deploy: bool,

    /// Path to a TOML file overriding the default settings (endpoints, probe budgets,
    /// collaborator commands).
    #[arg(long, alias = "conf", env = "DEVNET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip the Docker daemon check before starting, and the status table after.
    #[arg(long, env = "DEVNET_SKIP_DOCKER_CHECK")]
    pub skip_docker_check: bool,
}

impl Cli {
    pub fn mode(&self) -> BringUpMode {
        if self.deploy && !self.no_deploy {
            BringUpMode::Deploy
        } else {
            BringUpMode::Prestate
        }
    }
}

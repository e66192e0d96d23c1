//! devnet-up-deploy - Bring-up library for a local rollup devnet.
//!
//! This crate drives the external tooling of a monorepo checkout (genesis generator, contract
//! deployer, compose file) to bring a base chain, an L2 node and the rollup services up in
//! order, waiting for each layer to become reachable before starting the next.

mod builder;
pub use builder::DeployerBuilder;

mod deployer;
pub use deployer::{BringUpMode, DEVNET_CONF_FILENAME, Deployer, DevnetManifest, DevnetReport};

pub mod addresses;
pub mod compose;
pub mod deploy_config;
pub mod docker;
pub mod env_file;
pub mod error;
pub mod fs;
pub mod gate;
pub mod paths;
pub mod probe;
pub mod process;
pub mod rpc;
pub mod services;
pub mod settings;

pub use addresses::{AddressBook, SdkAddressBook};
pub use compose::{ComposeBackend, ContainerBackend, ServiceLauncher};
pub use docker::{DockerStatus, ServiceState, render_states};
pub use error::DevnetError;
pub use paths::DevnetPaths;
pub use process::{CommandRunner, Invocation, ProcessEnv, ProcessRunner};
pub use services::{ServiceGroup, ServiceName};
pub use settings::DevnetSettings;

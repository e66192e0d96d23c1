//! Services of the devnet.
//!
//! Long-running services are started by the container backend and addressed by their compose
//! service name. Each one has a typed configuration implementing [`ComposeService`] that
//! renders the environment it needs:
//! - `l1` - base-chain node
//! - `l2` - L2 execution node
//! - `op-node` - rollup node
//! - `op-batcher` - batch submitter
//! - `op-proposer` - output proposer
//!
//! One-shot collaborators run as local commands:
//! - `genesis` - genesis and rollup config generator
//! - `contracts` - L1 contract deployment

pub mod contracts;
pub mod genesis;
pub mod l1;
pub mod l2;
pub mod op_batcher;
pub mod op_node;
pub mod op_proposer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use contracts::{ContractDeployEnv, ContractDeployer};
pub use genesis::GenesisGenerator;
pub use l1::L1Service;
pub use l2::L2Service;
pub use op_batcher::OpBatcherService;
pub use op_node::OpNodeService;
pub use op_proposer::OpProposerService;

/// Compose service names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ServiceName {
    L1,
    L2,
    OpNode,
    OpBatcher,
    OpProposer,
}

/// A service started by the container backend.
pub trait ComposeService {
    /// The compose service name.
    const SERVICE_NAME: ServiceName;

    /// Environment variables this service reads from the compose file.
    fn environment(&self) -> Vec<(&'static str, String)>;
}

/// An ordered set of services brought up by a single backend call, with the environment
/// overlay they were configured with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceGroup {
    services: Vec<ServiceName>,
    env: BTreeMap<String, String>,
}

impl ServiceGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service to the group. A service already present keeps its position.
    ///
    /// Environment keys set by an earlier service are overwritten by a later one.
    pub fn with<S: ComposeService>(mut self, service: &S) -> Self {
        if !self.services.contains(&S::SERVICE_NAME) {
            self.services.push(S::SERVICE_NAME);
        }
        self.env.extend(
            service
                .environment()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value)),
        );
        self
    }

    pub fn services(&self) -> &[ServiceName] {
        &self.services
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Service names, in launch order.
    pub fn names(&self) -> Vec<String> {
        self.services.iter().map(ToString::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Display for ServiceGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}

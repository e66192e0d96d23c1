//! Base-chain (L1) node.

use serde_json::Value;

use super::{ComposeService, ServiceName};

/// Host port of the L1 JSON-RPC endpoint.
pub const DEFAULT_RPC_PORT: u16 = 8545;

/// Genesis handed to the L1 node when contracts are deployed live.
const GENESIS_TEMPLATE: &str = include_str!("../../assets/genesis-l1.json");

/// The L1 node is fully described by its compose definition and the genesis file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L1Service;

impl L1Service {
    /// The L1 genesis used when contracts are not part of the genesis state.
    pub fn genesis_template() -> anyhow::Result<Value> {
        serde_json::from_str(GENESIS_TEMPLATE)
            .map_err(|err| anyhow::anyhow!("Bundled L1 genesis template is invalid: {err}"))
    }
}

impl ComposeService for L1Service {
    const SERVICE_NAME: ServiceName = ServiceName::L1;

    fn environment(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_template_parses() {
        let genesis = L1Service::genesis_template().unwrap();
        assert_eq!(genesis["config"]["chainId"], 900);
        assert!(genesis["alloc"].as_object().is_some_and(|alloc| !alloc.is_empty()));
    }
}

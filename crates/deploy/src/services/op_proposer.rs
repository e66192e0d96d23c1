//! op-proposer service.

use super::{ComposeService, ServiceName};

/// L2 output oracle address baked into the prestate genesis.
pub const PRESTATE_L2_OUTPUT_ORACLE: &str = "0x6900000000000000000000000000000000000000";

/// Configuration for the output proposer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpProposerService {
    /// Address of the L2 output oracle the proposer submits to.
    pub l2_output_oracle: String,
    /// Key the proposer signs outputs with.
    pub proposer_key: Option<String>,
}

impl Default for OpProposerService {
    fn default() -> Self {
        Self {
            l2_output_oracle: PRESTATE_L2_OUTPUT_ORACLE.to_string(),
            proposer_key: None,
        }
    }
}

impl ComposeService for OpProposerService {
    const SERVICE_NAME: ServiceName = ServiceName::OpProposer;

    fn environment(&self) -> Vec<(&'static str, String)> {
        let mut env = vec![("L2OO_ADDRESS", self.l2_output_oracle.clone())];

        if let Some(key) = &self.proposer_key {
            env.push(("INIT_HOLDER_PRV", key.clone()));
        }

        env
    }
}

//! op-node (rollup node).

use super::{ComposeService, ServiceName};

/// Configuration for the rollup node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpNodeService {
    /// Batch inbox address from the rollup config, when contracts were deployed live.
    pub batch_inbox_address: Option<String>,
}

impl ComposeService for OpNodeService {
    const SERVICE_NAME: ServiceName = ServiceName::OpNode;

    fn environment(&self) -> Vec<(&'static str, String)> {
        self.batch_inbox_address
            .iter()
            .map(|address| ("SEQUENCER_BATCH_INBOX_ADDRESS", address.clone()))
            .collect()
    }
}

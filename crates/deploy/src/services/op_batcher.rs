//! op-batcher service.

use super::{ComposeService, ServiceName};

/// Configuration for the batch submitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpBatcherService {
    /// Batch inbox address from the rollup config.
    pub batch_inbox_address: Option<String>,
    /// Key the batcher signs batches with.
    pub batcher_key: Option<String>,
}

impl ComposeService for OpBatcherService {
    const SERVICE_NAME: ServiceName = ServiceName::OpBatcher;

    fn environment(&self) -> Vec<(&'static str, String)> {
        let mut env = Vec::new();

        if let Some(address) = &self.batch_inbox_address {
            env.push(("OP_BATCHER_SEQUENCER_BATCH_INBOX_ADDRESS", address.clone()));
        }
        if let Some(key) = &self.batcher_key {
            env.push(("INIT_HOLDER_PRV", key.clone()));
        }

        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prestate_batcher_has_no_environment() {
        assert!(OpBatcherService::default().environment().is_empty());
    }
}

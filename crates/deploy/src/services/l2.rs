//! L2 execution node.

use super::{ComposeService, ServiceName};

/// Host port of the L2 JSON-RPC endpoint.
pub const DEFAULT_RPC_PORT: u16 = 9545;

/// The L2 execution node reads its genesis from the devnet directory, so it needs no
/// computed environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Service;

impl ComposeService for L2Service {
    const SERVICE_NAME: ServiceName = ServiceName::L2;

    fn environment(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

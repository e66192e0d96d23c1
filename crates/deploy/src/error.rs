//! Error taxonomy for a devnet bring-up.
//!
//! Every variant is fatal for the run. The variants exist so callers (and tests) can tell a
//! failed collaborator apart from an unreachable endpoint or a malformed artifact by
//! downcasting the [`anyhow::Error`] returned by the deployer.

use std::path::PathBuf;

/// Fatal errors raised while bringing up the devnet.
#[derive(Debug, thiserror::Error)]
pub enum DevnetError {
    /// An external command exited with a non-zero status.
    #[error("`{program}` exited with {status}")]
    CollaboratorFailed { program: String, status: String },

    /// A bounded readiness probe ran out of attempts.
    #[error("Timed out waiting for {target} after {attempts} attempt(s)")]
    Timeout { target: String, attempts: usize },

    /// An unbounded readiness probe was cancelled before its target came up.
    #[error("Wait for {target} was cancelled")]
    Cancelled { target: String },

    /// A JSON-RPC helper got a non-200 HTTP status.
    #[error("{method} returned HTTP status {status}")]
    RpcStatus { method: String, status: u16 },

    /// An expected key is missing from a document read from disk or from the chain.
    #[error("Missing key `{key}` in {source_name}")]
    MissingKey { key: String, source_name: String },

    /// A step finished without producing the artifact that marks it as done.
    #[error("Expected artifact {} was not produced", .0.display())]
    MissingArtifact(PathBuf),
}

impl DevnetError {
    pub(crate) fn missing_key(key: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self::MissingKey {
            key: key.into(),
            source_name: source_name.into(),
        }
    }
}

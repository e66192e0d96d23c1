//! File system utils.

use std::path::Path;

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};

pub struct FsHandler;

impl FsHandler {
    // Create the devnet working directory if it doesn't exist
    pub fn create_devnet_directory(devnet_dir: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(devnet_dir)
            .context("Failed to create devnet working directory")?;
        tracing::debug!("Created devnet working directory: {}", devnet_dir.display());

        Ok(())
    }

    /// Read and decode a JSON document.
    pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON at {}", path.display()))
    }

    /// Encode a value as pretty JSON (two-space indent) and write it, replacing any previous
    /// content.
    pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize JSON for {}", path.display()))?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::trace!(path = %path.display(), "JSON written");
        Ok(())
    }

    /// Whether `path` exists. Permission errors are surfaced instead of being read as "absent".
    pub fn exists(path: &Path) -> anyhow::Result<bool> {
        path.try_exists()
            .with_context(|| format!("Failed to check if {} exists", path.display()))
    }
}

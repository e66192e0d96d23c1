//! Deploy-config materialization.
//!
//! The deploy-config drives both genesis generation and contract deployment. A bring-up
//! never edits the template by hand: it reads it, applies a set of runtime overrides
//! (timestamps, chain IDs, role addresses) and writes the merged document either to a fresh
//! path or over the template itself. The in-place variant keeps a backup so the template can
//! be put back once the steps that need the patched copy are done.

use std::path::{Path, PathBuf};

use anyhow::Context;
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fs::FsHandler;

/// A deploy-config document: configuration key to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Deref, DerefMut)]
#[serde(transparent)]
pub struct DeployConfig(Map<String, Value>);

impl DeployConfig {
    /// Read a deploy-config document from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        FsHandler::read_json(path).context("Failed to load deploy config")
    }

    /// Apply overrides in order. A key set twice keeps the last value.
    pub fn apply(&mut self, overrides: &Overrides) {
        for (key, value) in overrides.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Write the document to `path`.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        FsHandler::write_json(path, self).context("Failed to write deploy config")
    }
}

/// An ordered list of field overrides applied on top of a deploy-config template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides(Vec<(String, Value)>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Set every key in `keys` to the same value.
    pub fn set_all<'a>(
        mut self,
        keys: impl IntoIterator<Item = &'a str>,
        value: impl Into<Value>,
    ) -> Self {
        let value = value.into();
        self.0
            .extend(keys.into_iter().map(|key| (key.to_string(), value.clone())));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Handle on a template that was patched in place.
///
/// Dropping it does not restore anything: the template stays patched until
/// [`ConfigBackup::restore`] is called.
#[derive(Debug)]
#[must_use = "the patched deploy config is only put back by calling `restore`"]
pub struct ConfigBackup {
    original: PathBuf,
    backup: PathBuf,
}

impl ConfigBackup {
    /// The patched document, at the template's location.
    pub fn path(&self) -> &Path {
        &self.original
    }

    /// Move the backup back over the template.
    ///
    /// Returns `false` when there was no backup to restore.
    pub fn restore(self) -> anyhow::Result<bool> {
        if !FsHandler::exists(&self.backup)? {
            tracing::warn!(backup = %self.backup.display(), "No deploy config backup to restore");
            return Ok(false);
        }

        std::fs::rename(&self.backup, &self.original).with_context(|| {
            format!(
                "Failed to restore {} from {}",
                self.original.display(),
                self.backup.display()
            )
        })?;

        tracing::info!(path = %self.original.display(), "Deploy config restored");
        Ok(true)
    }
}

/// Reads deploy-config templates, applies overrides and writes the result.
pub struct ConfigMaterializer;

impl ConfigMaterializer {
    /// Merge `overrides` into `template` and write the result to a separate `output` path,
    /// leaving the template untouched.
    pub fn materialize(
        template: &Path,
        overrides: &Overrides,
        output: &Path,
    ) -> anyhow::Result<PathBuf> {
        let mut config = DeployConfig::load(template)?;
        config.apply(overrides);
        config.write(output)?;

        tracing::debug!(
            template = %template.display(),
            output = %output.display(),
            "Deploy config materialized"
        );

        Ok(output.to_path_buf())
    }

    /// Copy `template` to `backup`, then merge `overrides` into the template in place.
    pub fn materialize_in_place(
        template: &Path,
        overrides: &Overrides,
        backup: &Path,
    ) -> anyhow::Result<ConfigBackup> {
        std::fs::copy(template, backup).with_context(|| {
            format!(
                "Failed to back up {} to {}",
                template.display(),
                backup.display()
            )
        })?;

        let mut config = DeployConfig::load(template)?;
        config.apply(overrides);
        config.write(template)?;

        tracing::debug!(
            template = %template.display(),
            backup = %backup.display(),
            "Deploy config patched in place"
        );

        Ok(ConfigBackup {
            original: template.to_path_buf(),
            backup: backup.to_path_buf(),
        })
    }
}

//! Run-once guards for provisioning steps that are expensive or not idempotent.
//!
//! Each guarded step has a [`StepMarker`], a persisted fact on disk saying the step already
//! completed. A satisfied marker means the step is skipped entirely; otherwise the step runs and
//! the marker is persisted only once it has succeeded, so a failed step is re-attempted by the
//! next run.

use std::{future::Future, path::PathBuf};

use anyhow::Context;

use crate::{error::DevnetError, fs::FsHandler};

/// Persisted "already done" fact for a provisioning step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepMarker {
    /// An empty sentinel file written by the gate after the step succeeds.
    Sentinel(PathBuf),
    /// A file the step itself produces. Its presence is the marker.
    Artifact(PathBuf),
}

impl StepMarker {
    pub fn sentinel(path: impl Into<PathBuf>) -> Self {
        Self::Sentinel(path.into())
    }

    pub fn artifact(path: impl Into<PathBuf>) -> Self {
        Self::Artifact(path.into())
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Sentinel(path) | Self::Artifact(path) => path,
        }
    }

    /// Whether the step has already completed.
    pub fn is_satisfied(&self) -> anyhow::Result<bool> {
        FsHandler::exists(self.path())
    }

    /// Record the step as completed.
    fn persist(&self) -> anyhow::Result<()> {
        match self {
            Self::Sentinel(path) => FsHandler::write_json(path, &serde_json::json!({}))
                .context("Failed to write step marker"),
            Self::Artifact(path) => {
                if !FsHandler::exists(path)? {
                    return Err(DevnetError::MissingArtifact(path.clone()).into());
                }
                Ok(())
            }
        }
    }
}

/// Outcome of a guarded step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    /// The step ran and its marker is now persisted.
    Ran(T),
    /// The marker was already satisfied; the step did not run.
    Skipped,
}

impl<T> GateOutcome<T> {
    pub fn ran(&self) -> bool {
        matches!(self, Self::Ran(_))
    }

    /// Take the step's result, or rebuild it from existing artifacts when the step was skipped.
    pub fn or_restore(self, restore: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
        match self {
            Self::Ran(value) => Ok(value),
            Self::Skipped => restore(),
        }
    }
}

/// Run `action` unless `marker` is already satisfied.
///
/// The marker is persisted only when `action` succeeds. A failing action leaves it absent.
pub async fn run_once_guarded<T, F, Fut>(
    step: &str,
    marker: &StepMarker,
    action: F,
) -> anyhow::Result<GateOutcome<T>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    if marker.is_satisfied()? {
        tracing::info!(step, marker = %marker.path().display(), "Step already done, skipping");
        return Ok(GateOutcome::Skipped);
    }

    tracing::info!(step, "Running step");
    let value = action().await.with_context(|| format!("Step '{step}' failed"))?;

    marker
        .persist()
        .with_context(|| format!("Failed to mark step '{step}' as done"))?;
    tracing::debug!(step, marker = %marker.path().display(), "Step marked as done");

    Ok(GateOutcome::Ran(value))
}

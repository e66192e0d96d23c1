//! External command invocation.
//!
//! Every collaborator (compose, genesis generator, contract deployer) is started through a
//! [`CommandRunner`] with an explicit [`Invocation`]. The child environment is exactly the
//! invocation's `env`: callers build it from a [`ProcessEnv`] snapshot plus their own overlay,
//! so nothing reads the ambient process environment implicitly once the run has started.

use std::{collections::BTreeMap, future::Future, path::PathBuf};

use anyhow::Context;
use derive_more::Deref;

use crate::error::DevnetError;

/// Snapshot of a process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct ProcessEnv(BTreeMap<String, String>);

impl ProcessEnv {
    /// Capture the environment of the current process.
    pub fn from_current() -> Self {
        Self(std::env::vars().collect())
    }

    /// Merge `overlay` over the snapshot. Overlay keys win.
    pub fn overlay<K, V>(&self, overlay: impl IntoIterator<Item = (K, V)>) -> BTreeMap<String, String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut env = self.0.clone();
        env.extend(
            overlay
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        env
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProcessEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// Build an invocation from a command line whose first element is the program.
    pub fn new(command: &[String], cwd: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let (program, args) = command
            .split_first()
            .context("Command line must not be empty")?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd: cwd.into(),
            env: BTreeMap::new(),
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// The command line, for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value following `flag` in the argument list, if any.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(String::as_str)
    }
}

/// Runs external commands to completion.
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` and wait for it to exit. A non-zero exit is an error.
    fn run(&self, invocation: &Invocation) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// [`CommandRunner`] that spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> anyhow::Result<()> {
        tracing::info!(
            command = %invocation.command_line(),
            cwd = %invocation.cwd.display(),
            "Running command"
        );

        let status = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .env_clear()
            .envs(&invocation.env)
            .status()
            .await
            .with_context(|| format!("Failed to spawn `{}`", invocation.program))?;

        if !status.success() {
            return Err(DevnetError::CollaboratorFailed {
                program: invocation.command_line(),
                status: status.to_string(),
            }
            .into());
        }

        tracing::debug!(program = %invocation.program, "Command completed");
        Ok(())
    }
}

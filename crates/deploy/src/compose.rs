//! Service launcher backed by the compose file in `ops-bedrock`.

use std::{future::Future, path::PathBuf};

use anyhow::Context;

use crate::{
    process::{CommandRunner, Invocation, ProcessEnv, ProcessRunner},
    services::ServiceGroup,
};

/// Default compose command.
pub fn default_command() -> Vec<String> {
    vec!["docker-compose".to_string()]
}

/// Starts a group of services in the background and returns once they are started.
pub trait ContainerBackend: Send + Sync {
    fn up(&self, group: &ServiceGroup) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// [`ContainerBackend`] that runs `<compose> up -d <services...>` from the compose directory.
#[derive(Debug, Clone)]
pub struct ComposeBackend<R = ProcessRunner> {
    runner: R,
    command: Vec<String>,
    workdir: PathBuf,
    env: ProcessEnv,
}

impl ComposeBackend<ProcessRunner> {
    pub fn new(workdir: impl Into<PathBuf>, env: ProcessEnv) -> Self {
        Self::with_runner(ProcessRunner, workdir, env)
    }
}

impl<R: CommandRunner> ComposeBackend<R> {
    pub fn with_runner(runner: R, workdir: impl Into<PathBuf>, env: ProcessEnv) -> Self {
        Self {
            runner,
            command: default_command(),
            workdir: workdir.into(),
            env,
        }
    }

    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    /// The invocation that brings `group` up.
    ///
    /// Compose resolves relative paths against `PWD`, so it is pinned to the compose directory.
    pub fn invocation(&self, group: &ServiceGroup) -> anyhow::Result<Invocation> {
        let env = self.env.overlay(
            std::iter::once(("PWD".to_string(), self.workdir.display().to_string()))
                .chain(group.env().clone()),
        );

        Ok(Invocation::new(&self.command, &self.workdir)?
            .args(["up", "-d"])
            .args(group.names())
            .env(env))
    }
}

impl<R: CommandRunner> ContainerBackend for ComposeBackend<R> {
    async fn up(&self, group: &ServiceGroup) -> anyhow::Result<()> {
        let invocation = self.invocation(group)?;
        self.runner.run(&invocation).await
    }
}

/// Starts service groups and logs what was started.
#[derive(Debug, Clone)]
pub struct ServiceLauncher<B> {
    backend: B,
}

impl<B: ContainerBackend> ServiceLauncher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Start every service in `group`. Does not wait for readiness.
    pub async fn launch(&self, group: &ServiceGroup) -> anyhow::Result<()> {
        if group.is_empty() {
            tracing::debug!("No services to launch");
            return Ok(());
        }

        tracing::info!(services = %group, "Starting services");
        self.backend
            .up(group)
            .await
            .with_context(|| format!("Failed to start services: {group}"))?;
        tracing::debug!(services = %group, "Services started");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::services::{L1Service, OpBatcherService, OpProposerService};

    #[derive(Default)]
    struct RecordingRunner(Mutex<Vec<Invocation>>);

    impl CommandRunner for RecordingRunner {
        async fn run(&self, invocation: &Invocation) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(invocation.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_compose_up() {
        let env: ProcessEnv = [("PATH", "/usr/bin"), ("PWD", "/somewhere/else")]
            .into_iter()
            .collect();
        let backend = ComposeBackend::with_runner(RecordingRunner::default(), "/repo/ops-bedrock", env);
        let launcher = ServiceLauncher::new(backend);

        let group = ServiceGroup::new()
            .with(&OpProposerService::default())
            .with(&OpBatcherService::default());
        launcher.launch(&group).await.unwrap();

        let invocations = launcher.backend().runner.0.lock().unwrap();
        assert_eq!(invocations.len(), 1);

        let invocation = &invocations[0];
        assert_eq!(
            invocation.command_line(),
            "docker-compose up -d op-proposer op-batcher"
        );
        assert_eq!(invocation.cwd, PathBuf::from("/repo/ops-bedrock"));
        assert_eq!(invocation.env["PWD"], "/repo/ops-bedrock");
        assert_eq!(invocation.env["PATH"], "/usr/bin");
        assert_eq!(
            invocation.env["L2OO_ADDRESS"],
            "0x6900000000000000000000000000000000000000"
        );
    }

    #[tokio::test]
    async fn test_custom_compose_command() {
        let backend = ComposeBackend::with_runner(
            RecordingRunner::default(),
            "/repo/ops-bedrock",
            ProcessEnv::default(),
        )
        .with_command(vec!["docker".to_string(), "compose".to_string()]);

        let invocation = backend
            .invocation(&ServiceGroup::new().with(&L1Service))
            .unwrap();
        assert_eq!(invocation.command_line(), "docker compose up -d l1");
    }

    #[tokio::test]
    async fn test_empty_group_is_noop() {
        let launcher = ServiceLauncher::new(ComposeBackend::with_runner(
            RecordingRunner::default(),
            "/repo/ops-bedrock",
            ProcessEnv::default(),
        ));

        launcher.launch(&ServiceGroup::new()).await.unwrap();
        assert!(launcher.backend().runner.0.lock().unwrap().is_empty());
    }
}

//! Read-only view of the Docker daemon: reachability and the state of compose services.

use std::collections::HashMap;

use anyhow::{Context, Result};
use bollard::{Docker, container::ListContainersOptions};
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use derive_more::Deref;

use crate::services::ServiceName;

/// Label compose puts on every container it creates.
pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";

/// Connection to the local Docker daemon.
#[derive(Debug, Clone, Deref)]
pub struct DockerStatus {
    docker: Docker,
}

/// State of the container(s) backing one compose service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceState {
    pub service: ServiceName,
    pub container: Option<String>,
    pub state: Option<String>,
    pub status: Option<String>,
}

impl ServiceState {
    pub fn is_running(&self) -> bool {
        self.state.as_deref() == Some("running")
    }
}

impl DockerStatus {
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .context("Failed to connect to Docker. Is Docker running?")?;
        Ok(Self { docker })
    }

    /// Fail unless the daemon answers a ping.
    pub async fn ping(&self) -> Result<()> {
        let version = self
            .docker
            .ping()
            .await
            .context("Docker daemon is not reachable. Is Docker running?")?;
        tracing::debug!(response = %version, "Docker daemon reachable");
        Ok(())
    }

    /// Look up the container of each service by its compose label.
    pub async fn service_states(&self, services: &[ServiceName]) -> Result<Vec<ServiceState>> {
        let mut states = Vec::with_capacity(services.len());

        for service in services {
            let filters = HashMap::from([(
                "label".to_string(),
                vec![format!("{COMPOSE_SERVICE_LABEL}={service}")],
            )]);

            let containers = self
                .docker
                .list_containers(Some(ListContainersOptions::<String> {
                    all: true,
                    filters,
                    ..Default::default()
                }))
                .await
                .with_context(|| format!("Failed to list containers for {service}"))?;

            let state = match containers.into_iter().next() {
                Some(summary) => ServiceState {
                    service: *service,
                    container: summary
                        .names
                        .and_then(|names| names.into_iter().next())
                        .map(|name| name.trim_start_matches('/').to_string()),
                    state: summary.state,
                    status: summary.status,
                },
                None => ServiceState {
                    service: *service,
                    container: None,
                    state: None,
                    status: None,
                },
            };

            tracing::trace!(?state, "Service state");
            states.push(state);
        }

        Ok(states)
    }
}

/// Render service states as a table for the terminal.
pub fn render_states(states: &[ServiceState]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(vec!["Service", "Container", "State", "Status"]);

    for state in states {
        table.add_row(vec![
            state.service.to_string(),
            state.container.clone().unwrap_or_else(|| "-".to_string()),
            state.state.clone().unwrap_or_else(|| "missing".to_string()),
            state.status.clone().unwrap_or_default(),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_states() {
        let states = vec![
            ServiceState {
                service: ServiceName::L1,
                container: Some("ops-bedrock-l1-1".to_string()),
                state: Some("running".to_string()),
                status: Some("Up 2 minutes".to_string()),
            },
            ServiceState {
                service: ServiceName::OpBatcher,
                container: None,
                state: None,
                status: None,
            },
        ];

        assert!(states[0].is_running());
        assert!(!states[1].is_running());

        let rendered = render_states(&states).to_string();
        assert!(rendered.contains("ops-bedrock-l1-1"));
        assert!(rendered.contains("op-batcher"));
        assert!(rendered.contains("missing"));
    }
}

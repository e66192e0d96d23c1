//! Command builder for the hardhat deployment task.

/// Builder for `hardhat deploy` arguments.
#[derive(Debug, Clone)]
pub struct HardhatDeployCmdBuilder {
    network: String,
    tags: Vec<String>,
}

impl HardhatDeployCmdBuilder {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            tags: Vec::new(),
        }
    }

    /// Restrict the deployment to scripts carrying `tag`.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Vec<String> {
        let mut cmd = vec![
            "--network".to_string(),
            self.network,
            "deploy".to_string(),
        ];

        if !self.tags.is_empty() {
            cmd.push("--tags".to_string());
            cmd.push(self.tags.join(","));
        }

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_cmd() {
        let cmd = HardhatDeployCmdBuilder::new("devnetL1").tag("l1").build();
        assert_eq!(cmd, ["--network", "devnetL1", "deploy", "--tags", "l1"]);
    }

    #[test]
    fn test_deploy_cmd_without_tags() {
        let cmd = HardhatDeployCmdBuilder::new("devnetL1").build();
        assert_eq!(cmd, ["--network", "devnetL1", "deploy"]);
    }
}

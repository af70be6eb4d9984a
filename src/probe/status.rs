use crate::config::DYN_INVENTORY_RELATIVE_PATH;
use crate::execution::{CommandExecutor, CommandSpec, ExecutionError};
use crate::inventory::Inventory;
use crate::types::NodeStatus;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Reachability of every inventory node, in inventory order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    statuses: Vec<(String, NodeStatus)>,
}

impl ProbeReport {
    pub fn new(statuses: Vec<(String, NodeStatus)>) -> Self {
        Self { statuses }
    }

    /// Every node of the inventory marked DOWN.
    pub fn all_down(inventory: &Inventory) -> Self {
        Self::new(
            inventory
                .node_names()
                .map(|name| (name.to_string(), NodeStatus::Down))
                .collect(),
        )
    }

    pub fn status(&self, name: &str) -> NodeStatus {
        self.statuses
            .iter()
            .find(|(node, _)| node == name)
            .map_or(NodeStatus::Down, |(_, status)| *status)
    }

    pub fn all_up(&self) -> bool {
        self.statuses.iter().all(|(_, status)| status.is_up())
    }

    pub fn any_up(&self) -> bool {
        self.statuses.iter().any(|(_, status)| status.is_up())
    }

    pub fn unreachable(&self) -> Vec<String> {
        self.statuses
            .iter()
            .filter(|(_, status)| !status.is_up())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeStatus)> {
        self.statuses.iter().map(|(name, status)| (name.as_str(), *status))
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// Classify the one-line-per-host output of a batched ping.
///
/// A node is UP only when a line reports `<name> | SUCCESS`; everything else
/// stays DOWN, whatever the overall exit code of the batch was.
pub fn parse_ping_output(inventory: &Inventory, output: &str) -> ProbeReport {
    let mut report = ProbeReport::all_down(inventory);

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() > 2 && parts[2] == "SUCCESS" {
            let host = parts[0];
            if let Some(entry) = report.statuses.iter_mut().find(|(name, _)| name == host) {
                entry.1 = NodeStatus::Up;
            }
        }
    }

    report
}

#[async_trait]
pub trait NodeProber: Send + Sync {
    async fn probe_all(&self, inventory: &Inventory) -> Result<ProbeReport, ExecutionError>;
}

/// Probes nodes through the configuration-job runner's ping module.
pub struct AnsibleProber<'a, E: CommandExecutor> {
    executor: &'a E,
    timeout: Duration,
}

impl<'a, E: CommandExecutor> AnsibleProber<'a, E> {
    pub fn new(executor: &'a E, timeout: Duration) -> Self {
        Self { executor, timeout }
    }

    pub fn ping_command(&self, inventory: &Inventory) -> CommandSpec {
        CommandSpec::new("ansible")
            .arg(&inventory.group)
            .args(["-i", DYN_INVENTORY_RELATIVE_PATH, "-m", "ping", "-o", "--timeout"])
            .arg(self.timeout.as_secs().max(1).to_string())
            .capture()
            .allow_failure()
    }

    /// The control node is the local machine in local mode; in remote mode a
    /// non-interactive ssh must get through.
    pub async fn probe_control(&self) -> Result<NodeStatus, ExecutionError> {
        let Some(host) = self.executor.target().control_host() else {
            return Ok(NodeStatus::Up);
        };

        let command = CommandSpec::new("ssh")
            .args(["-o", "BatchMode=yes", "-o"])
            .arg(format!("ConnectTimeout={}", self.timeout.as_secs().max(1)))
            .arg(host)
            .arg("true")
            .capture()
            .allow_failure()
            .on_operator_host();

        let output = self.executor.execute(&command).await?;
        Ok(if output.success() {
            NodeStatus::Up
        } else {
            NodeStatus::Down
        })
    }
}

#[async_trait]
impl<E: CommandExecutor> NodeProber for AnsibleProber<'_, E> {
    async fn probe_all(&self, inventory: &Inventory) -> Result<ProbeReport, ExecutionError> {
        if inventory.is_empty() {
            return Ok(ProbeReport::default());
        }

        let output = self.executor.execute(&self.ping_command(inventory)).await?;
        if !output.success() {
            debug!(
                "Batched ping exited with {}, trusting per-host results",
                output.exit_code
            );
        }

        Ok(parse_ping_output(inventory, &output.stdout))
    }
}

use crate::execution::{CommandExecutor, CommandSpec, ExecutionError};
use crate::hardware::ComputeNode;
use crate::inventory::COMPUTE_GROUP;
use crate::lifecycle::{
    adhoc_shell, parse_broadcast_address, restore_runner_state_ownership, wake_packet,
    ClusterContext, Job, LifecycleError, Result,
};
use crate::probe::{AnsibleProber, NodeProber, ProbeReport, ReachabilityWaiter};
use crate::types::{ClusterStatus, ExecutionTarget, NodeState};
use std::future::Future;
use std::net::IpAddr;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PowerAction {
    Shutdown,
    Reboot,
}

impl PowerAction {
    fn shell_command(self) -> &'static str {
        match self {
            PowerAction::Shutdown => "shutdown now",
            PowerAction::Reboot => "shutdown -r now",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            PowerAction::Shutdown => "shutdown",
            PowerAction::Reboot => "reboot",
        }
    }
}

/// Sequences cluster-wide operations over one executor.
///
/// Every operation either completes or returns the first fatal error; the
/// only tolerated failure is the connection drop caused by powering nodes
/// off.
pub struct Orchestrator<'a, E: CommandExecutor> {
    context: &'a ClusterContext,
    executor: &'a E,
    waiter: ReachabilityWaiter,
}

impl<'a, E: CommandExecutor> Orchestrator<'a, E> {
    pub fn new(context: &'a ClusterContext, executor: &'a E) -> Self {
        Self {
            context,
            executor,
            waiter: ReachabilityWaiter::new(context.config.wait.clone()),
        }
    }

    fn prober(&self) -> AnsibleProber<'a, E> {
        AnsibleProber::new(self.executor, self.context.config.probe_timeout())
    }

    fn job(&self, job: Job) -> CommandSpec {
        job.command(&self.context.layout, self.context.hardware_version())
    }

    async fn run_job(&self, job: Job) -> Result<()> {
        info!("Running {}", job);
        self.executor.execute(&self.job(job)).await?;
        Ok(())
    }

    /// Send a wake packet to every node with a hardware address, then wait
    /// until the whole inventory answers.
    pub async fn wake(&self) -> Result<()> {
        info!("Bringing compute nodes up...");
        let hardware_addresses = self.context.profile.hardware_addresses();
        if hardware_addresses.is_empty() {
            warn!("No hardware addresses in hardware config, cannot wake any compute node");
            return Ok(());
        }

        let broadcast = self.broadcast_address().await?;
        for hardware_address in hardware_addresses {
            info!("Sending wake packet to {} via {}", hardware_address, broadcast);
            self.executor
                .execute(&wake_packet(broadcast, hardware_address))
                .await?;
        }

        self.wait_until_reachable().await?;
        info!("Compute nodes are up");
        Ok(())
    }

    async fn broadcast_address(&self) -> Result<IpAddr> {
        let output = self.executor.execute(&self.job(Job::GetBroadcast)).await?;
        let broadcast = parse_broadcast_address(&output.stdout)?;
        info!("Broadcast address: {}", broadcast);
        Ok(broadcast)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.power(PowerAction::Shutdown).await
    }

    pub async fn reboot(&self) -> Result<()> {
        self.power(PowerAction::Reboot).await
    }

    /// Nodes drop the connection while going down, so a failed exit here is
    /// the normal outcome and not an error.
    async fn power(&self, action: PowerAction) -> Result<()> {
        info!("Requesting {} of all compute nodes...", action.describe());
        let command = adhoc_shell(COMPUTE_GROUP, action.shell_command(), true);

        match self.executor.execute(&command).await {
            Ok(_) => {
                info!("Compute node {} requested", action.describe());
                Ok(())
            }
            Err(ExecutionError::CommandFailed { exit_code, .. }) => {
                info!(
                    "Connection to compute nodes dropped during {} (exit code {}), as expected",
                    action.describe(),
                    exit_code
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the number of probes it took for every node to answer.
    pub async fn wait_until_reachable(&self) -> Result<u32> {
        info!("Waiting for compute nodes to come online...");
        let prober = self.prober();
        let attempts = self
            .waiter
            .wait_until_reachable(&prober, &self.context.inventory)
            .await?;
        Ok(attempts)
    }

    pub async fn configure_compute(&self) -> Result<()> {
        info!("Configuring compute nodes...");
        if let Err(e) = self.wait_until_reachable().await {
            error!("Compute nodes are not up, aborting configuration");
            return Err(e);
        }

        self.run_job(Job::ComputeConfigure).await?;
        info!("Compute node configuration complete");
        Ok(())
    }

    pub async fn test_compute(&self) -> Result<()> {
        self.run_job(Job::ComputeTest).await
    }

    pub async fn configure_control(&self) -> Result<()> {
        info!("Configuring control node...");
        self.run_job(Job::ControlConfigure).await?;
        info!("Control node configuration complete");
        Ok(())
    }

    pub async fn test_control(&self) -> Result<()> {
        self.run_job(Job::ControlTest).await
    }

    pub async fn build_image(&self) -> Result<()> {
        info!("Building compute node image...");
        self.run_job(Job::BuildImage).await?;
        self.executor
            .execute(&restore_runner_state_ownership())
            .await?;
        info!("Compute node image built");
        Ok(())
    }

    pub async fn clean_image(&self) -> Result<()> {
        self.run_job(Job::CleanImage).await
    }

    /// Bring the whole cluster from any state to fully configured: power off
    /// whatever is running, rebuild the image, configure the control node,
    /// wake the compute nodes and configure them.
    pub async fn full_bootstrap(&self) -> Result<()> {
        info!("--- Starting full cluster configuration ---");

        if self.context.inventory.is_empty() {
            info!("No compute nodes defined, skipping shutdown check");
        } else {
            let report = self
                .step("status", async {
                    self.prober()
                        .probe_all(&self.context.inventory)
                        .await
                        .map_err(LifecycleError::from)
                })
                .await?;
            log_report(&report);

            if report.any_up() {
                info!("Some compute nodes are up, shutting them down first");
                self.step("shutdown", self.shutdown()).await?;
            } else {
                info!("All compute nodes are already down");
            }
        }

        self.step("build-image", self.build_image()).await?;
        self.step("configure-control", self.configure_control())
            .await?;
        self.step("wake", self.wake()).await?;
        self.step("configure-compute", self.configure_compute())
            .await?;

        info!("--- Full cluster configuration complete ---");
        Ok(())
    }

    async fn step<T, F>(&self, name: &'static str, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        info!("Step: {}", name);
        operation.await.map_err(|e| {
            error!("Step '{}' failed: {}", name, e);
            LifecycleError::Step {
                step: name,
                source: Box::new(e),
            }
        })
    }

    /// Reachability of the control host and of every compute node. When the
    /// control host is remote and unreachable, compute nodes cannot be probed
    /// through it and are reported DOWN.
    pub async fn status(&self) -> Result<ClusterStatus> {
        let prober = self.prober();
        let control = prober.probe_control().await?;

        let inventory = &self.context.inventory;
        let report = if control.is_up() {
            prober.probe_all(inventory).await?
        } else {
            warn!(
                "Control host {} is unreachable, not probing compute nodes",
                self.context.profile.control_host
            );
            ProbeReport::all_down(inventory)
        };

        Ok(ClusterStatus {
            control_host: self.context.profile.control_host.clone(),
            control,
            nodes: inventory
                .hosts
                .iter()
                .map(|host| NodeState {
                    name: host.name.clone(),
                    address: host.address.clone(),
                    status: report.status(&host.name),
                })
                .collect(),
        })
    }

    fn compute_node(&self, index: usize) -> Result<&'a ComputeNode> {
        let profile = &self.context.profile;
        profile.node(index).ok_or(LifecycleError::InvalidNodeIndex {
            index,
            count: profile.compute_nodes.len(),
        })
    }

    /// Run a shell command on one compute node, streaming its output.
    pub async fn compute_command(&self, index: usize, command: &str) -> Result<()> {
        let node = self.compute_node(index)?;
        info!("Running on {}: {}", node.name, command);
        self.executor
            .execute(&adhoc_shell(&node.name, command, false))
            .await?;
        Ok(())
    }

    /// Run a shell command on the control node, in the project directory.
    pub async fn control_command(&self, command: &str) -> Result<()> {
        self.executor.execute(&CommandSpec::shell(command)).await?;
        Ok(())
    }

    /// Interactive session on a compute node, hopping through the control
    /// host when it is remote.
    pub async fn compute_shell(&self, index: usize) -> Result<()> {
        let node = self.compute_node(index)?;
        let command = match self.executor.target() {
            ExecutionTarget::Remote { control_host } => CommandSpec::new("ssh")
                .arg("-t")
                .arg(control_host)
                .arg(format!("ssh {}", node.name)),
            ExecutionTarget::Local => CommandSpec::new("ssh").arg(&node.name),
        };

        self.interactive(command).await
    }

    pub async fn control_shell(&self) -> Result<()> {
        match self.executor.target() {
            ExecutionTarget::Remote { control_host } => {
                self.interactive(CommandSpec::new("ssh").arg(control_host))
                    .await
            }
            ExecutionTarget::Local => {
                warn!("Already on the control node, not opening a session");
                Ok(())
            }
        }
    }

    /// The exit code of an interactive session is whatever the operator last
    /// ran, so it is not treated as a failure.
    async fn interactive(&self, command: CommandSpec) -> Result<()> {
        let output = self
            .executor
            .execute(&command.allow_failure().on_operator_host())
            .await?;
        if !output.success() {
            info!("Session ended with exit code {}", output.exit_code);
        }
        Ok(())
    }
}

fn log_report(report: &ProbeReport) {
    for (name, status) in report.iter() {
        info!("  {}: {}", name, status);
    }
}

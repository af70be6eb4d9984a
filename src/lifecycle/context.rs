use crate::config::{ClusterConfig, ProjectLayout};
use crate::hardware::{load_active_profile, HardwareProfile};
use crate::inventory::{Inventory, InventorySynthesizer};
use crate::lifecycle::Result;
use crate::types::ExecutionTarget;
use tracing::debug;

/// Everything an invocation needs to know about the cluster, built once at
/// process entry and passed down explicitly.
#[derive(Debug, Clone)]
pub struct ClusterContext {
    pub config: ClusterConfig,
    pub layout: ProjectLayout,
    pub profile: HardwareProfile,
    pub inventory: Inventory,
}

impl ClusterContext {
    pub fn new(
        config: ClusterConfig,
        layout: ProjectLayout,
        profile: HardwareProfile,
        inventory: Inventory,
    ) -> Self {
        Self {
            config,
            layout,
            profile,
            inventory,
        }
    }

    /// Load the active hardware profile and regenerate the compute inventory.
    pub fn load(layout: ProjectLayout, config: ClusterConfig) -> Result<Self> {
        let profile = load_active_profile(&layout, &config.default_control_host)?;
        debug!(
            "Loaded hardware profile {} with {} compute nodes",
            profile.version,
            profile.compute_nodes.len()
        );

        let inventory = InventorySynthesizer::new(config.login_user.as_str())
            .generate(&profile, &layout)?;

        Ok(Self::new(config, layout, profile, inventory))
    }

    pub fn hardware_version(&self) -> &str {
        &self.profile.version
    }

    pub fn execution_target(&self, remote: bool) -> ExecutionTarget {
        ExecutionTarget::from_switch(remote, &self.profile.control_host)
    }
}

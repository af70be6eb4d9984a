use crate::config::ProjectLayout;
use crate::hardware::HardwareProfile;
use crate::inventory::{InventoryError, TemplateVariables};
use handlebars::Handlebars;
use std::path::Path;
use tracing::{debug, info};

pub const COMPUTE_GROUP: &str = "compute";

/// Concrete host list derived from a hardware profile.
///
/// Never cached between invocations: it is rebuilt from the profile every
/// time a node-addressed operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub group: String,
    pub hosts: Vec<InventoryHost>,
    pub group_vars: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryHost {
    pub name: String,
    pub address: String,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(|host| host.name.as_str())
    }

    pub fn host(&self, name: &str) -> Option<&InventoryHost> {
        self.hosts.iter().find(|host| host.name == name)
    }

    /// Render in the job runner's INI format: the node group followed by its
    /// group-variable block.
    pub fn render(&self) -> String {
        let mut out = format!("[{}]\n", self.group);
        for host in &self.hosts {
            out.push_str(&format!("{} ansible_host={}\n", host.name, host.address));
        }
        out.push_str(&format!("\n[{}:vars]\n", self.group));
        for (key, value) in &self.group_vars {
            out.push_str(&format!("{key}={value}\n"));
        }
        out
    }
}

pub struct InventorySynthesizer {
    handlebars: Handlebars<'static>,
    login_user: String,
}

impl InventorySynthesizer {
    pub fn new(login_user: impl Into<String>) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        Self {
            handlebars,
            login_user: login_user.into(),
        }
    }

    /// Resolve every node's address template. Pure: the same profile and
    /// variables always produce the same inventory.
    pub fn synthesize(
        &self,
        profile: &HardwareProfile,
        variables: &TemplateVariables,
    ) -> Result<Inventory, InventoryError> {
        let mut hosts = Vec::with_capacity(profile.compute_nodes.len());

        for node in &profile.compute_nodes {
            let address = self
                .handlebars
                .render_template(&node.address_template, variables.as_value())
                .map_err(|e| InventoryError::TemplateResolution {
                    node: node.name.clone(),
                    template: node.address_template.clone(),
                    reason: e.to_string(),
                })?;
            let address = address.trim().to_string();
            debug!("Resolved {} -> {}", node.name, address);

            hosts.push(InventoryHost {
                name: node.name.clone(),
                address,
            });
        }

        Ok(Inventory {
            group: COMPUTE_GROUP.to_string(),
            hosts,
            group_vars: vec![("ansible_user".to_string(), self.login_user.clone())],
        })
    }

    /// Overwrite `path` with the rendered inventory.
    pub fn write(&self, inventory: &Inventory, path: &Path) -> Result<(), InventoryError> {
        let write_failed = |source| InventoryError::WriteFailed {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        std::fs::write(path, inventory.render()).map_err(write_failed)?;

        info!(
            "Inventory written to {} with {} hosts",
            path.display(),
            inventory.hosts.len()
        );
        Ok(())
    }

    /// Load the shared template variables, synthesize, and write the
    /// inventory to its well-known location.
    pub fn generate(
        &self,
        profile: &HardwareProfile,
        layout: &ProjectLayout,
    ) -> Result<Inventory, InventoryError> {
        let variables = TemplateVariables::load(&layout.template_vars())?;
        let inventory = self.synthesize(profile, &variables)?;
        self.write(&inventory, &layout.dyn_inventory())?;
        Ok(inventory)
    }
}

use std::path::{Path, PathBuf};

pub const HARDWARE_VERSION_FILE: &str = ".hardware_version";
pub const ANSIBLE_DIR: &str = "ansible";
pub const DYN_INVENTORY_RELATIVE_PATH: &str = "ansible/inventory.dyn";

/// Well-known paths inside a cluster project.
///
/// Paths handed to the job runner are relative to the project root because
/// the same relative path is valid locally and inside the staged copy on the
/// control host.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn hardware_version_file(&self) -> PathBuf {
        self.root.join(HARDWARE_VERSION_FILE)
    }

    pub fn hardware_profile(&self, version: &str) -> PathBuf {
        self.root
            .join(ANSIBLE_DIR)
            .join("hardware_vars")
            .join(format!("{version}.yml"))
    }

    pub fn template_vars(&self) -> PathBuf {
        self.root.join(ANSIBLE_DIR).join("vars").join("main.yml")
    }

    pub fn dyn_inventory(&self) -> PathBuf {
        self.root.join(DYN_INVENTORY_RELATIVE_PATH)
    }

    pub fn dyn_inventory_relative(&self) -> &'static str {
        DYN_INVENTORY_RELATIVE_PATH
    }

    /// Static, project-provided inventory used by control-side jobs.
    pub fn control_inventory_relative(&self, version: &str) -> String {
        format!("{ANSIBLE_DIR}/inventory/{version}/hosts.ini")
    }

    pub fn playbook_relative(&self, file: &str) -> String {
        format!("{ANSIBLE_DIR}/{file}")
    }
}

use crate::config::ProjectLayout;
use crate::hardware::{read_active_version, HardwareError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::ErrorKind;
use tracing::{debug, info};

/// One hardware revision of the cluster: who the control host is and which
/// compute nodes exist.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareProfile {
    pub version: String,
    pub control_host: String,
    pub compute_nodes: Vec<ComputeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeNode {
    pub name: String,
    /// Address, possibly containing `{{ variable }}` placeholders.
    #[serde(rename = "ip")]
    pub address_template: String,
    /// Hardware (MAC) address used for Wake-on-LAN.
    #[serde(default, rename = "mac")]
    pub hardware_address: Option<String>,
}

/// On-disk shape of `hardware_vars/<version>.yml`. Keys consumed only by the
/// playbooks are ignored.
#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    control_host: Option<String>,
    #[serde(default)]
    compute_nodes: Option<Vec<ComputeNode>>,
}

impl HardwareProfile {
    pub fn load(layout: &ProjectLayout, version: &str, default_control_host: &str) -> Result<Self> {
        let path = layout.hardware_profile(version);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(HardwareError::ProfileMissing {
                    version: version.to_string(),
                    path: path.display().to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let profile = Self::parse(version, &content, default_control_host).map_err(|e| match e {
            HardwareError::InvalidProfile { reason, .. } => HardwareError::InvalidProfile {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        info!(
            "Loaded hardware profile '{}' ({} compute nodes, control host '{}')",
            profile.version,
            profile.compute_nodes.len(),
            profile.control_host
        );
        Ok(profile)
    }

    pub fn parse(version: &str, content: &str, default_control_host: &str) -> Result<Self> {
        // An empty document is a profile with no nodes, not an error.
        let file: Option<ProfileFile> =
            serde_yaml::from_str(content).map_err(|e| HardwareError::InvalidProfile {
                path: format!("<{version}>"),
                reason: e.to_string(),
            })?;
        let file = file.unwrap_or(ProfileFile {
            control_host: None,
            compute_nodes: None,
        });

        let profile = Self {
            version: version.to_string(),
            control_host: file
                .control_host
                .filter(|host| !host.trim().is_empty())
                .unwrap_or_else(|| default_control_host.to_string()),
            compute_nodes: file.compute_nodes.unwrap_or_default(),
        };
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for node in &self.compute_nodes {
            if node.name.trim().is_empty() {
                return Err(HardwareError::InvalidProfile {
                    path: format!("<{}>", self.version),
                    reason: "compute node with empty name".to_string(),
                });
            }
            if !seen.insert(node.name.as_str()) {
                return Err(HardwareError::DuplicateNode {
                    name: node.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Hardware addresses of every node that has one, in node order.
    pub fn hardware_addresses(&self) -> Vec<&str> {
        self.compute_nodes
            .iter()
            .filter_map(|node| node.hardware_address.as_deref())
            .filter(|mac| !mac.trim().is_empty())
            .collect()
    }

    pub fn node(&self, index: usize) -> Option<&ComputeNode> {
        self.compute_nodes.get(index)
    }
}

/// Resolve the active version and load its profile.
pub fn load_active_profile(
    layout: &ProjectLayout,
    default_control_host: &str,
) -> Result<HardwareProfile> {
    let version = read_active_version(layout)?;
    debug!("Active hardware version: {}", version);
    HardwareProfile::load(layout, &version, default_control_host)
}

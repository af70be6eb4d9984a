use crate::config::ProjectLayout;
use crate::hardware::{HardwareError, Result};
use std::io::ErrorKind;
use tracing::info;

/// Read the active hardware version from the selector file.
pub fn read_active_version(layout: &ProjectLayout) -> Result<String> {
    let path = layout.hardware_version_file();
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(HardwareError::VersionFileMissing {
                path: path.display().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let version = content.trim();
    if version.is_empty() {
        return Err(HardwareError::EmptyVersion {
            path: path.display().to_string(),
        });
    }
    Ok(version.to_string())
}

/// Select `version` as the active hardware version.
///
/// Refuses versions that have no profile file so that a typo cannot leave the
/// project pointing at nothing.
pub fn write_active_version(layout: &ProjectLayout, version: &str) -> Result<()> {
    let version = version.trim();
    let profile_path = layout.hardware_profile(version);
    if version.is_empty() || !profile_path.is_file() {
        return Err(HardwareError::ProfileMissing {
            version: version.to_string(),
            path: profile_path.display().to_string(),
        });
    }

    std::fs::write(layout.hardware_version_file(), version)?;
    info!("Hardware version set to '{}'", version);
    Ok(())
}

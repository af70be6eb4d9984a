use thiserror::Error;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error(
        "Hardware version file not found at {path}. \
         Run 'cluster hardware set <version>' to configure the target hardware"
    )]
    VersionFileMissing { path: String },

    #[error("Hardware version file {path} is empty")]
    EmptyVersion { path: String },

    #[error("Hardware config file not found for version '{version}' at {path}")]
    ProfileMissing { version: String, path: String },

    #[error("Invalid hardware config {path}: {reason}")]
    InvalidProfile { path: String, reason: String },

    #[error("Duplicate compute node name in hardware config: {name}")]
    DuplicateNode { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HardwareError>;

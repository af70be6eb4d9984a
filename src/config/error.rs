use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid settings file {path}: {reason}")]
    InvalidSettings { path: String, reason: String },

    #[error("Invalid setting {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

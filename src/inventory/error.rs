use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Cannot resolve address template '{template}' for node {node}: {reason}")]
    TemplateResolution {
        node: String,
        template: String,
        reason: String,
    },

    #[error("Invalid template variables file {path}: {reason}")]
    InvalidVariables { path: String, reason: String },

    #[error("Failed to write inventory {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

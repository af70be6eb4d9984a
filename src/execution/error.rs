use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Command `{command}` failed with exit code {exit_code}")]
    CommandFailed {
        exit_code: i32,
        command: String,
        stdout: String,
        stderr: String,
    },

    #[error("Staging project to {host} failed during {step}: {reason}")]
    StagingFailed {
        host: String,
        step: String,
        reason: String,
    },

    #[error("Required tool not found in PATH: {tool}")]
    ToolNotFound { tool: String },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecutionError {
    /// Exit code of the failed command, if this is a command failure.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionError::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;

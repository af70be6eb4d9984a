use crate::execution::ExecutionError;
use crate::hardware::HardwareError;
use crate::inventory::InventoryError;
use crate::probe::ProbeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Could not parse broadcast address from job output: {reason}")]
    BroadcastParse { reason: String },

    #[error("Invalid node index {index}: hardware config defines {count} compute nodes")]
    InvalidNodeIndex { index: usize, count: usize },

    #[error("Step '{step}' failed")]
    Step {
        step: &'static str,
        #[source]
        source: Box<LifecycleError>,
    },
}

impl LifecycleError {
    /// Process exit code for this failure. A failed command's own exit code
    /// is passed through when it is a valid process status.
    pub fn exit_code(&self) -> i32 {
        let code = match self {
            LifecycleError::Execution(e) | LifecycleError::Probe(ProbeError::Execution(e)) => {
                e.exit_code()
            }
            LifecycleError::Step { source, .. } => return source.exit_code(),
            _ => None,
        };

        match code {
            Some(code) if (1..=255).contains(&code) => code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

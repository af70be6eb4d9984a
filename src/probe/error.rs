use crate::execution::ExecutionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(
        "Not all compute nodes were reachable after {attempts} attempts; unreachable: {}",
        unreachable.join(", ")
    )]
    ReachabilityTimeout {
        attempts: u32,
        unreachable: Vec<String>,
    },

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

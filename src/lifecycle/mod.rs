//! Cluster-wide operations sequenced on top of profile, inventory, executor
//! and prober.

pub mod broadcast;
pub mod context;
pub mod error;
pub mod jobs;
pub mod orchestrator;

pub use broadcast::*;
pub use context::*;
pub use error::*;
pub use jobs::*;
pub use orchestrator::*;

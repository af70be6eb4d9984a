//! Cluster lifecycle orchestration
//!
//! Derives a compute-node inventory from the active hardware profile, runs
//! commands locally or on a remote control host, waits for node reachability
//! and sequences cluster-wide transitions such as power cycling and full
//! configuration.

pub mod cli;
pub mod config;
pub mod execution;
pub mod hardware;
pub mod inventory;
pub mod lifecycle;
pub mod probe;
pub mod types;

pub use lifecycle::{ClusterContext, LifecycleError, Orchestrator};
pub use types::*;

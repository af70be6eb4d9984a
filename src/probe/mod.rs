//! Node reachability: one batched probe, and a bounded wait built on it.

pub mod error;
pub mod status;
pub mod waiter;

pub use error::*;
pub use status::*;
pub use waiter::*;

//! Uniform command dispatch, locally or on the control host.

pub mod command;
pub mod error;
pub mod executor;

pub use command::*;
pub use error::*;
pub use executor::*;

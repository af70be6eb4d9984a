//! Tool settings and the on-disk layout of a cluster project.

pub mod error;
pub mod layout;
pub mod settings;

pub use error::*;
pub use layout::*;
pub use settings::*;

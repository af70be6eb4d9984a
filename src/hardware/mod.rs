pub mod error;
pub mod profile;
pub mod version;

pub use error::*;
pub use profile::*;
pub use version::*;

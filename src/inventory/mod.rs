pub mod error;
pub mod synthesizer;
pub mod variables;

pub use error::*;
pub use synthesizer::*;
pub use variables::*;

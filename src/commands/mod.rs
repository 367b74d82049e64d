//! Command implementations for the lpcheck CLI

mod analyze;
mod learn;
mod misc;
mod serve;

pub use analyze::*;
pub use learn::*;
pub use misc::*;
pub use serve::*;

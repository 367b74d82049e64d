pub mod analyze;
pub mod cli;
pub mod config;
pub mod error;
pub mod explain;
pub mod features;
pub mod feedback;
pub mod fetch;
pub mod keywords;
pub mod learn;
pub mod score;
pub mod server;

pub use error::{LpError, Result};

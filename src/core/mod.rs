pub mod config;
pub mod error;
pub mod types;

pub use config::{AgentConfig, FlagOverrides, LogMode};
pub use error::{AgentError, Result};

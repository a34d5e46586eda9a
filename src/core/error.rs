use thiserror::Error;

use crate::battle::ai::validation::RejectReason;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("oracle_unavailable")]
    OracleUnavailable,

    /// No usable JSON object in the oracle's reply
    #[error("{0}")]
    MalformedResponse(String),

    #[error("{0}")]
    ValidationFailed(RejectReason),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl From<RejectReason> for AgentError {
    fn from(reason: RejectReason) -> Self {
        AgentError::ValidationFailed(reason)
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;

//! Application-wide error types.

use thiserror::Error;

use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("blackboard error: {0}")]
    Blackboard(String),

    #[error("frame error: {0}")]
    Frame(String),

    #[error("chunk index error: {0}")]
    Index(String),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("llm provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

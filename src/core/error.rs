//! Application-wide error types.

use thiserror::Error;

use crate::llm::ProviderError;
use crate::subsystems::extract::ExtractError;
use crate::subsystems::search::SearchError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("missing environment variable: {0}")]
    MissingEnv(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("llm error: {0}")]
    Llm(#[from] ProviderError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error("extract error: {0}")]
    Extract(#[from] ExtractError),

    #[error("agent error: {0}")]
    Agent(String),

    #[error("interrupted")]
    Interrupted,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

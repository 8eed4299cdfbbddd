//! LLM provider implementations.
//!
//! `build(config, credentials)` is the factory: called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod openai_compatible;

use crate::config::{LlmConfig, LlmCredentials};
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and environment-sourced credentials.
///
/// `credentials` comes from `Config::require_llm` and is only needed by the
/// OpenAI-compatible backend.
pub fn build(
    config: &LlmConfig,
    credentials: Option<LlmCredentials>,
) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "openai" | "openai-compatible" => {
            let creds = credentials
                .ok_or_else(|| ProviderError::MissingCredentials(config.provider.clone()))?;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                creds.chat_url,
                creds.model,
                config.openai.temperature,
                config.openai.timeout_seconds,
                Some(creds.api_key),
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

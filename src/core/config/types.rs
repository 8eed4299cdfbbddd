//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs that commands consume.
//! Raw TOML deserialization types live in `raw.rs`; environment lookups
//! live in `env.rs`.

use std::path::PathBuf;

use crate::core::secret::{self, SecretString};
use crate::error::AppError;

use super::env::{EnvVars, LLM_API_KEY, LLM_BASE_URL, LLM_MODEL_ID, TAVILY_API_KEY};

// ── LLM ──────────────────────────────────────────────────────────────────────

/// Non-secret tuning for the OpenAI-compatible provider (`[llm.openai]`).
/// Endpoint and model come from `LLM_BASE_URL` / `LLM_MODEL_ID`.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"openai"`, `"openai-compatible"`, `"dummy"`).
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Everything needed to reach an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct LlmCredentials {
    pub api_key: SecretString,
    /// Full chat completions URL derived from `LLM_BASE_URL`.
    pub chat_url: String,
    pub model: String,
}

// ── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_url: String,
    pub max_results: usize,
    /// `"basic"` or `"advanced"`.
    pub search_depth: String,
    pub include_answer: bool,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Which provider is active (`"tavily"`, `"dummy"`).
    pub provider: String,
    pub tavily: TavilyConfig,
}

// ── Extract ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Directory Markdown files are written to (already expanded, no `~`).
    pub output_dir: PathBuf,
    pub timeout_seconds: u64,
}

// ── Top-level ────────────────────────────────────────────────────────────────

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub agent_name: String,
    pub log_level: String,
    /// Optional log file, written in addition to stderr.
    pub log_file: Option<PathBuf>,
    /// Directory holding prompt templates.
    pub prompts_dir: PathBuf,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub extract: ExtractConfig,
    /// Environment snapshot taken at startup. Holds every credential.
    pub env: EnvVars,
}

/// One line of the `check` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvStatus {
    pub name: &'static str,
    pub present: bool,
    /// Masked for secrets, verbatim for the URL and model id.
    pub display: Option<String>,
}

impl Config {
    /// Tavily key, or `MissingEnv` when unset.
    pub fn require_search(&self) -> Result<&SecretString, AppError> {
        self.env
            .tavily_api_key
            .as_ref()
            .ok_or_else(|| AppError::MissingEnv(TAVILY_API_KEY.to_string()))
    }

    /// Key, chat URL and model for the LLM. Reports the first missing
    /// variable in declaration order.
    pub fn require_llm(&self) -> Result<LlmCredentials, AppError> {
        let api_key = self
            .env
            .llm_api_key
            .clone()
            .ok_or_else(|| AppError::MissingEnv(LLM_API_KEY.to_string()))?;
        let base = self
            .env
            .llm_base_url
            .as_deref()
            .ok_or_else(|| AppError::MissingEnv(LLM_BASE_URL.to_string()))?;
        let model = self
            .env
            .llm_model_id
            .clone()
            .ok_or_else(|| AppError::MissingEnv(LLM_MODEL_ID.to_string()))?;
        let chat_url = chat_completions_url(base)?;
        Ok(LlmCredentials { api_key, chat_url, model })
    }

    /// Status of all four variables, in declaration order.
    pub fn env_report(&self) -> Vec<EnvStatus> {
        let e = &self.env;
        vec![
            EnvStatus {
                name: TAVILY_API_KEY,
                present: e.tavily_api_key.is_some(),
                display: e.tavily_api_key.as_ref().map(secret::masked),
            },
            EnvStatus {
                name: LLM_API_KEY,
                present: e.llm_api_key.is_some(),
                display: e.llm_api_key.as_ref().map(secret::masked),
            },
            EnvStatus {
                name: LLM_BASE_URL,
                present: e.llm_base_url.is_some(),
                display: e.llm_base_url.clone(),
            },
            EnvStatus {
                name: LLM_MODEL_ID,
                present: e.llm_model_id.is_some(),
                display: e.llm_model_id.clone(),
            },
        ]
    }
}

/// Resolve the chat completions endpoint from a base URL.
///
/// `https://api.openai.com/v1` → `https://api.openai.com/v1/chat/completions`.
/// A value that already names the endpoint is kept as-is.
pub fn chat_completions_url(base: &str) -> Result<String, AppError> {
    let parsed = reqwest::Url::parse(base)
        .map_err(|e| AppError::Config(format!("{LLM_BASE_URL} is not a valid URL ({e})")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Config(format!(
            "{LLM_BASE_URL} must use http or https, got '{}'",
            parsed.scheme()
        )));
    }

    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/chat/completions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_endpoint() {
        assert_eq!(
            chat_completions_url("https://api.openai.com/v1").unwrap(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(
            chat_completions_url("http://localhost:11434/v1/").unwrap(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn full_endpoint_kept() {
        assert_eq!(
            chat_completions_url("https://example.com/v1/chat/completions").unwrap(),
            "https://example.com/v1/chat/completions"
        );
    }

    #[test]
    fn relative_url_rejected() {
        let err = chat_completions_url("api.openai.com/v1").unwrap_err();
        assert!(err.to_string().contains("LLM_BASE_URL"));
    }

    #[test]
    fn non_http_scheme_rejected() {
        let err = chat_completions_url("ftp://example.com/v1").unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }
}

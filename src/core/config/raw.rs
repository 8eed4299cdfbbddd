//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape: serde target before resolution.
#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub agent: RawAgent,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub search: RawSearch,
    #[serde(default)]
    pub extract: RawExtract,
}

#[derive(Deserialize)]
pub(super) struct RawAgent {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: String,
}

impl Default for RawAgent {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            log_file: None,
            prompts_dir: default_prompts_dir(),
        }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAiConfig {
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

// ── Search ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawSearch {
    #[serde(rename = "default", default = "default_search_provider")]
    pub provider: String,
    #[serde(default)]
    pub tavily: RawTavily,
}

impl Default for RawSearch {
    fn default() -> Self {
        Self { provider: default_search_provider(), tavily: RawTavily::default() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawTavily {
    #[serde(default = "default_tavily_api_url")]
    pub api_url: String,
    #[serde(default = "default_tavily_max_results")]
    pub max_results: usize,
    #[serde(default = "default_tavily_search_depth")]
    pub search_depth: String,
    #[serde(default)]
    pub include_answer: bool,
    #[serde(default = "default_tavily_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawTavily {
    fn default() -> Self {
        Self {
            api_url: default_tavily_api_url(),
            max_results: default_tavily_max_results(),
            search_depth: default_tavily_search_depth(),
            include_answer: false,
            timeout_seconds: default_tavily_timeout_seconds(),
        }
    }
}

// ── Extract ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawExtract {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_extract_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawExtract {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            timeout_seconds: default_extract_timeout_seconds(),
        }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub(super) fn default_agent_name() -> String {
    "first-agent".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_prompts_dir() -> String {
    "config/prompts".to_string()
}

pub(super) fn default_llm_provider() -> String {
    "openai".to_string()
}

pub(super) fn default_openai_temperature() -> f32 {
    0.2
}

pub(super) fn default_openai_timeout_seconds() -> u64 {
    60
}

pub(super) fn default_search_provider() -> String {
    "tavily".to_string()
}

pub(super) fn default_tavily_api_url() -> String {
    "https://api.tavily.com/search".to_string()
}

pub(super) fn default_tavily_max_results() -> usize {
    5
}

pub(super) fn default_tavily_search_depth() -> String {
    "basic".to_string()
}

pub(super) fn default_tavily_timeout_seconds() -> u64 {
    15
}

pub(super) fn default_output_dir() -> String {
    "output".to_string()
}

pub(super) fn default_extract_timeout_seconds() -> u64 {
    30
}

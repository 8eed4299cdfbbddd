//! Environment snapshot.
//!
//! The process environment is read exactly once, at startup, into
//! [`EnvVars`]. Tests build it from a closure instead of mutating the real
//! environment.

use crate::core::secret::{self, SecretString};

pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";
pub const LLM_API_KEY: &str = "LLM_API_KEY";
pub const LLM_BASE_URL: &str = "LLM_BASE_URL";
pub const LLM_MODEL_ID: &str = "LLM_MODEL_ID";

pub const LOG_LEVEL_OVERRIDE: &str = "FIRST_AGENT_LOG_LEVEL";
pub const OUTPUT_DIR_OVERRIDE: &str = "FIRST_AGENT_OUTPUT_DIR";

/// The four required variables, in the order they are reported.
pub const REQUIRED: [&str; 4] = [TAVILY_API_KEY, LLM_API_KEY, LLM_BASE_URL, LLM_MODEL_ID];

#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    pub tavily_api_key: Option<SecretString>,
    pub llm_api_key: Option<SecretString>,
    pub llm_base_url: Option<String>,
    pub llm_model_id: Option<String>,
    pub log_level: Option<String>,
    pub output_dir: Option<String>,
}

impl EnvVars {
    pub fn from_process() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any `name -> value` lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let plain = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            tavily_api_key: lookup(TAVILY_API_KEY).and_then(secret::from_env_value),
            llm_api_key: lookup(LLM_API_KEY).and_then(secret::from_env_value),
            llm_base_url: plain(LLM_BASE_URL),
            llm_model_id: plain(LLM_MODEL_ID),
            log_level: plain(LOG_LEVEL_OVERRIDE),
            output_dir: plain(OUTPUT_DIR_OVERRIDE),
        }
    }

    /// Names of required variables that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        let present = [
            self.tavily_api_key.is_some(),
            self.llm_api_key.is_some(),
            self.llm_base_url.is_some(),
            self.llm_model_id.is_some(),
        ];
        REQUIRED
            .iter()
            .zip(present)
            .filter(|(_, p)| !p)
            .map(|(name, _)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> EnvVars {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvVars::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn all_set_none_missing() {
        let env = env_of(&[
            (TAVILY_API_KEY, "tvly-123"),
            (LLM_API_KEY, "sk-123"),
            (LLM_BASE_URL, "https://api.example.com/v1"),
            (LLM_MODEL_ID, "gpt-4o-mini"),
        ]);
        assert!(env.missing().is_empty());
        assert_eq!(env.llm_model_id.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn blank_counts_as_missing() {
        let env = env_of(&[
            (TAVILY_API_KEY, "  "),
            (LLM_API_KEY, "sk-123"),
            (LLM_BASE_URL, ""),
            (LLM_MODEL_ID, "m"),
        ]);
        assert_eq!(env.missing(), vec![TAVILY_API_KEY, LLM_BASE_URL]);
    }

    #[test]
    fn nothing_set_reports_all_in_order() {
        let env = env_of(&[]);
        assert_eq!(env.missing(), REQUIRED.to_vec());
    }

    #[test]
    fn values_are_trimmed() {
        let env = env_of(&[(LLM_MODEL_ID, " qwen2.5 \n"), (LOG_LEVEL_OVERRIDE, " debug ")]);
        assert_eq!(env.llm_model_id.as_deref(), Some("qwen2.5"));
        assert_eq!(env.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn debug_output_has_no_secret() {
        let env = env_of(&[
            (TAVILY_API_KEY, "tvly-super-secret"),
            (LLM_API_KEY, "sk-super-secret"),
        ]);
        let dbg = format!("{env:?}");
        assert!(!dbg.contains("super-secret"));
    }
}

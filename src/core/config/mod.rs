//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! when present, then layers the process environment on top.
//!
//! # Module layout
//!
//! - **env**: one-shot snapshot of the environment (`EnvVars`), including
//!   the four credentials: `TAVILY_API_KEY`, `LLM_API_KEY`, `LLM_BASE_URL`,
//!   `LLM_MODEL_ID`.
//! - **types**: Public configuration structs consumed by commands
//!   (`Config`, `LlmConfig`, `SearchConfig`, etc.).
//! - **raw**: Raw TOML deserialization types (`RawConfig`, `RawLlm`, …).
//!   These mirror the file shape and use serde defaults; kept private.
//! - **load**: Loading logic: `merge_toml`, `load_raw_merged`, `load`,
//!   `load_from`, `defaults`, `expand_home`.

mod env;
mod load;
mod raw;
mod types;

pub use env::*;
pub use load::{defaults, expand_home, load, load_from};
pub use types::*;

#[cfg(test)]
impl Config {
    /// `Config` for unit tests, wired to the dummy providers.
    pub fn test_default(work_dir: &std::path::Path) -> Self {
        Self {
            agent_name: "test".into(),
            log_level: "info".into(),
            log_file: None,
            prompts_dir: work_dir.join("prompts"),
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig { temperature: 0.0, timeout_seconds: 1 },
            },
            search: SearchConfig {
                provider: "dummy".into(),
                tavily: TavilyConfig {
                    api_url: "http://localhost:0/search".into(),
                    max_results: 3,
                    search_depth: "basic".into(),
                    include_answer: false,
                    timeout_seconds: 1,
                },
            },
            extract: ExtractConfig { output_dir: work_dir.join("output"), timeout_seconds: 1 },
            env: EnvVars::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::secret::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const MINIMAL_TOML: &str = r#"
[agent]
name = "test-agent"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn env_of(pairs: &[(&str, &str)]) -> EnvVars {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvVars::from_lookup(|name| map.get(name).cloned())
    }

    fn full_env() -> EnvVars {
        env_of(&[
            (TAVILY_API_KEY, "tvly-0123456789"),
            (LLM_API_KEY, "sk-0123456789wxyz"),
            (LLM_BASE_URL, "https://llm.example.com/v1"),
            (LLM_MODEL_ID, "gpt-4o-mini"),
        ])
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), EnvVars::default()).unwrap();
        assert_eq!(cfg.agent_name, "test-agent");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.search.provider, "tavily");
        assert_eq!(cfg.search.tavily.max_results, 5);
        assert_eq!(cfg.llm.provider, "openai");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let f = write_toml("");
        let cfg = load_from(f.path(), EnvVars::default()).unwrap();
        assert_eq!(cfg.agent_name, "first-agent");
        assert_eq!(cfg.extract.timeout_seconds, 30);
        assert_eq!(cfg.extract.output_dir, std::path::PathBuf::from("output"));
    }

    #[test]
    fn defaults_match_empty_file() {
        let cfg = defaults(EnvVars::default());
        assert_eq!(cfg.search.tavily.api_url, "https://api.tavily.com/search");
        assert_eq!(cfg.llm.openai.timeout_seconds, 60);
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.first-agent");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with(".first-agent"));
    }

    #[test]
    fn absolute_path_unchanged() {
        let p = expand_home("/absolute/path");
        assert_eq!(p, std::path::PathBuf::from("/absolute/path"));
    }

    #[test]
    fn missing_file_errors() {
        let missing = std::path::Path::new("/nonexistent/config.toml");
        let result = load_from(missing, EnvVars::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn env_log_level_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), env_of(&[(LOG_LEVEL_OVERRIDE, "debug")])).unwrap();
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn env_output_dir_override() {
        let f = write_toml("[extract]\noutput_dir = \"from-file\"\n");
        let cfg = load_from(f.path(), env_of(&[(OUTPUT_DIR_OVERRIDE, "/tmp/md-out")])).unwrap();
        assert_eq!(cfg.extract.output_dir, std::path::PathBuf::from("/tmp/md-out"));
    }

    #[test]
    fn api_key_in_toml_is_rejected() {
        let f = write_toml("[search.tavily]\napi_key = \"tvly-hardcoded\"\n");
        let msg = load_from(f.path(), EnvVars::default()).unwrap_err().to_string();
        assert!(msg.contains("search.tavily.api_key"));
        assert!(msg.contains("environment"));
        assert!(!msg.contains("tvly-hardcoded"));
    }

    #[test]
    fn suffixed_api_key_in_toml_is_rejected() {
        let f = write_toml("[llm]\nllm_api_key = \"sk-x\"\n");
        assert!(load_from(f.path(), EnvVars::default()).is_err());
    }

    #[test]
    fn base_url_in_toml_is_rejected() {
        let f = write_toml("LLM_BASE_URL = \"https://x\"\n");
        assert!(load_from(f.path(), EnvVars::default()).is_err());
    }

    #[test]
    fn unknown_search_depth_is_rejected() {
        let f = write_toml("[search.tavily]\nsearch_depth = \"deep\"\n");
        let err = load_from(f.path(), EnvVars::default()).unwrap_err();
        assert!(matches!(err, crate::error::AppError::Config(_)));
        let msg = err.to_string();
        assert!(msg.contains("search_depth"));
        assert!(msg.contains("basic, advanced"));
    }

    #[test]
    fn advanced_search_depth_is_accepted() {
        let f = write_toml("[search.tavily]\nsearch_depth = \"advanced\"\n");
        let cfg = load_from(f.path(), EnvVars::default()).unwrap();
        assert_eq!(cfg.search.tavily.search_depth, "advanced");
    }

    #[test]
    fn require_llm_resolves_chat_url() {
        let cfg = defaults(full_env());
        let creds = cfg.require_llm().unwrap();
        assert_eq!(creds.chat_url, "https://llm.example.com/v1/chat/completions");
        assert_eq!(creds.model, "gpt-4o-mini");
        assert_eq!(creds.api_key.expose_secret(), "sk-0123456789wxyz");
    }

    #[test]
    fn require_llm_reports_first_missing() {
        let cfg = defaults(env_of(&[(LLM_API_KEY, "sk-1"), (LLM_MODEL_ID, "m")]));
        let msg = cfg.require_llm().unwrap_err().to_string();
        assert_eq!(msg, "missing environment variable: LLM_BASE_URL");
    }

    #[test]
    fn require_search_needs_tavily_key() {
        let cfg = defaults(EnvVars::default());
        assert!(matches!(
            cfg.require_search(),
            Err(crate::error::AppError::MissingEnv(n)) if n == TAVILY_API_KEY
        ));
        let cfg = defaults(full_env());
        assert!(cfg.require_search().is_ok());
    }

    #[test]
    fn env_report_masks_secrets() {
        let cfg = defaults(full_env());
        let report = cfg.env_report();
        assert_eq!(report.len(), 4);
        assert_eq!(report[0].name, TAVILY_API_KEY);
        assert_eq!(report[0].display.as_deref(), Some("***6789"));
        assert_eq!(report[1].display.as_deref(), Some("***wxyz"));
        assert_eq!(report[2].display.as_deref(), Some("https://llm.example.com/v1"));
        assert!(report.iter().all(|s| s.present));
    }

    #[test]
    fn config_debug_has_no_secret() {
        let cfg = defaults(full_env());
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("0123456789"));
    }

    const BASE_TOML: &str = r#"
[agent]
name = "base-agent"
log_level = "info"

[llm]
default = "dummy"

[llm.openai]
temperature = 0.1
timeout_seconds = 30
"#;

    fn write_named(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let p = dir.path().join(name);
        std::fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn overlay_keeps_base_fields() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "base.toml", BASE_TOML);
        let overlay = r#"
[meta]
base = "base.toml"

[agent]
log_level = "debug"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let cfg = load_from(&overlay_path, EnvVars::default()).unwrap();
        assert_eq!(cfg.agent_name, "base-agent");
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn overlay_wins_scalar() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "base.toml", BASE_TOML);
        let overlay = r#"
[meta]
base = "base.toml"

[llm.openai]
timeout_seconds = 90
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let cfg = load_from(&overlay_path, EnvVars::default()).unwrap();
        assert_eq!(cfg.llm.openai.timeout_seconds, 90);
        assert_eq!(cfg.llm.openai.temperature, 0.1);
        assert_eq!(cfg.llm.provider, "dummy");
    }

    #[test]
    fn missing_base_errors() {
        let dir = TempDir::new().unwrap();
        let overlay = "[meta]\nbase = \"nonexistent.toml\"\n";
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let msg = load_from(&overlay_path, EnvVars::default()).unwrap_err().to_string();
        assert!(msg.contains("cannot read"));
    }

    #[test]
    fn cycle_detection() {
        let dir = TempDir::new().unwrap();
        let self_path = dir.path().join("self.toml");
        let content = format!("[meta]\nbase = \"{}\"\n\n{BASE_TOML}", self_path.display());
        std::fs::write(&self_path, content).unwrap();
        let msg = load_from(&self_path, EnvVars::default()).unwrap_err().to_string();
        assert!(msg.contains("circular"));
    }
}

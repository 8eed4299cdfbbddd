//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `FIRST_AGENT_LOG_LEVEL` / `FIRST_AGENT_OUTPUT_DIR` overrides.
//! Credentials are never read from TOML; a file that tries to set one is
//! rejected.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

use super::env::EnvVars;
use super::raw::RawConfig;
use super::types::*;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const SEARCH_DEPTHS: &[&str] = &["basic", "advanced"];

/// Deep-merge two TOML values.
/// Tables are merged recursively: the overlay only needs to specify keys that
/// differ from the base. For every other type (string, integer, array, …)
/// the overlay value replaces the base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// fully merged `toml::Value`. `visited` carries canonicalized paths already
/// seen in this chain so circular references are caught early.
fn load_raw_merged(
    path: &Path,
    visited: &mut HashSet<PathBuf>,
) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    reject_secrets(&overlay_val, "", path)?;

    if let Some(base_str) = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
    {
        let base_path = if Path::new(base_str).is_absolute() {
            PathBuf::from(base_str)
        } else {
            path.parent().unwrap_or(Path::new(".")).join(base_str)
        };
        let base_val = load_raw_merged(&base_path, visited)?;
        Ok(merge_toml(base_val, overlay_val))
    } else {
        Ok(overlay_val)
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key == "api_key" || key.ends_with("_api_key") || key == "llm_base_url" || key == "llm_model_id"
}

/// Fail on any key that would carry a credential or an env-only value.
fn reject_secrets(value: &toml::Value, prefix: &str, path: &Path) -> Result<(), AppError> {
    if let toml::Value::Table(tbl) = value {
        for (key, child) in tbl {
            let dotted = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
            if is_secret_key(key) {
                return Err(AppError::Config(format!(
                    "'{dotted}' in {}: secrets must come from the environment, not config files",
                    path.display()
                )));
            }
            reject_secrets(child, &dotted, path)?;
        }
    }
    Ok(())
}

/// Load config from `config_path`, else `config/default.toml` when present,
/// else built-in defaults. The environment is read once here.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let env = EnvVars::from_process();

    if let Some(path) = config_path {
        return load_from(Path::new(path), env);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_from(default_path, env)
    } else {
        Ok(defaults(env))
    }
}

/// Internal loader: accepts an explicit path and an environment snapshot.
/// Tests pass `EnvVars` directly instead of mutating env vars.
pub fn load_from(path: &Path, env: EnvVars) -> Result<Config, AppError> {
    let merged_val = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged_val)
        .map_err(|e: toml::de::Error| {
            AppError::Config(format!("config error in {}: {e}", path.display()))
        })?;

    validate_search_depth(&parsed.search.tavily.search_depth, path)?;
    Ok(resolve(parsed, env))
}

fn validate_search_depth(depth: &str, path: &Path) -> Result<(), AppError> {
    if SEARCH_DEPTHS.contains(&depth) {
        return Ok(());
    }
    Err(AppError::Config(format!(
        "search.tavily.search_depth = \"{depth}\" in {}: expected one of {}",
        path.display(),
        SEARCH_DEPTHS.join(", ")
    )))
}

/// Built-in configuration used when no file is present.
pub fn defaults(env: EnvVars) -> Config {
    resolve(RawConfig::default(), env)
}

fn resolve(parsed: RawConfig, env: EnvVars) -> Config {
    let log_level = env.log_level.clone().unwrap_or(parsed.agent.log_level);
    let output_dir = env.output_dir.clone().unwrap_or(parsed.extract.output_dir);
    let tavily = parsed.search.tavily;

    Config {
        agent_name: parsed.agent.name,
        log_level,
        log_file: parsed.agent.log_file.as_deref().map(expand_home),
        prompts_dir: expand_home(&parsed.agent.prompts_dir),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        search: SearchConfig {
            provider: parsed.search.provider,
            tavily: TavilyConfig {
                api_url: tavily.api_url,
                max_results: tavily.max_results,
                search_depth: tavily.search_depth,
                include_answer: tavily.include_answer,
                timeout_seconds: tavily.timeout_seconds,
            },
        },
        extract: ExtractConfig {
            output_dir: expand_home(&output_dir),
            timeout_seconds: parsed.extract.timeout_seconds,
        },
        env,
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

//! Subcommand handlers.
//!
//! Each handler writes its human-readable report to `out` and returns an
//! error for the caller to print; nothing here exits the process.

use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::{Config, LlmCredentials};
use crate::core::secret::SecretString;
use crate::error::AppError;
use crate::llm::providers::{self, openai_compatible::OpenAiCompatibleProvider};
use crate::subsystems::agents::FirstAgent;
use crate::subsystems::extract::{self as extractor, ExtractError};
use crate::subsystems::search::{self, SearchProvider};

const SNIPPET_CHARS: usize = 200;
const PREVIEW_LINES: usize = 10;

fn io(e: std::io::Error) -> AppError {
    AppError::Io(e)
}

fn search_key(config: &Config) -> Result<Option<SecretString>, AppError> {
    match config.search.provider.as_str() {
        "tavily" => Ok(Some(config.require_search()?.clone())),
        _ => Ok(None),
    }
}

fn llm_credentials(config: &Config) -> Result<Option<LlmCredentials>, AppError> {
    match config.llm.provider.as_str() {
        "dummy" => Ok(None),
        _ => config.require_llm().map(Some),
    }
}

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > SNIPPET_CHARS {
        flat.chars().take(SNIPPET_CHARS).collect::<String>() + "..."
    } else {
        flat
    }
}

/// `first-agent check`: print every variable, masked, then the resolved
/// LLM endpoint. Fails when any variable is missing or `LLM_BASE_URL` does
/// not resolve to an http(s) endpoint.
pub async fn check(config: &Config, ping: bool, out: &mut impl Write) -> Result<(), AppError> {
    writeln!(out, "Environment:").map_err(io)?;
    for status in config.env_report() {
        match &status.display {
            Some(value) if status.present => {
                writeln!(out, "  {:<16} set      {value}", status.name).map_err(io)?
            }
            _ => writeln!(out, "  {:<16} missing", status.name).map_err(io)?,
        }
    }

    let mut endpoint_error = None;
    match config.require_llm() {
        Ok(creds) => {
            writeln!(out, "LLM endpoint: {}", creds.chat_url).map_err(io)?;
            writeln!(out, "LLM model:    {}", creds.model).map_err(io)?;
            if ping {
                let provider = OpenAiCompatibleProvider::new(
                    creds.chat_url,
                    creds.model,
                    config.llm.openai.temperature,
                    config.llm.openai.timeout_seconds,
                    Some(creds.api_key),
                )?;
                match provider.ping().await {
                    Ok(()) => writeln!(out, "LLM ping:     reachable").map_err(io)?,
                    Err(e) => {
                        warn!(error = %e, "llm endpoint unreachable");
                        writeln!(out, "LLM ping:     {e}").map_err(io)?
                    }
                }
            }
        }
        Err(AppError::Config(msg)) => {
            writeln!(out, "LLM endpoint: invalid ({msg})").map_err(io)?;
            endpoint_error = Some(AppError::Config(msg));
        }
        Err(_) => {}
    }

    let missing = config.env.missing();
    if !missing.is_empty() {
        return Err(AppError::MissingEnv(missing.join(", ")));
    }
    if let Some(e) = endpoint_error {
        return Err(e);
    }
    writeln!(out, "All credentials present.").map_err(io)?;
    Ok(())
}

/// `first-agent search <query>`.
pub async fn search(
    config: &Config,
    query: &str,
    max_results: Option<usize>,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let mut provider = search::build(&config.search, search_key(config)?)?;
    if let Some(n) = max_results {
        provider = provider.with_max_results(n);
    }

    let found = provider.search(query).await?;
    info!(provider = provider.name(), results = found.results.len(), "search done");

    if let Some(answer) = &found.answer {
        writeln!(out, "Answer: {answer}\n").map_err(io)?;
    }
    if found.results.is_empty() {
        writeln!(out, "No results.").map_err(io)?;
        return Ok(());
    }
    for (i, r) in found.results.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, r.title).map_err(io)?;
        writeln!(out, "   {}", r.url).map_err(io)?;
        if let Some(content) = r.content.as_deref().filter(|c| !c.trim().is_empty()) {
            writeln!(out, "   {}", snippet(content)).map_err(io)?;
        }
    }
    Ok(())
}

/// `first-agent ask <question>`.
pub async fn ask(config: &Config, question: &str, out: &mut impl Write) -> Result<(), AppError> {
    let searcher: SearchProvider = search::build(&config.search, search_key(config)?)?;
    let llm = providers::build(&config.llm, llm_credentials(config)?)?;

    let reply = FirstAgent::new(searcher, llm, &config.prompts_dir).ask(question).await?;

    writeln!(out, "{}", reply.answer.trim()).map_err(io)?;
    if !reply.sources.is_empty() {
        writeln!(out, "\nSources:").map_err(io)?;
        for (i, s) in reply.sources.iter().enumerate() {
            writeln!(out, "  [{}] {} - {}", i + 1, s.title, s.url).map_err(io)?;
        }
    }
    if let Some(usage) = reply.usage {
        info!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "token usage"
        );
    }
    Ok(())
}

/// `first-agent extract <url>`. A page with nothing extractable is a
/// warning, not a failure.
pub async fn extract(
    config: &Config,
    url: &str,
    output_dir: Option<PathBuf>,
    timeout_seconds: Option<u64>,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let dir = output_dir.unwrap_or_else(|| config.extract.output_dir.clone());
    let timeout = timeout_seconds.unwrap_or(config.extract.timeout_seconds);
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let outcome = match extractor::run(url, &dir, timeout, &generated_at).await {
        Ok(outcome) => outcome,
        Err(ExtractError::NoContent) => {
            writeln!(out, "warning: no content could be extracted from {url}").map_err(io)?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let markdown = std::fs::read_to_string(&outcome.path)?;
    writeln!(out, "Saved to: {}", outcome.path.display()).map_err(io)?;
    writeln!(out, "Size:     {} bytes", outcome.markdown_bytes).map_err(io)?;
    writeln!(out, "\nPreview:").map_err(io)?;
    for line in markdown.lines().take(PREVIEW_LINES) {
        writeln!(out, "  {line}").map_err(io)?;
    }
    let sections: usize = outcome.result.nodes.iter().map(|n| n.count()).sum();
    writeln!(out, "\nSections: {sections}").map_err(io)?;
    writeln!(out, "Title:    {}", outcome.result.title).map_err(io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvVars;
    use crate::testutil::StubServer;
    use tempfile::TempDir;

    fn full_env() -> EnvVars {
        EnvVars::from_lookup(|name| {
            match name {
                "TAVILY_API_KEY" => Some("tvly-0123456789"),
                "LLM_API_KEY" => Some("sk-0123456789wxyz"),
                "LLM_BASE_URL" => Some("https://api.example.com/v1/"),
                "LLM_MODEL_ID" => Some("gpt-4o-mini"),
                _ => None,
            }
            .map(String::from)
        })
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn check_masks_and_resolves_endpoint() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::test_default(dir.path());
        config.env = full_env();

        let mut buf = Vec::new();
        check(&config, false, &mut buf).await.unwrap();
        let text = output(buf);
        assert!(text.contains("TAVILY_API_KEY   set      ***6789"));
        assert!(text.contains("***wxyz"));
        assert!(!text.contains("sk-0123456789wxyz"));
        assert!(text.contains("LLM endpoint: https://api.example.com/v1/chat/completions"));
        assert!(text.contains("All credentials present."));
    }

    #[tokio::test]
    async fn check_fails_on_non_http_base_url() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::test_default(dir.path());
        config.env = full_env();
        config.env.llm_base_url = Some("ftp://not-http/v1".into());

        let mut buf = Vec::new();
        let err = check(&config, false, &mut buf).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("http or https")));
        let text = output(buf);
        assert!(text.contains("LLM endpoint: invalid"));
        assert!(!text.contains("All credentials present."));
    }

    #[tokio::test]
    async fn check_lists_missing_and_fails() {
        let dir = TempDir::new().unwrap();
        let config = Config::test_default(dir.path());

        let mut buf = Vec::new();
        let err = check(&config, false, &mut buf).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::MissingEnv(ref names) if names.starts_with("TAVILY_API_KEY")
        ));
        let text = output(buf);
        assert!(text.contains("LLM_MODEL_ID     missing"));
        assert!(!text.contains("LLM endpoint"));
    }

    #[tokio::test]
    async fn search_with_dummy_prints_numbered_results() {
        let dir = TempDir::new().unwrap();
        let config = Config::test_default(dir.path());
        let mut buf = Vec::new();
        search(&config, "rust", Some(2), &mut buf).await.unwrap();
        let text = output(buf);
        assert!(text.starts_with("1. Result for rust\n   https://example.com/\n"));
    }

    #[tokio::test]
    async fn tavily_search_requires_key() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::test_default(dir.path());
        config.search.provider = "tavily".into();
        let err = search(&config, "rust", None, &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::MissingEnv(ref n) if n == "TAVILY_API_KEY"));
    }

    #[tokio::test]
    async fn ask_prints_answer_and_sources() {
        let dir = TempDir::new().unwrap();
        let config = Config::test_default(dir.path());
        let mut buf = Vec::new();
        ask(&config, "what is tokio?", &mut buf).await.unwrap();
        let text = output(buf);
        assert!(text.starts_with("[echo] "));
        assert!(
            text.contains("\nSources:\n  [1] Result for what is tokio? - https://example.com/")
        );
    }

    #[tokio::test]
    async fn ask_with_openai_reports_first_missing_variable() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::test_default(dir.path());
        config.llm.provider = "openai".into();
        let err = ask(&config, "q", &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::MissingEnv(ref n) if n == "LLM_API_KEY"));
    }

    #[tokio::test]
    async fn extract_saves_and_previews() {
        let html = "<html><head><title>Notes</title></head>\
                    <body><h1>One</h1><p>first</p></body></html>";
        let server = StubServer::respond(200, "text/html", html).await;
        let dir = TempDir::new().unwrap();
        let config = Config::test_default(dir.path());

        let mut buf = Vec::new();
        extract(&config, &format!("{}/notes", server.base_url), None, Some(5), &mut buf)
            .await
            .unwrap();
        let text = output(buf);
        assert!(text.contains("Saved to: "));
        assert!(text.contains("  # Notes"));
        assert!(text.contains("Sections: 1"));
        assert!(text.contains("Title:    Notes"));
        assert_eq!(std::fs::read_dir(dir.path().join("output")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn extract_empty_page_is_warning() {
        let server = StubServer::respond(200, "text/html", "<html><body></body></html>").await;
        let dir = TempDir::new().unwrap();
        let config = Config::test_default(dir.path());

        let mut buf = Vec::new();
        extract(&config, &server.base_url, None, Some(5), &mut buf).await.unwrap();
        assert!(output(buf).starts_with("warning: no content"));
    }

    #[tokio::test]
    async fn extract_invalid_url_errors() {
        let dir = TempDir::new().unwrap();
        let config = Config::test_default(dir.path());
        let err = extract(&config, "not-a-url", None, None, &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Extract(ExtractError::InvalidUrl(_))));
    }

    #[test]
    fn snippets_flattened_and_capped() {
        assert_eq!(snippet("a\n  b"), "a b");
        assert!(snippet(&"x".repeat(300)).ends_with("..."));
    }
}

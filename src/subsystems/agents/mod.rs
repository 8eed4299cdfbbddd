//! Search-then-answer agent.
//!
//! One question, one search, one LLM round-trip. The search results are
//! rendered into the user prompt as numbered sources the model can cite.

pub mod prompt;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::AppError;
use crate::llm::{LlmProvider, LlmUsage};
use crate::subsystems::search::{SearchProvider, SearchResult};

use prompt::PromptBuilder;

pub const SYSTEM_PROMPT_FILE: &str = "system.md";
pub const ANSWER_PROMPT_FILE: &str = "search_answer.md";

const BUILTIN_SYSTEM: &str = include_str!("../../../config/prompts/system.md");
const BUILTIN_ANSWER: &str = include_str!("../../../config/prompts/search_answer.md");

/// Per-source snippet cap inside the prompt.
const MAX_SNIPPET_CHARS: usize = 1200;
const NO_RESULTS: &str = "No search results.";

#[derive(Debug, Clone)]
pub struct AgentAnswer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub usage: Option<LlmUsage>,
}

pub struct FirstAgent {
    search: SearchProvider,
    llm: LlmProvider,
    prompts_dir: PathBuf,
}

impl FirstAgent {
    pub fn new(search: SearchProvider, llm: LlmProvider, prompts_dir: impl Into<PathBuf>) -> Self {
        Self { search, llm, prompts_dir: prompts_dir.into() }
    }

    pub async fn ask(&self, question: &str) -> Result<AgentAnswer, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Agent("question must not be empty".into()));
        }

        let found = self.search.search(question).await?;
        info!(
            provider = self.search.name(),
            results = found.results.len(),
            "search finished"
        );

        let mut context = render_context(&found.results);
        if let Some(answer) = &found.answer {
            context = format!("Search summary: {answer}\n\n{context}");
        }

        let system = PromptBuilder::new(&self.prompts_dir)
            .layer_or(SYSTEM_PROMPT_FILE, BUILTIN_SYSTEM)
            .build();
        let user = PromptBuilder::new(&self.prompts_dir)
            .layer_or(ANSWER_PROMPT_FILE, BUILTIN_ANSWER)
            .var("question", question)
            .var("context", context)
            .build();
        debug!(prompt_len = user.len(), "prompt assembled");

        let reply = self.llm.complete(&user, Some(&system)).await?;
        info!(provider = self.llm.name(), usage = ?reply.usage, "answer received");

        Ok(AgentAnswer {
            question: question.to_string(),
            answer: reply.text,
            sources: found.results,
            usage: reply.usage,
        })
    }
}

/// `[n] title - url` followed by the snippet, one block per result.
pub fn render_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let title = if r.title.trim().is_empty() { r.url.as_str() } else { r.title.trim() };
            let mut block = format!("[{}] {} - {}", i + 1, title, r.url);
            if let Some(content) = &r.content {
                block.push('\n');
                block.push_str(&truncate_chars(content.trim(), MAX_SNIPPET_CHARS));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect::<String>() + "..."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;
    use crate::subsystems::search::dummy::DummySearch;
    use tempfile::TempDir;

    fn agent(dir: &TempDir) -> FirstAgent {
        FirstAgent::new(
            SearchProvider::Dummy(DummySearch),
            LlmProvider::Dummy(DummyProvider),
            dir.path(),
        )
    }

    #[tokio::test]
    async fn ask_feeds_search_results_into_prompt() {
        let dir = TempDir::new().unwrap();
        let out = agent(&dir).ask("  what is rust?  ").await.unwrap();
        assert_eq!(out.question, "what is rust?");
        assert_eq!(out.sources.len(), 1);
        // Dummy LLM echoes the user prompt back.
        assert!(out.answer.starts_with("[echo] "));
        assert!(out.answer.contains("what is rust?"));
        assert!(out.answer.contains("[1] Result for what is rust? - https://example.com/"));
    }

    #[tokio::test]
    async fn prompt_file_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(ANSWER_PROMPT_FILE), "ONLY {{question}}").unwrap();
        let out = agent(&dir).ask("ping").await.unwrap();
        assert_eq!(out.answer, "[echo] ONLY ping");
    }

    #[tokio::test]
    async fn empty_question_rejected() {
        let dir = TempDir::new().unwrap();
        let err = agent(&dir).ask(" ").await.unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn context_for_no_results() {
        assert_eq!(render_context(&[]), NO_RESULTS);
    }

    #[test]
    fn context_numbers_and_truncates() {
        let long = "x".repeat(MAX_SNIPPET_CHARS + 50);
        let results = vec![
            SearchResult { title: "A".into(), url: "https://a".into(), content: None, score: None },
            SearchResult {
                title: " ".into(),
                url: "https://b".into(),
                content: Some(long),
                score: Some(0.5),
            },
        ];
        let ctx = render_context(&results);
        assert!(ctx.starts_with("[1] A - https://a\n\n[2] https://b - https://b\n"));
        assert!(ctx.ends_with("..."));
    }

    #[test]
    fn builtin_templates_carry_placeholders() {
        assert!(BUILTIN_ANSWER.contains("{{question}}"));
        assert!(BUILTIN_ANSWER.contains("{{context}}"));
        assert!(!BUILTIN_SYSTEM.trim().is_empty());
    }
}

//! Web search providers.
//!
//! Mirrors the LLM layer: `SearchProvider` is an enum over concrete
//! backends and `build` picks one from config. The Tavily key is passed in
//! from the environment snapshot; it is never read here.

pub mod dummy;
pub mod tavily;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SearchConfig;
use crate::core::secret::SecretString;

/// Upper bound accepted by the Tavily API for `max_results`.
pub const MAX_RESULTS_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("unknown search provider: {0}")]
    UnknownProvider(String),
    #[error("search provider '{0}' needs TAVILY_API_KEY")]
    MissingCredentials(String),
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("search request failed: {0}")]
    Request(String),
    #[error("search API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("unexpected search response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Snippet of page content, when the provider returns one.
    pub content: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    /// Provider-generated short answer (Tavily `include_answer`).
    pub answer: Option<String>,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone)]
pub enum SearchProvider {
    Dummy(dummy::DummySearch),
    Tavily(tavily::TavilyClient),
}

impl SearchProvider {
    pub async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        match self {
            SearchProvider::Dummy(p) => p.search(query).await,
            SearchProvider::Tavily(p) => p.search(query).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchProvider::Dummy(_) => "dummy",
            SearchProvider::Tavily(_) => "tavily",
        }
    }

    /// Override the configured result count (clamped to the API limit).
    pub fn with_max_results(self, n: usize) -> Self {
        match self {
            SearchProvider::Tavily(t) => {
                SearchProvider::Tavily(t.with_max_results(clamp_max_results(n)))
            }
            other => other,
        }
    }
}

/// Construct the configured search provider. `api_key` is only required by
/// Tavily.
pub fn build(
    config: &SearchConfig,
    api_key: Option<SecretString>,
) -> Result<SearchProvider, SearchError> {
    match config.provider.as_str() {
        "dummy" => Ok(SearchProvider::Dummy(dummy::DummySearch)),
        "tavily" => {
            let key = api_key
                .ok_or_else(|| SearchError::MissingCredentials(config.provider.clone()))?;
            let t = &config.tavily;
            let client = tavily::TavilyClient::new(
                t.api_url.clone(),
                key,
                clamp_max_results(t.max_results),
                t.search_depth.clone(),
                t.include_answer,
                t.timeout_seconds,
            )?;
            Ok(SearchProvider::Tavily(client))
        }
        other => Err(SearchError::UnknownProvider(other.to_string())),
    }
}

pub fn clamp_max_results(n: usize) -> usize {
    n.clamp(1, MAX_RESULTS_LIMIT)
}

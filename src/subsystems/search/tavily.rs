//! Tavily Search API client: `POST https://api.tavily.com/search`.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::core::secret::{ExposeSecret, SecretString};

use super::{SearchError, SearchResponse, SearchResult};

#[derive(Debug, Clone)]
pub struct TavilyClient {
    client: Client,
    api_url: String,
    api_key: SecretString,
    max_results: usize,
    search_depth: String,
    include_answer: bool,
}

impl TavilyClient {
    pub fn new(
        api_url: String,
        api_key: SecretString,
        max_results: usize,
        search_depth: String,
        include_answer: bool,
        timeout_seconds: u64,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| SearchError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, api_url, api_key, max_results, search_depth, include_answer })
    }

    /// Same client with a different result count (clamped by the caller).
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let payload = SearchRequest {
            query,
            max_results: self.max_results,
            search_depth: &self.search_depth,
            include_answer: self.include_answer,
            include_raw_content: false,
        };

        debug!(
            query_len = query.len(),
            max_results = self.max_results,
            depth = %self.search_depth,
            "sending Tavily search"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_url, error = %e, "Tavily request failed (transport)");
                SearchError::Request(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Request(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            error!(%status, "Tavily returned HTTP error");
            return Err(SearchError::Http { status: status.as_u16(), body: error_detail(&body) });
        }
        trace!(body = %body, "Tavily response body");

        let parsed: WireResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Parse(e.to_string()))?;

        let results: Vec<SearchResult> = parsed
            .results
            .into_iter()
            .filter_map(|r| {
                let url = r.url.filter(|u| !u.trim().is_empty())?;
                Some(SearchResult {
                    title: r.title.unwrap_or_default(),
                    url,
                    content: r.content.filter(|c| !c.trim().is_empty()),
                    score: r.score,
                })
            })
            .collect();

        debug!(results = results.len(), "Tavily search complete");

        Ok(SearchResponse {
            query: parsed.query.unwrap_or_else(|| query.to_string()),
            answer: parsed.answer.filter(|a| !a.trim().is_empty()),
            results,
        })
    }
}

/// Prefer Tavily's `{"detail": {"error": ...}}` message over the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            let detail = v.get("detail")?;
            detail
                .get("error")
                .and_then(|e| e.as_str())
                .or_else(|| detail.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    results: Vec<WireResult>,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

//! Offline search provider returning one synthetic result.

use super::{SearchError, SearchResponse, SearchResult};

#[derive(Debug, Clone)]
pub struct DummySearch;

impl DummySearch {
    pub async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        Ok(SearchResponse {
            query: query.to_string(),
            answer: None,
            results: vec![SearchResult {
                title: format!("Result for {query}"),
                url: "https://example.com/".to_string(),
                content: Some(format!("[echo] {query}")),
                score: None,
            }],
        })
    }
}

//! Web lookup through the Tavily search API.

use crate::ports::{LookupOutcome, WebLookup};
use axon_core::config::SearchConfig;
use axon_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const NO_RESULTS: &str = "No results found";

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
    topic: &'a str,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Tavily-backed [`WebLookup`].
///
/// Without an API key every lookup fails recoverably.
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    max_results: u32,
    search_depth: String,
    topic: String,
}

impl TavilySearch {
    pub fn new(config: &SearchConfig, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            tracing::warn!(
                "No web search API key in ${}; web lookups will fail over to other sources",
                config.api_key_env
            );
        }

        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: config.endpoint.clone(),
            max_results: config.max_results,
            search_depth: config.search_depth.clone(),
            topic: config.topic.clone(),
        }
    }

    /// Build from config, reading the key from the configured variable.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config, config.resolve_api_key())
    }

    async fn search(&self, query: &str) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Search("Web search API key is not configured".to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&TavilyRequest {
                api_key,
                query,
                max_results: self.max_results,
                search_depth: &self.search_depth,
                topic: &self.topic,
            })
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to reach search API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Search(format!(
                "Search API error ({}): {}",
                status, error_text
            )));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))?;

        Ok(format_results(&body.results))
    }
}

fn format_results(results: &[TavilyResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    results
        .iter()
        .map(|r| {
            format!(
                "Title: {}\nContent: {}\nURL: {}",
                r.title.as_deref().unwrap_or("No title"),
                r.content.as_deref().unwrap_or("No content"),
                r.url.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait::async_trait]
impl WebLookup for TavilySearch {
    async fn lookup(&self, query: &str) -> LookupOutcome {
        match self.search(query).await {
            Ok(text) => LookupOutcome::Found(text),
            Err(e) => LookupOutcome::Failed(e.to_string()),
        }
    }
}

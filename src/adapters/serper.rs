//! Serper web search tool.
//!
//! Endpoint: POST /search
//! Auth: X-API-KEY header

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{SearchError, SearchTool};

/// Default Serper API root
pub const DEFAULT_BASE_URL: &str = "https://google.serper.dev";

/// Settings for the Serper client
#[derive(Clone)]
pub struct SerperConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl SerperConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for SerperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerperConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Serper search client
pub struct SerperClient {
    config: SerperConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    answer_box: Option<AnswerBox>,
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct AnswerBox {
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerperClient {
    /// Create a new client
    pub fn new(config: SerperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build Serper HTTP client")?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }
}

/// Flatten a response into ranked snippets, answer box first
fn to_snippets(response: SearchResponse) -> Vec<String> {
    let mut snippets = Vec::new();

    if let Some(answer) = response
        .answer_box
        .and_then(|a| a.answer.or(a.snippet))
        .filter(|a| !a.trim().is_empty())
    {
        snippets.push(answer.trim().to_string());
    }

    for result in response.organic {
        if result.snippet.trim().is_empty() && result.title.trim().is_empty() {
            continue;
        }
        let mut line = format!("{}: {}", result.title.trim(), result.snippet.trim());
        if !result.link.is_empty() {
            line.push_str(&format!(" ({})", result.link));
        }
        snippets.push(line);
    }

    snippets
}

#[async_trait]
impl SearchTool for SerperClient {
    fn name(&self) -> &str {
        "serper"
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("X-API-KEY", &self.config.api_key)
            .json(&SearchRequest { q: query })
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest(e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::from_status(status, &text));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::from_reqwest(e, self.config.timeout))?;

        let snippets = to_snippets(parsed);
        debug!(results = snippets.len(), "Search completed");
        Ok(snippets)
    }
}

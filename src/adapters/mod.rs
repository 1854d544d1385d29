//! Adapter interfaces for external systems.
//!
//! The orchestrator talks to two collaborators: an LLM completion service
//! and a web search tool. Both report failures as typed errors instead of
//! panicking or returning empty output.

pub mod gemini;
pub mod serper;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use gemini::{GeminiClient, GeminiConfig};
pub use serper::{SerperClient, SerperConfig};

/// Generates text for one stage
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Human-readable service name
    fn name(&self) -> &str;

    /// Produce the stage output for the given role and instructions
    async fn generate(
        &self,
        role: &str,
        goal: &str,
        backstory: &str,
        instructions: &str,
    ) -> Result<String, CompletionError>;
}

/// Returns ranked text snippets for a query
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Human-readable tool name
    fn name(&self) -> &str;

    /// Search the web, best match first
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError>;
}

/// Completion service failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Completion quota exceeded: {0}")]
    Quota(String),

    #[error("Completion service rejected credentials: {0}")]
    Auth(String),

    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Completion service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Completion request failed: {0}")]
    Transport(String),

    #[error("Malformed completion response: {0}")]
    Malformed(String),
}

/// Search tool failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Search quota exceeded: {0}")]
    Quota(String),

    #[error("Search service rejected credentials: {0}")]
    Auth(String),

    #[error("Search request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Search service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Search request failed: {0}")]
    Transport(String),

    #[error("Malformed search response: {0}")]
    Malformed(String),
}

/// Classification of an unsuccessful HTTP status, shared by both clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    Quota,
    Auth,
    Other,
}

pub(crate) fn classify_status(status: StatusCode) -> StatusClass {
    match status {
        StatusCode::TOO_MANY_REQUESTS => StatusClass::Quota,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StatusClass::Auth,
        _ => StatusClass::Other,
    }
}

/// Keep error bodies short enough for a log line
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

impl CompletionError {
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let body = truncate_body(body);
        match classify_status(status) {
            StatusClass::Quota => Self::Quota(body),
            StatusClass::Auth => Self::Auth(body),
            StatusClass::Other => Self::Http {
                status: status.as_u16(),
                body,
            },
        }
    }

    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_decode() {
            Self::Malformed(error.to_string())
        } else {
            Self::Transport(error.without_url().to_string())
        }
    }
}

impl SearchError {
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let body = truncate_body(body);
        match classify_status(status) {
            StatusClass::Quota => Self::Quota(body),
            StatusClass::Auth => Self::Auth(body),
            StatusClass::Other => Self::Http {
                status: status.as_u16(),
                body,
            },
        }
    }

    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_decode() {
            Self::Malformed(error.to_string())
        } else {
            Self::Transport(error.without_url().to_string())
        }
    }
}

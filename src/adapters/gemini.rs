//! Gemini completion service.
//!
//! Calls the Generative Language `generateContent` REST endpoint. The stage
//! role, goal and backstory become the system instruction; the rendered
//! stage instructions are the single user turn.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{CompletionError, CompletionService};

/// Default Generative Language API root
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Settings for the Gemini client
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Config with defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            max_output_tokens: None,
            timeout: Duration::from_secs(120),
        }
    }
}

// Never print the key
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Create a new client
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, role: &str, goal: &str, backstory: &str, instructions: &str) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_prompt(role, goal, backstory),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: instructions.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

/// System instruction for a stage
fn system_prompt(role: &str, goal: &str, backstory: &str) -> String {
    format!("You are {}. {}\nYour personal goal is: {}", role, backstory.trim(), goal)
}

/// Pull the generated text out of a response
fn extract_text(response: GenerateResponse) -> Result<String, CompletionError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(CompletionError::Malformed(format!(
            "response contained no candidates ({})",
            reason
        )));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(CompletionError::Malformed(format!(
            "candidate had no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[async_trait]
impl CompletionService for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip_all, fields(model = %self.config.model, role = %role))]
    async fn generate(
        &self,
        role: &str,
        goal: &str,
        backstory: &str,
        instructions: &str,
    ) -> Result<String, CompletionError> {
        let body = self.build_request(role, goal, backstory, instructions);
        debug!(instructions_len = instructions.len(), "Sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::from_reqwest(e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CompletionError::from_status(status, &text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::from_reqwest(e, self.config.timeout))?;

        let text = extract_text(parsed)?;
        debug!(output_len = text.len(), "Completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(GeminiConfig::new("KEY")).unwrap()
    }

    #[test]
    fn test_endpoint() {
        let mut config = GeminiConfig::new("KEY");
        config.base_url = "http://localhost:8080/v1beta/".to_string();
        config.model = "gemini-test".to_string();
        let client = GeminiClient::new(config).unwrap();

        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let request = client().build_request("Content Writer", "Write well", "Veteran", "Do it");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You are Content Writer. Veteran\nYour personal goal is: Write well"
        );
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Do it");
        assert!(json["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "world" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(extract_text(response).unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();

        let err = extract_text(response).unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(ref m) if m.contains("SAFETY")));
    }

    #[test]
    fn test_extract_text_empty_candidate() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();

        assert!(matches!(
            extract_text(response),
            Err(CompletionError::Malformed(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let printed = format!("{:?}", GeminiConfig::new("super-secret"));
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("REDACTED"));
    }
}

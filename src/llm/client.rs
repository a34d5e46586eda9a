//! Async LLM client for turn decisions
//!
//! This is a model-agnostic HTTP client for calling LLM APIs.
//! Supports both Anthropic and OpenAI-compatible APIs (DeepSeek, etc).

use crate::battle::ai::oracle::DecisionOracle;
use crate::core::config::AgentConfig;
use crate::core::error::{AgentError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    ///
    /// Sampling settings and the request timeout take their defaults.
    pub fn new(api_key: String, api_url: String, model: String) -> Result<Self> {
        let defaults = AgentConfig::default();
        Ok(Self {
            client: Self::http_client(defaults.request_timeout())?,
            api_format: Self::detect_api_format(&api_url),
            api_key,
            api_url,
            model,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        })
    }

    /// Rebuild the HTTP client with a different request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Self::http_client(timeout)?;
        Ok(self)
    }

    /// Build a client from agent configuration
    ///
    /// Fails with `OracleUnavailable` when the oracle is disabled or no
    /// credential is configured.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        if !config.oracle_configured() {
            return Err(AgentError::OracleUnavailable);
        }
        let api_key = config.api_key.clone().unwrap_or_default();
        let client = Self::http_client(config.request_timeout())?;

        Ok(Self {
            client,
            api_format: Self::detect_api_format(&config.api_url),
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Create a client from environment variables
    ///
    /// Required: OPENAI_API_KEY or LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to the OpenAI chat completions API)
    /// Optional: OPENAI_MODEL or LLM_MODEL (defaults to gpt-4o-mini)
    pub fn from_env() -> Result<Self> {
        Self::from_config(&AgentConfig::from_env()?)
    }

    fn http_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::LlmError(e.to_string()))
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request to the LLM
    ///
    /// # Arguments
    /// * `system` - System prompt providing context and instructions
    /// * `user` - User message/query to process
    ///
    /// # Returns
    /// The LLM's text response
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        Ok(completion
            .content
            .first()
            .map(|c| c.text.clone())
            .unwrap_or_default())
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        // A null message body is treated as an empty reply, which then
        // fails JSON extraction like any other unusable output
        Ok(completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

impl DecisionOracle for LlmClient {
    async fn ask(&self, system: &str, user: &str) -> Result<String> {
        self.complete(system, user).await
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

//! OpenAI chat-completions client.
//!
//! Speaks the `/v1/chat/completions` wire format, so it also works against any
//! compatible server (Ollama, vLLM) by changing the base URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::ports::{
    FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, MessageRole, TokenUsage,
};

/// Default OpenAI base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Default chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

/// Client for the OpenAI chat-completions API
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        // LLM requests can be slow
        Self::with_timeout(base_url, api_key, model, 120)
    }

    /// Create client with custom timeout (for testing).
    pub fn with_timeout(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens: None,
        }
    }

    /// Cap applied when a request does not set its own `max_tokens`.
    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmPort for OpenAiClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let api_request = OpenAIChatRequest {
            model: self.model.clone(),
            messages: build_messages(&request),
            temperature: request.temperature,
            max_tokens: request.max_tokens.or(self.max_tokens),
        };

        tracing::debug!(
            model = %self.model,
            messages = api_request.messages.len(),
            temperature = ?api_request.temperature,
            "Sending chat completion request"
        );

        let mut builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&api_request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
            return Err(LlmError::RequestFailed(format!("{}: {}", status, error_text)));
        }

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        convert_response(api_response)
    }
}

fn build_messages(request: &LlmRequest) -> Vec<OpenAIMessage> {
    let mut messages = Vec::new();

    if let Some(system) = &request.system_prompt {
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: Some(system.clone()),
        });
    }

    for msg in &request.messages {
        messages.push(OpenAIMessage {
            role: match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            }
            .to_string(),
            content: Some(msg.content.clone()),
        });
    }

    messages
}

fn convert_response(response: OpenAIChatResponse) -> Result<LlmResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in LLM response".to_string()))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("stop") => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        Some(_) => FinishReason::Unknown,
        None => FinishReason::Stop,
    };

    Ok(LlmResponse {
        content: choice.message.content.unwrap_or_default().trim().to_string(),
        finish_reason,
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

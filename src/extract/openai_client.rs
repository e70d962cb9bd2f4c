//! OpenAI-compatible chat client
//!
//! LLM client for any provider exposing the OpenAI chat completions
//! API (OpenAI, Groq, local gateways).

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::llm_client::LlmClient;

/// Default model (a Groq-hosted distill, as deployed originally)
const DEFAULT_MODEL: &str = "deepseek-r1-distill-llama-70b";

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Chat client for OpenAI-compatible endpoints
#[derive(Clone)]
pub struct OpenAiChatClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl OpenAiChatClient {
    /// Create a new client with the given API key
    pub fn new(api_key: String) -> Self {
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url = std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            api_key,
            client: reqwest::Client::new(),
            model,
            base_url,
        }
    }

    /// Create with a specific model
    pub fn with_model(api_key: String, model: &str) -> Self {
        let mut client = Self::new(api_key);
        client.model = model.to_string();
        client
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| anyhow!("LLM_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key))
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": &self.model,
                "messages": [
                    {"role": "system", "content": system_prompt},
                    {"role": "user", "content": user_prompt}
                ],
                "temperature": 0.5,
                "max_tokens": 4096,
                "top_p": 0.95,
                "response_format": {"type": "json_object"}
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("LLM API error {}: {}", status, body));
        }

        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            choices: Vec<Choice>,
        }

        let api_response: ApiResponse = response.json().await?;
        api_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .map(|content| content.trim().to_string())
            .ok_or_else(|| anyhow!("Empty response from LLM"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

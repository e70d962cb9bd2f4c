//! LLM Client Trait
//!
//! Unified interface for the chat model behind entity extraction.

use anyhow::Result;
use async_trait::async_trait;

/// Minimal chat interface for providers with an OpenAI-style API.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Call the LLM expecting a JSON object response.
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Get the model name for logging
    fn model_name(&self) -> &str;
}

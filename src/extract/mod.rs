//! Entity extraction boundary
//!
//! Free-text order requests enter the system here and leave as typed
//! `OrderRequest` values. The LLM is an opaque collaborator behind the
//! `LlmClient` trait; `EntityExtractor` is the seam the order service
//! depends on, so tests can substitute a canned extractor.

pub mod llm_client;
pub mod openai_client;
pub mod order_extractor;

use async_trait::async_trait;

use crate::error::OrderResult;
use crate::order::OrderRequest;

pub use llm_client::LlmClient;
pub use openai_client::OpenAiChatClient;
pub use order_extractor::LlmOrderExtractor;

/// Turns free text into a structured order request.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> OrderResult<OrderRequest>;
}

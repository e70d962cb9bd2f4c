//! Foodstation - Conversational Order Resolution
//!
//! Turns loosely specified free-text food orders into concrete, priced
//! catalog entries by narrowing one ambiguous field at a time across
//! independent request/response turns.
//!
//! ## Call chain
//! Free text -> Entity Extractor (LLM) -> typed OrderRequest ->
//! Disambiguation Engine (catalog-backed) -> pending selection or
//! finalized, priced order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use foodstation::catalog::StaticCatalog;
//! use foodstation::extract::{LlmOrderExtractor, OpenAiChatClient};
//! use foodstation::session::SessionStore;
//! use foodstation::transcript::MemoryTranscript;
//! use foodstation::OrderService;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let llm = Arc::new(OpenAiChatClient::from_env()?);
//! let service = OrderService::new(
//!     Uuid::new_v4(),
//!     Arc::new(LlmOrderExtractor::new(llm)),
//!     Arc::new(StaticCatalog::new()),
//!     SessionStore::new(),
//!     Arc::new(MemoryTranscript::new()),
//! );
//! let result = service.submit_order_text("two beef kotthu from Kandiah").await;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Configuration
pub mod config;

// Menu catalog boundary
pub mod catalog;

// Free text -> typed order request
pub mod extract;

// Order data model, disambiguation engine, finalizer
pub mod order;

// Cross-call conversation state
pub mod session;

// Chat transcript boundary
pub mod transcript;

// Price inquiry with bounded broadened-scope fallback
pub mod inquiry;

// Caller-facing operations
pub mod service;

// Public re-exports for the common call chain
pub use catalog::{CatalogService, PriceQuote, StaticCatalog};
pub use error::{
    CatalogError, ExtractionError, OrderError, OrderResult, SessionError, ValidationError,
};
pub use extract::{EntityExtractor, LlmClient, LlmOrderExtractor, OpenAiChatClient};
pub use inquiry::{PriceInquiry, PriceInquiryOutcome};
pub use order::{
    CatalogRow, DisambiguationEngine, EngineResult, LineItem, OrderLine, OrderRequest,
    PendingSelection, UnavailableDish,
};
pub use service::{OrderService, OrderStatus};
pub use session::{
    ConversationState, ItemChoices, SelectionKind, SelectionState, SessionStore, UserSelections,
};
pub use transcript::{EntryKind, MemoryTranscript, TranscriptStore};

#[cfg(feature = "database")]
pub use catalog::PgCatalog;

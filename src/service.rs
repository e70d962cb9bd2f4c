//! Order service
//!
//! Caller-facing operations for one conversation: submit free-text
//! order requests, answer pending selections, cancel, and inspect
//! status. Maps internal errors onto the closed `EngineResult` union:
//! validation errors keep the stored selection state so the caller can
//! resubmit, internal errors clear it so a conversation can never get
//! permanently stuck.
//!
//! The service does not serialize concurrent calls for the same
//! conversation; callers keep one in-flight request per conversation.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::catalog::CatalogService;
use crate::error::{OrderError, SessionError};
use crate::extract::EntityExtractor;
use crate::order::engine::Resolution;
use crate::order::{DisambiguationEngine, EngineResult, OrderRequest};
use crate::session::{SelectionKind, SessionStore, UserSelections};
use crate::transcript::{EntryKind, TranscriptStore};

/// Snapshot of a conversation's selection status.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderStatus {
    pub awaiting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_kind: Option<SelectionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dish: Option<String>,
}

/// Order resolution service for one conversation.
pub struct OrderService {
    conversation_id: Uuid,
    extractor: Arc<dyn EntityExtractor>,
    engine: DisambiguationEngine,
    sessions: SessionStore,
    transcript: Arc<dyn TranscriptStore>,
}

impl OrderService {
    pub fn new(
        conversation_id: Uuid,
        extractor: Arc<dyn EntityExtractor>,
        catalog: Arc<dyn CatalogService>,
        sessions: SessionStore,
        transcript: Arc<dyn TranscriptStore>,
    ) -> Self {
        Self {
            conversation_id,
            extractor,
            engine: DisambiguationEngine::new(catalog),
            sessions,
            transcript,
        }
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    /// Process a free-text order request.
    ///
    /// Accumulated user selections survive from earlier turns of this
    /// conversation; only `cancel` or a terminal result discards them.
    pub async fn submit_order_text(&self, text: &str) -> EngineResult {
        let result = match self.process_order_text(text).await {
            Ok(result) => result,
            Err(e) => self.error_result(e).await,
        };
        self.log_exchange(text, &result).await;
        result
    }

    async fn process_order_text(&self, text: &str) -> Result<EngineResult, OrderError> {
        let order = self.extractor.extract(text).await?;

        let selections = self
            .sessions
            .load(self.conversation_id)
            .await
            .map(|state| state.selections)
            .unwrap_or_default();

        self.resolve_and_store(order, selections).await
    }

    /// Process the user's answer to the pending selection.
    pub async fn submit_selection(&self, raw_choice: &str) -> EngineResult {
        let result = match self.process_selection(raw_choice).await {
            Ok(result) => result,
            Err(e) => self.error_result(e).await,
        };
        self.log_exchange(raw_choice, &result).await;
        result
    }

    async fn process_selection(&self, raw_choice: &str) -> Result<EngineResult, OrderError> {
        let Some(mut state) = self.sessions.load(self.conversation_id).await else {
            return Err(SessionError::NotAwaiting.into());
        };
        let Some(pending) = state.pending.take() else {
            return Err(SessionError::NotAwaiting.into());
        };

        // A non-matching answer fails this call only; the stored state
        // is untouched so the caller can resubmit.
        let value = pending.resolve_answer(raw_choice)?;

        state.record_choice(&pending.item_key, pending.kind, value);
        self.resolve_and_store(state.order, state.selections).await
    }

    /// Run one resolution pass and persist or clear state accordingly.
    async fn resolve_and_store(
        &self,
        order: OrderRequest,
        selections: UserSelections,
    ) -> Result<EngineResult, OrderError> {
        let resolution = self.engine.resolve(&order, &selections).await?;

        match &resolution {
            Resolution::Pending(pending) => {
                self.sessions
                    .begin(self.conversation_id, order, pending.clone(), selections)
                    .await;
            }
            Resolution::Complete { .. } => {
                self.sessions.clear(self.conversation_id).await;
            }
        }

        Ok(resolution.into_engine_result())
    }

    /// Cancel the conversation's order process. Unconditional and safe
    /// to call when nothing is in progress.
    pub async fn cancel(&self) {
        self.sessions.clear(self.conversation_id).await;
    }

    /// Current selection status.
    pub async fn status(&self) -> OrderStatus {
        match self.sessions.current(self.conversation_id).await {
            Some(pending) => OrderStatus {
                awaiting: true,
                selection_kind: Some(pending.kind),
                dish: Some(pending.dish_label),
            },
            None => OrderStatus {
                awaiting: false,
                selection_kind: None,
                dish: None,
            },
        }
    }

    /// Map an internal failure onto the result union.
    ///
    /// Validation and session errors pass through with their own
    /// messages and leave state alone; anything else clears the
    /// conversation so it cannot get stuck, and the detail stays in the
    /// logs.
    async fn error_result(&self, e: OrderError) -> EngineResult {
        let message = e.user_message();
        match e {
            OrderError::Validation(_) | OrderError::Session(_) | OrderError::Extraction(_) => {}
            other => {
                error!(conversation_id = %self.conversation_id, error = %other, "order processing failed");
                self.sessions.clear(self.conversation_id).await;
            }
        }
        EngineResult::Error { message }
    }

    async fn log_exchange(&self, user_text: &str, result: &EngineResult) {
        let kind = match result {
            EngineResult::Error { .. } => EntryKind::Error,
            _ => EntryKind::Json,
        };
        let response =
            serde_json::to_string(result).unwrap_or_else(|_| format!("{result:?}"));
        if let Err(e) = self
            .transcript
            .record(self.conversation_id, user_text, &response, kind)
            .await
        {
            warn!(conversation_id = %self.conversation_id, error = %e, "transcript write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::error::{ExtractionError, OrderResult};
    use crate::order::OrderRequest;
    use crate::transcript::MemoryTranscript;
    use async_trait::async_trait;

    struct NoOrderExtractor;

    #[async_trait]
    impl EntityExtractor for NoOrderExtractor {
        async fn extract(&self, _text: &str) -> OrderResult<OrderRequest> {
            Err(ExtractionError::MissingEntities.into())
        }
    }

    fn service() -> OrderService {
        OrderService::new(
            Uuid::new_v4(),
            Arc::new(NoOrderExtractor),
            Arc::new(StaticCatalog::new()),
            SessionStore::new(),
            Arc::new(MemoryTranscript::new()),
        )
    }

    #[tokio::test]
    async fn test_status_when_idle() {
        let service = service();
        let status = service.status().await;
        assert_eq!(
            status,
            OrderStatus {
                awaiting: false,
                selection_kind: None,
                dish: None
            }
        );
    }

    #[tokio::test]
    async fn test_selection_without_pending_state_is_session_error() {
        let service = service();
        let result = service.submit_selection("1").await;
        assert_eq!(
            result,
            EngineResult::Error {
                message: "No selection process is currently active".into()
            }
        );
    }

    #[tokio::test]
    async fn test_extraction_error_surfaces_immediately() {
        let service = service();
        let result = service.submit_order_text("hello there").await;
        assert_eq!(
            result,
            EngineResult::Error {
                message: "Invalid order data received".into()
            }
        );
    }

    #[tokio::test]
    async fn test_cancel_twice_is_safe() {
        let service = service();
        service.cancel().await;
        service.cancel().await;
        assert!(!service.status().await.awaiting);
    }
}

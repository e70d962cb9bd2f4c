//! Keyed conversation state store
//!
//! Shared mutable map of conversation id to `ConversationState` behind a
//! `tokio` RwLock. The store does not serialize concurrent calls for the
//! same key: racing writers are last-writer-wins, and keeping one
//! in-flight request per conversation is the caller's obligation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ConversationState, SelectionState, UserSelections};
use crate::order::OrderRequest;

/// In-memory conversation state store.
///
/// Clones share the underlying map, so one store can serve every
/// conversation in the process.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, ConversationState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist the full state for a conversation, replacing any previous
    /// state. With a populated `pending` this marks the conversation
    /// "awaiting selection".
    pub async fn save(&self, conversation_id: Uuid, state: ConversationState) {
        self.inner.write().await.insert(conversation_id, state);
    }

    /// Persist an order with its pending selection and accumulated
    /// answers, marking the conversation "awaiting selection".
    pub async fn begin(
        &self,
        conversation_id: Uuid,
        order: OrderRequest,
        selection: SelectionState,
        selections: UserSelections,
    ) {
        self.save(
            conversation_id,
            ConversationState {
                order,
                selections,
                pending: Some(selection),
            },
        )
        .await;
    }

    /// Snapshot of a conversation's state, if any.
    pub async fn load(&self, conversation_id: Uuid) -> Option<ConversationState> {
        self.inner.read().await.get(&conversation_id).cloned()
    }

    /// The pending selection, if the conversation is awaiting one.
    pub async fn current(&self, conversation_id: Uuid) -> Option<SelectionState> {
        self.inner
            .read()
            .await
            .get(&conversation_id)
            .and_then(|state| state.pending.clone())
    }

    /// Whether the conversation is awaiting a selection answer.
    pub async fn is_awaiting(&self, conversation_id: Uuid) -> bool {
        self.current(conversation_id).await.is_some()
    }

    /// Remove all state for a conversation. Safe to call when none
    /// exists.
    pub async fn clear(&self, conversation_id: Uuid) {
        self.inner.write().await.remove(&conversation_id);
    }
}

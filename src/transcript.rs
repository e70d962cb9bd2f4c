//! Conversation transcript boundary
//!
//! Persisting the chat transcript is a collaborator concern; the order
//! pipeline only needs a sink it can write to. Failures here are
//! demoted to warnings at the call site: a logging failure must never
//! abort order resolution.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// What kind of payload a transcript entry carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Text,
    Json,
    Error,
}

/// One user/assistant exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    pub user_text: String,
    pub response: String,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
}

/// Append-only transcript store keyed by conversation.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn record(
        &self,
        conversation_id: Uuid,
        user_text: &str,
        response: &str,
        kind: EntryKind,
    ) -> anyhow::Result<()>;

    async fn history(&self, conversation_id: Uuid) -> anyhow::Result<Vec<TranscriptEntry>>;
}

/// In-memory transcript store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTranscript {
    inner: Arc<RwLock<HashMap<Uuid, Vec<TranscriptEntry>>>>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptStore for MemoryTranscript {
    async fn record(
        &self,
        conversation_id: Uuid,
        user_text: &str,
        response: &str,
        kind: EntryKind,
    ) -> anyhow::Result<()> {
        self.inner
            .write()
            .await
            .entry(conversation_id)
            .or_default()
            .push(TranscriptEntry {
                user_text: user_text.to_string(),
                response: response.to_string(),
                kind,
                created_at: Utc::now(),
            });
        Ok(())
    }

    async fn history(&self, conversation_id: Uuid) -> anyhow::Result<Vec<TranscriptEntry>> {
        Ok(self
            .inner
            .read()
            .await
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }
}

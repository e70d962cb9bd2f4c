//! Conversation selection state
//!
//! The cross-call state of one in-progress order resolution: the pending
//! selection question, the immutable order request snapshot, and the
//! answers accumulated so far. A conversation holds at most one
//! `SelectionState` at a time; it is replaced, never merged.

pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::order::OrderRequest;

pub use store::SessionStore;

/// What the pending question is about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    DishOption,
    Variant,
    Size,
}

impl SelectionKind {
    /// The line-item field this selection fills.
    pub fn field_name(&self) -> &'static str {
        match self {
            SelectionKind::DishOption => "dish",
            SelectionKind::Variant => "variant",
            SelectionKind::Size => "size",
        }
    }
}

/// The question currently posed to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionState {
    pub kind: SelectionKind,
    pub item_key: String,
    /// Human label for the item (original dish text for dish-option
    /// questions, effective dish otherwise).
    pub dish_label: String,
    /// Offered options, catalog order preserved.
    pub options: Vec<String>,
    #[serde(default)]
    pub current_choice: Option<String>,
    #[serde(default)]
    pub validation_error: Option<String>,
    pub remaining_items: usize,
}

impl SelectionState {
    /// Resolve a raw user answer against the offered options.
    ///
    /// A positive integer `n` selects `options[n-1]`; otherwise the text
    /// must case-insensitively equal one option, which is returned in its
    /// canonical lowercase form. Nothing is mutated on failure.
    pub fn resolve_answer(&self, raw: &str) -> Result<String, ValidationError> {
        if self.options.is_empty() {
            return Err(ValidationError::NoOptions);
        }

        let raw = raw.trim();
        if let Ok(n) = raw.parse::<usize>() {
            if n >= 1 && n <= self.options.len() {
                return Ok(self.options[n - 1].to_lowercase());
            }
            return Err(ValidationError::IndexOutOfRange {
                max: self.options.len(),
            });
        }

        let lowered = raw.to_lowercase();
        if let Some(option) = self
            .options
            .iter()
            .find(|option| option.to_lowercase() == lowered)
        {
            return Ok(option.to_lowercase());
        }

        Err(ValidationError::UnknownOption {
            options: self.options.join(", "),
        })
    }
}

/// Accumulated answers for one line item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemChoices {
    #[serde(default)]
    pub dish: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl ItemChoices {
    pub fn get(&self, kind: SelectionKind) -> Option<&str> {
        match kind {
            SelectionKind::DishOption => self.dish.as_deref(),
            SelectionKind::Variant => self.variant.as_deref(),
            SelectionKind::Size => self.size.as_deref(),
        }
    }

    pub fn set(&mut self, kind: SelectionKind, value: String) {
        match kind {
            SelectionKind::DishOption => self.dish = Some(value),
            SelectionKind::Variant => self.variant = Some(value),
            SelectionKind::Size => self.size = Some(value),
        }
    }
}

/// Answers accumulated across turns, keyed by item.
pub type UserSelections = BTreeMap<String, ItemChoices>;

/// Everything persisted for one conversation between turns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    pub order: OrderRequest,
    pub selections: UserSelections,
    #[serde(default)]
    pub pending: Option<SelectionState>,
}

impl ConversationState {
    pub fn new(order: OrderRequest) -> Self {
        Self {
            order,
            selections: UserSelections::new(),
            pending: None,
        }
    }

    /// Record one accepted answer for an item.
    pub fn record_choice(&mut self, item_key: &str, kind: SelectionKind, value: String) {
        self.selections
            .entry(item_key.to_string())
            .or_default()
            .set(kind, value);
    }
}

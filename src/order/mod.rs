//! Order domain types
//!
//! The typed data model for order resolution: the immutable order request
//! produced by the entity extractor, catalog rows, finalized order lines,
//! and the caller-facing `EngineResult` union.

pub mod engine;
pub mod finalize;
pub mod normalize;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use engine::DisambiguationEngine;
pub use finalize::{finalize_items, total_items};

/// Restaurant used when the customer names none.
pub const DEFAULT_RESTAURANT: &str = "ourselection";

/// One requested dish within an order, pre-normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(default)]
    pub dish: Option<String>,

    #[serde(default)]
    pub variant: Option<String>,

    #[serde(default)]
    pub size: Option<String>,

    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// A structured order request as extracted from free text.
///
/// Immutable once validated at the boundary. `BTreeMap` keeps the
/// extractor's `item1..itemN` keys in a stable, deterministic order,
/// which the engine relies on for its left-to-right guarantee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRequest {
    pub restaurant: String,
    pub items: BTreeMap<String, LineItem>,
}

impl OrderRequest {
    pub fn new(restaurant: impl Into<String>) -> Self {
        Self {
            restaurant: restaurant.into(),
            items: BTreeMap::new(),
        }
    }

    pub fn with_item(mut self, key: impl Into<String>, item: LineItem) -> Self {
        self.items.insert(key.into(), item);
        self
    }
}

/// A purchasable unit in a restaurant's menu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogRow {
    pub food_id: i64,
    pub dish_name: String,
    pub variant: Option<String>,
    pub size: Option<String>,
    pub price: Decimal,
}

/// A finalized, priced order line.
///
/// Carries the unit price and quantity only; multiplication and summary
/// text belong to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub food_id: i64,
    pub dish: String,
    pub variant: String,
    pub size: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// A line item that could not be matched to any catalog row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnavailableDish {
    pub dish: String,
    pub message: String,
}

/// A pending selection surfaced to the caller.
///
/// `dish` is the human label: the original, non-normalized dish text for
/// dish-option selections, the effective dish for variant/size ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingSelection {
    pub item_key: String,
    pub dish: String,
    pub options: Vec<String>,

    #[serde(default)]
    pub current_choice: Option<String>,

    /// Set when a previously recorded choice is no longer valid for the
    /// offered options.
    #[serde(default)]
    pub validation_error: Option<String>,

    pub remaining_items: usize,
}

/// Caller-facing result of one resolution call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineResult {
    NeedsDishSelection { item: PendingSelection },
    NeedsVariant { item: PendingSelection },
    NeedsSize { item: PendingSelection },
    Complete {
        orders: Vec<OrderLine>,
        unavailable_dishes: Vec<UnavailableDish>,
    },
    Error { message: String },
}

impl EngineResult {
    /// Whether this result ends the conversation's selection loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineResult::Complete { .. } | EngineResult::Error { .. })
    }
}

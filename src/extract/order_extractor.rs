//! LLM-backed order extraction
//!
//! Renders the few-shot extraction prompt, calls the chat model, and
//! validates its free-form JSON once at the boundary into a typed
//! `OrderRequest`. Everything downstream of this module works with
//! typed data only.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::llm_client::LlmClient;
use super::EntityExtractor;
use crate::error::{ExtractionError, OrderResult};
use crate::order::{LineItem, OrderRequest, DEFAULT_RESTAURANT};

/// Known restaurants, used to steer extraction.
const RESTAURANTS: &[&str] = &[
    "Kandiah",
    "Ice Talk",
    "Bluberry",
    "Jollybeez",
    "Mum's Food",
    "ourselection",
];

/// Known dish names, used to steer extraction and spelling correction.
const DISHES: &[&str] = &[
    "Kotthu",
    "Kotthu Rotti",
    "Cheese Kotthu",
    "Dolphin",
    "Pittu Kotthu",
    "Noodles",
    "Pasta",
    "String Hopper Kotthu",
    "Bread Kotthu",
    "Rice & Curry",
    "Schezwan Rice",
    "Mongolian Rice",
    "Nasi Goreng",
    "Biriyani",
    "Fried Rice",
    "Parata",
    "Naan",
    "French Fries",
    "Soup",
    "Salad",
    "Hopper",
    "Rolls",
    "Samosa",
    "Vadai",
    "Shawarma",
    "Bun",
];

const EXTRACTION_RULES: &str = r#"You are a multilingual assistant for a food delivery platform taking orders from customers. You understand Tanglish, Singlish and English.

Extract the restaurant and every ordered item from the user query:
- Correct misspelled restaurant and dish names to the closest match in the provided lists; translate Tanglish/Singlish dish names to their listed spelling.
- If no restaurant is named, use "ourselection".
- Word quantities become numbers (two -> 2, three -> 3); missing quantity is 1.
- Sizes are "small", "medium", "large" or "null". Refine portion talk: normal -> small, half -> small, full -> medium.
- If the query contains no food item, set fallback_message to: "Sorry, I couldn't find any food items in your request. Could you please mention what you'd like to order?"
- If more than one restaurant is named, set fallback_message to: "I can assist with placing an order from one restaurant at a time. Please select a single restaurant so we can continue."

Return only a JSON object shaped as:
{"restaurant_name": "...", "entities": {"item1": {"dish": "...", "variant": "...", "size": "...", "qty": 1}}, "fallback_message": null}

Examples:
Input: "Can I get a medium beef kothu in bluripples?"
Output: {"restaurant_name": "Bluberry", "entities": {"item1": {"dish": "Kotthu", "variant": "beef", "size": "medium", "qty": 1}}, "fallback_message": null}

Input: "Order six beef rolls and six chicken rolls."
Output: {"restaurant_name": "ourselection", "entities": {"item1": {"dish": "Rolls", "variant": "beef", "size": null, "qty": 6}, "item2": {"dish": "Rolls", "variant": "chicken", "size": null, "qty": 6}}, "fallback_message": null}

Input: "Order chicken full kotthu 2."
Output: {"restaurant_name": "ourselection", "entities": {"item1": {"dish": "Kotthu", "variant": "chicken", "size": "medium", "qty": 2}}, "fallback_message": null}"#;

/// Raw, loosely shaped extractor payload (validated before use).
#[derive(Debug, Deserialize)]
struct RawOrderPayload {
    #[serde(default)]
    restaurant_name: Option<String>,

    #[serde(default)]
    entities: Option<BTreeMap<String, RawLineItem>>,

    #[serde(default)]
    fallback_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLineItem {
    #[serde(default)]
    dish: Option<String>,

    #[serde(default)]
    variant: Option<String>,

    #[serde(default)]
    size: Option<String>,

    /// Quantity arrives as a number, a numeric string, or "null".
    #[serde(default, deserialize_with = "deserialize_quantity")]
    qty: Option<u32>,
}

fn deserialize_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => {
            n.as_u64().and_then(|n| u32::try_from(n).ok())
        }
        Some(serde_json::Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

/// Entity extractor backed by a chat model.
pub struct LlmOrderExtractor {
    llm: Arc<dyn LlmClient>,
}

impl LlmOrderExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn system_prompt() -> String {
        format!(
            "{EXTRACTION_RULES}\n\nRestaurants: {}\nDishes: {}",
            RESTAURANTS.join(", "),
            DISHES.join(", ")
        )
    }

    /// Validate the extractor payload into a typed `OrderRequest`.
    ///
    /// Missing or empty entities is an `ExtractionError`; an item with a
    /// null dish is kept and dropped later by the engine, per contract.
    fn validate(payload: RawOrderPayload) -> Result<OrderRequest, ExtractionError> {
        if let Some(message) = payload.fallback_message.filter(is_meaningful) {
            return Err(ExtractionError::Fallback { message });
        }

        let entities = payload
            .entities
            .filter(|entities| !entities.is_empty())
            .ok_or(ExtractionError::MissingEntities)?;

        let restaurant = payload
            .restaurant_name
            .filter(is_meaningful)
            .unwrap_or_else(|| DEFAULT_RESTAURANT.to_string());

        let items = entities
            .into_iter()
            .map(|(key, item)| {
                (
                    key,
                    LineItem {
                        dish: item.dish,
                        variant: item.variant,
                        size: item.size,
                        quantity: item.qty.unwrap_or(1).max(1),
                    },
                )
            })
            .collect();

        Ok(OrderRequest { restaurant, items })
    }
}

fn is_meaningful(value: &String) -> bool {
    let cleaned = value.trim().to_lowercase();
    !cleaned.is_empty() && cleaned != "null" && cleaned != "none"
}

#[async_trait]
impl EntityExtractor for LlmOrderExtractor {
    async fn extract(&self, text: &str) -> OrderResult<OrderRequest> {
        let raw = self
            .llm
            .chat_json(&Self::system_prompt(), text)
            .await
            .map_err(|e| ExtractionError::Unavailable {
                message: e.to_string(),
            })?;

        debug!(model = %self.llm.model_name(), "extractor raw response: {raw}");

        let payload: RawOrderPayload =
            serde_json::from_str(strip_code_fences(&raw)).map_err(|e| {
                ExtractionError::Malformed {
                    message: e.to_string(),
                }
            })?;

        Ok(Self::validate(payload)?)
    }
}

/// Some models wrap JSON in markdown fences despite instructions.
fn strip_code_fences(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

//! End-to-end order disambiguation flows
//!
//! Drives the full call chain with a scripted LLM and an in-memory
//! catalog: free text in, pending selections across turns, priced
//! order out.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use foodstation::{
    CatalogRow, EngineResult, LlmClient, LlmOrderExtractor, MemoryTranscript, OrderService,
    SelectionKind, SessionStore, StaticCatalog,
};

/// LLM stub mapping whole utterances to canned JSON payloads.
struct ScriptedLlm {
    responses: HashMap<String, String>,
}

impl ScriptedLlm {
    fn new(responses: &[(&str, &str)]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat_json(&self, _system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        self.responses
            .get(user_prompt)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no scripted response for {user_prompt:?}"))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn row(
    food_id: i64,
    dish: &str,
    variant: Option<&str>,
    size: Option<&str>,
    price: i64,
) -> CatalogRow {
    CatalogRow {
        food_id,
        dish_name: dish.into(),
        variant: variant.map(String::from),
        size: size.map(String::from),
        price: Decimal::new(price, 2),
    }
}

/// Kandiah: "Kotthu Rotti" in beef/chicken x small/medium, plus the
/// unambiguous "Dolphin" and a second "* Kotthu" dish so a bare
/// "kotthu" is dish-ambiguous.
fn kandiah_catalog() -> Arc<StaticCatalog> {
    let mut catalog = StaticCatalog::new();
    catalog.push("Kandiah", row(1, "Kotthu Rotti", Some("beef"), Some("small"), 900));
    catalog.push("Kandiah", row(2, "Kotthu Rotti", Some("beef"), Some("medium"), 1200));
    catalog.push("Kandiah", row(3, "Kotthu Rotti", Some("chicken"), Some("small"), 950));
    catalog.push("Kandiah", row(4, "Kotthu Rotti", Some("chicken"), Some("medium"), 1250));
    catalog.push("Kandiah", row(5, "Cheese Kotthu", Some("chicken"), None, 1100));
    catalog.push("Kandiah", row(6, "Dolphin", None, None, 700));
    Arc::new(catalog)
}

fn service_with(responses: &[(&str, &str)]) -> OrderService {
    let llm = Arc::new(ScriptedLlm::new(responses));
    OrderService::new(
        Uuid::new_v4(),
        Arc::new(LlmOrderExtractor::new(llm)),
        kandiah_catalog(),
        SessionStore::new(),
        Arc::new(MemoryTranscript::new()),
    )
}

const KOTTHU_ORDER: &str = "order two kotthu rotti from kandiah";
const KOTTHU_PAYLOAD: &str = r#"{"restaurant_name": "Kandiah", "entities": {"item1": {"dish": "Kotthu Rotti", "variant": null, "size": null, "qty": 2}}, "fallback_message": null}"#;

#[tokio::test]
async fn variant_then_size_then_complete() {
    let service = service_with(&[(KOTTHU_ORDER, KOTTHU_PAYLOAD)]);

    // First turn: variants are ambiguous.
    let result = service.submit_order_text(KOTTHU_ORDER).await;
    let EngineResult::NeedsVariant { item } = result else {
        panic!("expected NeedsVariant, got {result:?}");
    };
    assert_eq!(item.item_key, "item1");
    assert_eq!(item.options, vec!["beef", "chicken"]);
    assert_eq!(item.remaining_items, 1);

    let status = service.status().await;
    assert!(status.awaiting);
    assert_eq!(status.selection_kind, Some(SelectionKind::Variant));

    // Second turn: sizes.
    let result = service.submit_selection("beef").await;
    let EngineResult::NeedsSize { item } = result else {
        panic!("expected NeedsSize, got {result:?}");
    };
    assert_eq!(item.options, vec!["small", "medium"]);

    // Third turn: done.
    let result = service.submit_selection("small").await;
    let EngineResult::Complete {
        orders,
        unavailable_dishes,
    } = result
    else {
        panic!("expected Complete, got {result:?}");
    };
    assert!(unavailable_dishes.is_empty());
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].food_id, 1);
    assert_eq!(orders[0].variant, "beef");
    assert_eq!(orders[0].size, "small");
    assert_eq!(orders[0].quantity, 2);
    assert_eq!(orders[0].price, Decimal::new(900, 2));

    assert!(!service.status().await.awaiting);
}

#[tokio::test]
async fn unambiguous_item_completes_on_first_call() {
    let text = "one dolphin from kandiah";
    let payload = r#"{"restaurant_name": "Kandiah", "entities": {"item1": {"dish": "Dolphin", "variant": null, "size": null, "qty": 1}}, "fallback_message": null}"#;
    let service = service_with(&[(text, payload)]);

    let result = service.submit_order_text(text).await;
    let EngineResult::Complete { orders, .. } = result else {
        panic!("expected Complete, got {result:?}");
    };
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].food_id, 6);
    assert_eq!(orders[0].quantity, 1);
}

#[tokio::test]
async fn dish_ambiguity_is_asked_before_variant() {
    let text = "a kotthu from kandiah";
    let payload = r#"{"restaurant_name": "Kandiah", "entities": {"item1": {"dish": "Kotthu", "variant": null, "size": null, "qty": 1}}, "fallback_message": null}"#;
    let service = service_with(&[(text, payload)]);

    let result = service.submit_order_text(text).await;
    let EngineResult::NeedsDishSelection { item } = result else {
        panic!("expected NeedsDishSelection, got {result:?}");
    };
    assert_eq!(item.dish, "Kotthu");
    assert_eq!(item.options, vec!["kotthu rotti", "cheese kotthu"]);

    // Index answer picks the second dish. Its variant set is non-empty,
    // so the variant question still comes, even with a single option.
    let result = service.submit_selection("2").await;
    let EngineResult::NeedsVariant { item } = result else {
        panic!("expected NeedsVariant, got {result:?}");
    };
    assert_eq!(item.dish, "cheese kotthu");
    assert_eq!(item.options, vec!["chicken"]);

    let result = service.submit_selection("1").await;
    let EngineResult::Complete { orders, .. } = result else {
        panic!("expected Complete, got {result:?}");
    };
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].food_id, 5);
    assert_eq!(orders[0].dish, "cheese kotthu");
}

#[tokio::test]
async fn earlier_item_is_always_resolved_first() {
    let text = "kotthu rotti and another kotthu rotti";
    let payload = r#"{"restaurant_name": "Kandiah", "entities": {"item1": {"dish": "Kotthu Rotti", "variant": null, "size": null, "qty": 1}, "item2": {"dish": "Kotthu Rotti", "variant": null, "size": null, "qty": 1}}, "fallback_message": null}"#;
    let service = service_with(&[(text, payload)]);

    let result = service.submit_order_text(text).await;
    let EngineResult::NeedsVariant { item } = result else {
        panic!("expected NeedsVariant, got {result:?}");
    };
    assert_eq!(item.item_key, "item1");
    assert_eq!(item.remaining_items, 2);

    // item1 still pending after variant: size comes next, never item2.
    let result = service.submit_selection("chicken").await;
    let EngineResult::NeedsSize { item } = result else {
        panic!("expected NeedsSize, got {result:?}");
    };
    assert_eq!(item.item_key, "item1");

    let result = service.submit_selection("medium").await;
    let EngineResult::NeedsVariant { item } = result else {
        panic!("expected NeedsVariant for item2, got {result:?}");
    };
    assert_eq!(item.item_key, "item2");
    assert_eq!(item.remaining_items, 1);
}

#[tokio::test]
async fn resubmitting_the_same_order_is_idempotent() {
    let service = service_with(&[(KOTTHU_ORDER, KOTTHU_PAYLOAD)]);

    let first = service.submit_order_text(KOTTHU_ORDER).await;
    let second = service.submit_order_text(KOTTHU_ORDER).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn invalid_answer_keeps_the_selection_open() {
    let service = service_with(&[(KOTTHU_ORDER, KOTTHU_PAYLOAD)]);
    service.submit_order_text(KOTTHU_ORDER).await;

    // Out-of-range index.
    let result = service.submit_selection("7").await;
    assert_eq!(
        result,
        EngineResult::Error {
            message: "Invalid choice. Please select a number between 1 and 2".into()
        }
    );
    assert!(service.status().await.awaiting);

    // Unknown text.
    let result = service.submit_selection("mutton").await;
    let EngineResult::Error { message } = result else {
        panic!("expected Error, got {result:?}");
    };
    assert!(message.contains("beef, chicken"));
    assert!(service.status().await.awaiting);

    // The conversation recovers with a valid answer, in any case.
    let result = service.submit_selection("BEEF").await;
    assert!(matches!(result, EngineResult::NeedsSize { .. }));
}

#[tokio::test]
async fn cancel_twice_leaves_no_residual_state() {
    let service = service_with(&[(KOTTHU_ORDER, KOTTHU_PAYLOAD)]);
    service.submit_order_text(KOTTHU_ORDER).await;
    assert!(service.status().await.awaiting);

    service.cancel().await;
    service.cancel().await;

    assert!(!service.status().await.awaiting);
    let result = service.submit_selection("beef").await;
    assert_eq!(
        result,
        EngineResult::Error {
            message: "No selection process is currently active".into()
        }
    );
}

#[tokio::test]
async fn unknown_dish_is_reported_alongside_good_items() {
    let text = "dolphin and pizza from kandiah";
    let payload = r#"{"restaurant_name": "Kandiah", "entities": {"item1": {"dish": "Dolphin", "variant": null, "size": null, "qty": 1}, "item2": {"dish": "Pizza", "variant": null, "size": null, "qty": 1}}, "fallback_message": null}"#;
    let service = service_with(&[(text, payload)]);

    let result = service.submit_order_text(text).await;
    let EngineResult::Complete {
        orders,
        unavailable_dishes,
    } = result
    else {
        panic!("expected Complete, got {result:?}");
    };
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].dish, "dolphin");
    assert_eq!(unavailable_dishes.len(), 1);
    assert_eq!(unavailable_dishes[0].dish, "pizza");
}

#[tokio::test]
async fn extractor_fallback_message_is_surfaced() {
    let text = "hello!";
    let payload = r#"{"restaurant_name": null, "entities": null, "fallback_message": "Sorry, I couldn't find any food items in your request. Could you please mention what you'd like to order?"}"#;
    let service = service_with(&[(text, payload)]);

    let result = service.submit_order_text(text).await;
    let EngineResult::Error { message } = result else {
        panic!("expected Error, got {result:?}");
    };
    assert!(message.contains("couldn't find any food items"));
    assert!(!service.status().await.awaiting);
}

//! Interactive ordering REPL.
//!
//! Reads one line at a time from stdin: while a selection is pending the
//! line is treated as the answer, otherwise as a new free-text order.
//! `cancel` drops the in-progress order, `quit` exits.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use foodstation::config::AppConfig;
use foodstation::extract::{LlmOrderExtractor, OpenAiChatClient};
use foodstation::{MemoryTranscript, OrderService, SessionStore, StaticCatalog};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let llm = match &config.llm_model {
        Some(model) => OpenAiChatClient::with_model(config.llm_api_key.clone(), model),
        None => OpenAiChatClient::new(config.llm_api_key.clone()),
    };

    let service = OrderService::new(
        Uuid::new_v4(),
        Arc::new(LlmOrderExtractor::new(Arc::new(llm))),
        Arc::new(sample_menu()),
        SessionStore::new(),
        Arc::new(MemoryTranscript::new()),
    );

    println!("Type an order (e.g. \"two beef kotthu from Kandiah\"), 'cancel', or 'quit'.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "quit" | "exit" => break,
            "cancel" => {
                service.cancel().await;
                println!("Order cancelled.");
                continue;
            }
            _ => {}
        }

        let result = if service.status().await.awaiting {
            service.submit_selection(line).await
        } else {
            service.submit_order_text(line).await
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

/// A small fixed menu so the demo runs without a database.
fn sample_menu() -> StaticCatalog {
    use foodstation::CatalogRow;
    use rust_decimal::Decimal;

    let row = |food_id, dish: &str, variant: Option<&str>, size: Option<&str>, cents| CatalogRow {
        food_id,
        dish_name: dish.to_string(),
        variant: variant.map(String::from),
        size: size.map(String::from),
        price: Decimal::new(cents, 2),
    };

    let mut menu = StaticCatalog::new();
    menu.push("Kandiah", row(1, "Kotthu Rotti", Some("beef"), Some("small"), 9_00));
    menu.push("Kandiah", row(2, "Kotthu Rotti", Some("beef"), Some("medium"), 12_00));
    menu.push("Kandiah", row(3, "Kotthu Rotti", Some("chicken"), Some("small"), 9_50));
    menu.push("Kandiah", row(4, "Kotthu Rotti", Some("chicken"), Some("medium"), 12_50));
    menu.push("Kandiah", row(5, "Cheese Kotthu", Some("chicken"), None, 13_00));
    menu.push("Kandiah", row(6, "Dolphin", None, None, 7_00));
    menu.push("Ice Talk", row(7, "Rolls", Some("beef"), None, 3_50));
    menu.push("Ice Talk", row(8, "Rolls", Some("chicken"), None, 3_50));
    menu.push("Ice Talk", row(9, "Nasi Goreng", None, Some("medium"), 11_00));
    menu
}

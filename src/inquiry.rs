//! Price inquiry with broadened-scope fallback
//!
//! A price lookup scoped to one restaurant that, on an empty result,
//! broadens to all restaurants. The broadening is an explicit bounded
//! loop with an attempt counter, so the bound is unit-testable and call
//! depth stays flat.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{CatalogService, PriceQuote};
use crate::error::OrderResult;

/// One broadening step: scoped, then global.
pub const MAX_BROADEN_ATTEMPTS: usize = 1;

/// Result of a price inquiry.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceInquiryOutcome {
    pub quotes: Vec<PriceQuote>,
    /// Set when the scoped lookup missed and the results come from a
    /// broadened search.
    pub note: Option<String>,
}

/// Price inquiry over the catalog.
pub struct PriceInquiry {
    catalog: Arc<dyn CatalogService>,
}

impl PriceInquiry {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    /// Look up prices for a dish, optionally scoped to a restaurant.
    ///
    /// An empty scoped result broadens to all restaurants at most
    /// `MAX_BROADEN_ATTEMPTS` times. An empty result after broadening is
    /// returned as-is with no note; "nobody serves this" is the caller's
    /// message to render.
    pub async fn lookup(
        &self,
        restaurant: Option<&str>,
        dish: &str,
    ) -> OrderResult<PriceInquiryOutcome> {
        let mut scope = restaurant;
        let mut note = None;

        for attempt in 0..=MAX_BROADEN_ATTEMPTS {
            let quotes = self.catalog.price_inquiry(scope, dish).await?;
            if !quotes.is_empty() {
                return Ok(PriceInquiryOutcome { quotes, note });
            }

            // Only a scoped miss can broaden; a global miss is final.
            match scope.take() {
                Some(missed) if attempt < MAX_BROADEN_ATTEMPTS => {
                    debug!(restaurant = %missed, %dish, "scoped price lookup empty, broadening");
                    note = Some(format!(
                        "Unfortunately {missed} doesn't serve {dish}. Here is {dish} information from other places."
                    ));
                }
                _ => break,
            }
        }

        Ok(PriceInquiryOutcome {
            quotes: Vec::new(),
            note: None,
        })
    }
}

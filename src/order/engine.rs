//! Disambiguation engine
//!
//! Scans the order's line items in their stable order, determines the
//! next unresolved ambiguity (dish, then variant, then size), and either
//! surfaces a pending selection for the first ambiguous item or hands
//! everything to the finalizer. The engine is pure given its inputs and
//! the catalog's current answers: it holds no mutable state, so repeated
//! calls with unchanged inputs return the same result.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::CatalogService;
use crate::error::{CatalogError, OrderResult};
use crate::order::finalize::{finalize_items, ResolvedItem};
use crate::order::normalize::{normalize, normalize_opt, normalize_size};
use crate::order::{
    CatalogRow, EngineResult, OrderLine, OrderRequest, PendingSelection, UnavailableDish,
};
use crate::session::{ItemChoices, SelectionKind, SelectionState, UserSelections};

/// Outcome of one resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// An item still needs a selection; persist this and ask the user.
    Pending(SelectionState),
    /// Every item cleared all checks (or was dropped/unavailable).
    Complete {
        orders: Vec<OrderLine>,
        unavailable: Vec<UnavailableDish>,
    },
}

impl Resolution {
    /// Caller-facing representation.
    pub fn into_engine_result(self) -> EngineResult {
        match self {
            Resolution::Pending(state) => {
                let item = PendingSelection {
                    item_key: state.item_key,
                    dish: state.dish_label,
                    options: state.options,
                    current_choice: state.current_choice,
                    validation_error: state.validation_error,
                    remaining_items: state.remaining_items,
                };
                match state.kind {
                    SelectionKind::DishOption => EngineResult::NeedsDishSelection { item },
                    SelectionKind::Variant => EngineResult::NeedsVariant { item },
                    SelectionKind::Size => EngineResult::NeedsSize { item },
                }
            }
            Resolution::Complete {
                orders,
                unavailable,
            } => EngineResult::Complete {
                orders,
                unavailable_dishes: unavailable,
            },
        }
    }
}

/// Working view of one line item with its catalog answers.
#[derive(Debug, Clone)]
struct ItemInfo {
    item_key: String,
    /// Original, non-normalized dish text (the human label for
    /// dish-option questions).
    original_dish: String,
    dish: String,
    variant: Option<String>,
    size: Option<String>,
    quantity: u32,
    rows: Vec<CatalogRow>,
    dish_options: Vec<String>,
    available_variants: Vec<String>,
    available_sizes: Vec<String>,
}

/// The next unmet requirement for an item, in strict priority order.
#[derive(Debug, Clone, PartialEq)]
enum Requirement {
    Dish,
    Variant { invalid: Option<String> },
    Size { invalid: Option<String> },
    Satisfied,
}

impl Requirement {
    fn is_unmet(&self) -> bool {
        !matches!(self, Requirement::Satisfied)
    }
}

/// Drives the turn-by-turn narrowing of an order request.
pub struct DisambiguationEngine {
    catalog: Arc<dyn CatalogService>,
}

impl DisambiguationEngine {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    /// Resolve an order request against the accumulated user answers.
    ///
    /// Items are visited in the request's original order; the first item
    /// with an unmet requirement wins, so an item later in the order is
    /// never surfaced while an earlier one is unresolved.
    pub async fn resolve(
        &self,
        order: &OrderRequest,
        selections: &UserSelections,
    ) -> OrderResult<Resolution> {
        let mut unavailable = Vec::new();
        let items = self
            .collect_items(order, selections, &mut unavailable)
            .await?;

        let requirements: Vec<Requirement> = items
            .iter()
            .map(|item| check_item(item, selections.get(&item.item_key)))
            .collect();
        let remaining = requirements.iter().filter(|r| r.is_unmet()).count();

        for (item, requirement) in items.iter().zip(&requirements) {
            if let Some(state) = pending_state(item, requirement, selections, remaining) {
                debug!(
                    item_key = %state.item_key,
                    kind = ?state.kind,
                    remaining,
                    "item needs a selection"
                );
                return Ok(Resolution::Pending(state));
            }
        }

        let resolved: Vec<ResolvedItem> = items
            .into_iter()
            .map(|item| {
                let choices = selections.get(&item.item_key);
                ResolvedItem {
                    dish: effective_dish(&item, choices),
                    variant: effective_variant(&item, choices),
                    size: effective_size(&item, choices),
                    quantity: item.quantity,
                    rows: item.rows,
                }
            })
            .collect();

        let (orders, mut missed) = finalize_items(resolved);
        unavailable.append(&mut missed);
        Ok(Resolution::Complete {
            orders,
            unavailable,
        })
    }

    /// Normalize each line item and fetch its catalog rows.
    ///
    /// Items without a dish are dropped silently; items whose lookup
    /// fails or comes back empty are recorded as unavailable and never
    /// abort their siblings.
    async fn collect_items(
        &self,
        order: &OrderRequest,
        selections: &UserSelections,
        unavailable: &mut Vec<UnavailableDish>,
    ) -> OrderResult<Vec<ItemInfo>> {
        let mut items = Vec::new();

        for (item_key, line) in &order.items {
            let Some(dish) = normalize_opt(line.dish.as_deref()) else {
                debug!(%item_key, "line item has no dish, dropping");
                continue;
            };

            // A recorded dish choice narrows the lookup to that exact
            // dish; otherwise try exact first, then substring.
            let chosen_dish = selections
                .get(item_key)
                .and_then(|choices| choices.dish.clone());
            let lookup_dish = chosen_dish.clone().unwrap_or_else(|| dish.clone());

            let rows = match self
                .fetch_rows(&order.restaurant, &lookup_dish, chosen_dish.is_some())
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    // Query detail stays in the log; the caller gets a
                    // generic message.
                    warn!(%item_key, dish = %lookup_dish, error = %e, "catalog lookup failed");
                    unavailable.push(UnavailableDish {
                        dish: dish.clone(),
                        message: format!("Could not look up '{dish}' right now"),
                    });
                    continue;
                }
            };

            if rows.is_empty() {
                let not_found = CatalogError::DishNotFound {
                    dish: lookup_dish.clone(),
                    restaurant: order.restaurant.clone(),
                };
                unavailable.push(UnavailableDish {
                    dish: dish.clone(),
                    message: not_found.to_string(),
                });
                continue;
            }

            items.push(build_item_info(
                item_key.clone(),
                line.dish.clone().unwrap_or_default(),
                dish,
                normalize_opt(line.variant.as_deref()),
                normalize_size(line.size.as_deref()),
                line.quantity.max(1),
                rows,
            ));
        }

        Ok(items)
    }

    /// Exact-then-substring lookup as a bounded two-attempt loop.
    ///
    /// When the dish comes from a recorded user choice it is already an
    /// exact catalog name, so only the exact attempt runs.
    async fn fetch_rows(
        &self,
        restaurant: &str,
        dish: &str,
        exact_only: bool,
    ) -> Result<Vec<CatalogRow>, CatalogError> {
        let attempts: &[bool] = if exact_only { &[true] } else { &[true, false] };
        for &exact in attempts {
            let rows = self.catalog.lookup(restaurant, dish, exact).await?;
            if !rows.is_empty() {
                return Ok(rows);
            }
        }
        Ok(Vec::new())
    }
}

/// Build the working view, normalizing row fields once at ingestion.
fn build_item_info(
    item_key: String,
    original_dish: String,
    dish: String,
    variant: Option<String>,
    size: Option<String>,
    quantity: u32,
    rows: Vec<CatalogRow>,
) -> ItemInfo {
    let rows: Vec<CatalogRow> = rows
        .into_iter()
        .map(|row| CatalogRow {
            variant: normalize_opt(row.variant.as_deref()),
            size: normalize_opt(row.size.as_deref()),
            ..row
        })
        .collect();

    let mut dish_options = Vec::new();
    let mut available_variants = Vec::new();
    let mut available_sizes = Vec::new();
    for row in &rows {
        if let Some(name) = normalize(&row.dish_name) {
            push_distinct(&mut dish_options, name);
        }
        if let Some(variant) = &row.variant {
            push_distinct(&mut available_variants, variant.clone());
        }
        if let Some(size) = &row.size {
            push_distinct(&mut available_sizes, size.clone());
        }
    }

    ItemInfo {
        item_key,
        original_dish,
        dish,
        variant,
        size,
        quantity,
        rows,
        dish_options,
        available_variants,
        available_sizes,
    }
}

/// Set semantics with catalog order preserved.
fn push_distinct(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

fn effective_dish(item: &ItemInfo, choices: Option<&ItemChoices>) -> String {
    choices
        .and_then(|c| c.dish.clone())
        .unwrap_or_else(|| item.dish.clone())
}

fn effective_variant(item: &ItemInfo, choices: Option<&ItemChoices>) -> Option<String> {
    choices
        .and_then(|c| c.variant.clone())
        .or_else(|| item.variant.clone())
}

fn effective_size(item: &ItemInfo, choices: Option<&ItemChoices>) -> Option<String> {
    choices
        .and_then(|c| c.size.clone())
        .or_else(|| item.size.clone())
}

/// Determine the item's next unmet requirement: dish, then variant,
/// then size.
fn check_item(item: &ItemInfo, choices: Option<&ItemChoices>) -> Requirement {
    let dish_chosen = choices.map_or(false, |c| c.dish.is_some());
    if item.dish_options.len() > 1 && !dish_chosen {
        return Requirement::Dish;
    }

    let variant = effective_variant(item, choices);
    if !item.available_variants.is_empty() {
        match &variant {
            Some(v) if item.available_variants.contains(v) => {}
            Some(v) => {
                return Requirement::Variant {
                    invalid: Some(v.clone()),
                }
            }
            None => return Requirement::Variant { invalid: None },
        }
    }

    let size = effective_size(item, choices);
    if !item.available_sizes.is_empty() {
        match &size {
            Some(s) if item.available_sizes.contains(s) => {}
            Some(s) => {
                return Requirement::Size {
                    invalid: Some(s.clone()),
                }
            }
            None => return Requirement::Size { invalid: None },
        }
    }

    Requirement::Satisfied
}

/// Build the selection state for an unmet requirement.
fn pending_state(
    item: &ItemInfo,
    requirement: &Requirement,
    selections: &UserSelections,
    remaining: usize,
) -> Option<SelectionState> {
    let choices = selections.get(&item.item_key);
    match requirement {
        Requirement::Satisfied => None,
        Requirement::Dish => Some(SelectionState {
            kind: SelectionKind::DishOption,
            item_key: item.item_key.clone(),
            dish_label: item.original_dish.clone(),
            options: item.dish_options.clone(),
            current_choice: None,
            validation_error: None,
            remaining_items: remaining,
        }),
        Requirement::Variant { invalid } => {
            let dish = effective_dish(item, choices);
            Some(SelectionState {
                kind: SelectionKind::Variant,
                item_key: item.item_key.clone(),
                validation_error: invalid
                    .as_ref()
                    .map(|v| format!("The variant '{v}' is not available for {dish}")),
                dish_label: dish,
                options: item.available_variants.clone(),
                current_choice: effective_variant(item, choices),
                remaining_items: remaining,
            })
        }
        Requirement::Size { invalid } => {
            let dish = effective_dish(item, choices);
            Some(SelectionState {
                kind: SelectionKind::Size,
                item_key: item.item_key.clone(),
                validation_error: invalid
                    .as_ref()
                    .map(|s| format!("The size '{s}' is not available for {dish}")),
                dish_label: dish,
                options: item.available_sizes.clone(),
                current_choice: effective_size(item, choices),
                remaining_items: remaining,
            })
        }
    }
}

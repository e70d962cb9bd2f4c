//! Order finalization
//!
//! Resolves each fully disambiguated line item to one concrete catalog
//! row and emits priced order lines. The first row in catalog return
//! order that satisfies `row_matches` wins; there is deliberately no
//! price or availability tie-break beyond that.

use crate::order::normalize::row_matches;
use crate::order::{CatalogRow, OrderLine, UnavailableDish};

/// A line item that cleared every ambiguity check.
#[derive(Debug, Clone)]
pub struct ResolvedItem {
    pub dish: String,
    pub variant: Option<String>,
    pub size: Option<String>,
    pub quantity: u32,
    /// Catalog rows fetched for this item, in the service's return
    /// order. Row fields are already normalized.
    pub rows: Vec<CatalogRow>,
}

/// Pick a concrete row for every resolved item.
///
/// An item whose resolved combination matches no row (a stale or invalid
/// choice that slipped through) becomes an `UnavailableDish` instead of
/// an order line.
pub fn finalize_items(items: Vec<ResolvedItem>) -> (Vec<OrderLine>, Vec<UnavailableDish>) {
    let mut orders = Vec::new();
    let mut unavailable = Vec::new();

    for item in items {
        let selected = item
            .rows
            .iter()
            .find(|row| row_matches(row, item.variant.as_deref(), item.size.as_deref()));

        match selected {
            Some(row) => orders.push(OrderLine {
                food_id: row.food_id,
                dish: item.dish,
                variant: item.variant.unwrap_or_else(|| "N/A".to_string()),
                size: item.size.unwrap_or_else(|| "N/A".to_string()),
                price: row.price,
                quantity: item.quantity,
            }),
            None => unavailable.push(UnavailableDish {
                message: format!(
                    "The requested combination for '{}' is not available",
                    item.dish
                ),
                dish: item.dish,
            }),
        }
    }

    (orders, unavailable)
}

/// Total item count across finalized lines.
pub fn total_items(orders: &[OrderLine]) -> u32 {
    orders.iter().map(|line| line.quantity).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn row(food_id: i64, variant: Option<&str>, size: Option<&str>, price: i64) -> CatalogRow {
        CatalogRow {
            food_id,
            dish_name: "kotthu rotti".into(),
            variant: variant.map(String::from),
            size: size.map(String::from),
            price: Decimal::new(price, 2),
        }
    }

    #[test]
    fn test_first_matching_row_wins() {
        // Two rows match the same combination; catalog order decides.
        let item = ResolvedItem {
            dish: "kotthu rotti".into(),
            variant: Some("beef".into()),
            size: Some("small".into()),
            quantity: 2,
            rows: vec![
                row(7, Some("beef"), Some("small"), 900),
                row(8, Some("beef"), Some("small"), 850),
            ],
        };

        let (orders, unavailable) = finalize_items(vec![item]);
        assert!(unavailable.is_empty());
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].food_id, 7);
        assert_eq!(orders[0].price, Decimal::new(900, 2));
        assert_eq!(orders[0].quantity, 2);
    }

    #[test]
    fn test_absent_fields_render_as_na() {
        let item = ResolvedItem {
            dish: "dolphin".into(),
            variant: None,
            size: None,
            quantity: 1,
            rows: vec![row(3, None, None, 700)],
        };

        let (orders, _) = finalize_items(vec![item]);
        assert_eq!(orders[0].variant, "N/A");
        assert_eq!(orders[0].size, "N/A");
    }

    #[test]
    fn test_stale_combination_becomes_unavailable() {
        let item = ResolvedItem {
            dish: "kotthu rotti".into(),
            variant: Some("mutton".into()),
            size: Some("small".into()),
            quantity: 1,
            rows: vec![row(1, Some("beef"), Some("small"), 900)],
        };

        let (orders, unavailable) = finalize_items(vec![item]);
        assert!(orders.is_empty());
        assert_eq!(unavailable.len(), 1);
        assert_eq!(unavailable[0].dish, "kotthu rotti");
    }

    #[test]
    fn test_total_items_sums_quantities() {
        let orders = vec![
            OrderLine {
                food_id: 1,
                dish: "a".into(),
                variant: "N/A".into(),
                size: "N/A".into(),
                price: Decimal::ONE,
                quantity: 2,
            },
            OrderLine {
                food_id: 2,
                dish: "b".into(),
                variant: "N/A".into(),
                size: "N/A".into(),
                price: Decimal::ONE,
                quantity: 3,
            },
        ];
        assert_eq!(total_items(&orders), 5);
    }
}

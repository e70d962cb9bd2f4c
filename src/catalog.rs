//! Catalog service boundary
//!
//! `CatalogService` abstracts the menu database: exact and substring
//! dish lookups scoped to one restaurant, plus the cross-restaurant
//! price inquiry. `StaticCatalog` backs tests and demos; `PgCatalog`
//! (behind the `database` feature) mirrors the production Postgres
//! queries.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::order::CatalogRow;

/// A priced menu entry with its restaurant, for price inquiries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    pub restaurant: String,
    pub dish: String,
    pub variant: Option<String>,
    pub size: Option<String>,
    pub price: Decimal,
}

/// Read-only access to the menu catalog.
///
/// Row order is meaningful: callers take the first matching row, so
/// implementations must return rows in a stable order.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Look up purchasable rows for a dish within one restaurant.
    ///
    /// `exact` selects name equality; otherwise a substring match. Both
    /// modes are case-insensitive: callers pass normalized (lowercased)
    /// names and catalog rows may carry mixed case. An empty result
    /// means "not found" and is not an error.
    async fn lookup(
        &self,
        restaurant: &str,
        dish: &str,
        exact: bool,
    ) -> CatalogResult<Vec<CatalogRow>>;

    /// Price rows for a dish, optionally scoped to one restaurant.
    async fn price_inquiry(
        &self,
        restaurant: Option<&str>,
        dish: &str,
    ) -> CatalogResult<Vec<PriceQuote>>;
}

/// In-memory catalog for tests and demos.
///
/// Rows keep insertion order, standing in for the database's return
/// order.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    entries: Vec<(String, CatalogRow)>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row under a restaurant name (stored lowercased).
    pub fn with_row(mut self, restaurant: &str, row: CatalogRow) -> Self {
        self.entries.push((restaurant.to_lowercase(), row));
        self
    }

    pub fn push(&mut self, restaurant: &str, row: CatalogRow) {
        self.entries.push((restaurant.to_lowercase(), row));
    }
}

#[async_trait]
impl CatalogService for StaticCatalog {
    async fn lookup(
        &self,
        restaurant: &str,
        dish: &str,
        exact: bool,
    ) -> CatalogResult<Vec<CatalogRow>> {
        let restaurant = restaurant.to_lowercase();
        let dish = dish.to_lowercase();
        let rows = self
            .entries
            .iter()
            .filter(|(r, _)| *r == restaurant)
            .map(|(_, row)| row)
            .filter(|row| {
                let name = row.dish_name.to_lowercase();
                if exact {
                    name == dish
                } else {
                    name.contains(&dish)
                }
            })
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn price_inquiry(
        &self,
        restaurant: Option<&str>,
        dish: &str,
    ) -> CatalogResult<Vec<PriceQuote>> {
        let restaurant = restaurant.map(str::to_lowercase);
        let dish = dish.to_lowercase();
        let quotes = self
            .entries
            .iter()
            .filter(|(r, _)| restaurant.as_deref().map_or(true, |want| r == want))
            .filter(|(_, row)| row.dish_name.to_lowercase().contains(&dish))
            .map(|(r, row)| PriceQuote {
                restaurant: r.clone(),
                dish: row.dish_name.clone(),
                variant: row.variant.clone(),
                size: row.size.clone(),
                price: row.price,
            })
            .collect();
        Ok(quotes)
    }
}

/// Postgres-backed catalog.
#[cfg(feature = "database")]
pub struct PgCatalog {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgCatalog {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl CatalogService for PgCatalog {
    async fn lookup(
        &self,
        restaurant: &str,
        dish: &str,
        exact: bool,
    ) -> CatalogResult<Vec<CatalogRow>> {
        let base = r#"
            SELECT fi.id, fi.food_name, fi.variant, fi.size, fi.price
            FROM food_items fi
            JOIN restaurants r ON fi.restaurant_id = r.restaurant_id
            WHERE LOWER(r.name) = LOWER($1)
        "#;
        // Callers pass normalized (lowercased) names, so both match modes
        // must be case-insensitive against mixed-case catalog rows.
        let query = if exact {
            format!("{base} AND LOWER(fi.food_name) = LOWER($2) ORDER BY fi.id")
        } else {
            format!("{base} AND fi.food_name ILIKE $2 ORDER BY fi.id")
        };
        let pattern = if exact {
            dish.to_string()
        } else {
            format!("%{dish}%")
        };

        let rows: Vec<(i64, String, Option<String>, Option<String>, Decimal)> =
            sqlx::query_as(&query)
                .bind(restaurant)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| CatalogError::QueryFailed {
                    message: e.to_string(),
                })?;

        Ok(rows
            .into_iter()
            .map(|(food_id, dish_name, variant, size, price)| CatalogRow {
                food_id,
                dish_name,
                variant,
                size,
                price,
            })
            .collect())
    }

    async fn price_inquiry(
        &self,
        restaurant: Option<&str>,
        dish: &str,
    ) -> CatalogResult<Vec<PriceQuote>> {
        let query = r#"
            SELECT r.name, fi.food_name, fi.variant, fi.size, fi.price
            FROM food_items fi
            JOIN restaurants r ON fi.restaurant_id = r.restaurant_id
            WHERE fi.food_name ILIKE $1
              AND ($2::text IS NULL OR LOWER(r.name) = LOWER($2))
            ORDER BY r.name, fi.id
        "#;
        let rows: Vec<(String, String, Option<String>, Option<String>, Decimal)> =
            sqlx::query_as(query)
                .bind(format!("%{dish}%"))
                .bind(restaurant)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| CatalogError::QueryFailed {
                    message: e.to_string(),
                })?;

        Ok(rows
            .into_iter()
            .map(|(restaurant, dish, variant, size, price)| PriceQuote {
                restaurant,
                dish,
                variant,
                size,
                price,
            })
            .collect())
    }
}

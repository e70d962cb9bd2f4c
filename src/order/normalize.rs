//! Matching and normalization
//!
//! Case/whitespace normalization and the row-matching predicate shared by
//! disambiguation and finalization. Normalization is applied before every
//! equality comparison, never after.

use crate::order::CatalogRow;

/// Tokens the extractor emits for "no value".
const ABSENT_TOKENS: [&str; 4] = ["", "null", "n/a", "none"];

/// Lowercase and trim a value; empty and sentinel tokens become `None`.
pub fn normalize(value: &str) -> Option<String> {
    let cleaned = value.trim().to_lowercase();
    if ABSENT_TOKENS.contains(&cleaned.as_str()) {
        None
    } else {
        Some(cleaned)
    }
}

/// Normalize an optional value.
pub fn normalize_opt(value: Option<&str>) -> Option<String> {
    value.and_then(normalize)
}

/// Map synonym sizes onto the canonical {small, medium, large} set.
///
/// Portion-talk from the original menus: "normal" and "half" feed one,
/// "full" feeds two.
pub fn canonical_size(size: &str) -> String {
    match size {
        "normal" | "half" => "small".to_string(),
        "full" => "medium".to_string(),
        other => other.to_string(),
    }
}

/// Normalize a size value, collapsing synonyms to the canonical set.
pub fn normalize_size(value: Option<&str>) -> Option<String> {
    normalize_opt(value).map(|s| canonical_size(&s))
}

/// Whether a catalog row satisfies the wanted variant and size.
///
/// A row with an absent variant or size matches any wanted value for
/// that field. Price and availability are never a tie-break.
pub fn row_matches(
    row: &CatalogRow,
    wanted_variant: Option<&str>,
    wanted_size: Option<&str>,
) -> bool {
    let variant_ok = match &row.variant {
        None => true,
        Some(v) => wanted_variant == Some(v.as_str()),
    };
    let size_ok = match &row.size {
        None => true,
        Some(s) => wanted_size == Some(s.as_str()),
    };
    variant_ok && size_ok
}

//! Error handling for the order resolution pipeline
//!
//! Idiomatic thiserror enums per concern with a single `OrderError`
//! umbrella. Every variant carries a human-readable message; internal
//! detail stays in logs and is never surfaced to the caller.

use thiserror::Error;

/// Main error type for order processing
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Extractor output was missing or malformed.
///
/// Always surfaced immediately: no partial processing happens on a
/// request the extractor could not structure.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Invalid order data received")]
    MissingEntities,

    #[error("{message}")]
    Fallback { message: String },

    #[error("Extractor returned malformed JSON: {message}")]
    Malformed { message: String },

    #[error("Extractor unavailable: {message}")]
    Unavailable { message: String },
}

/// A single item's catalog query failed or came back empty.
///
/// Non-fatal by policy: the engine records the item as unavailable and
/// continues with its siblings.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Dish '{dish}' not found in {restaurant}")]
    DishNotFound { dish: String, restaurant: String },

    #[error("Catalog query failed: {message}")]
    QueryFailed { message: String },
}

/// The user's raw answer does not map to any available option.
///
/// Short-circuits only the current call; the stored selection state is
/// kept so the caller can resubmit.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid choice. Please select a number between 1 and {max}")]
    IndexOutOfRange { max: usize },

    #[error("Invalid choice. Available options: {options}")]
    UnknownOption { options: String },

    #[error("No options available for selection")]
    NoOptions,
}

/// A selection answer arrived with no selection in progress.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No selection process is currently active")]
    NotAwaiting,

    #[error("Selection context not found")]
    MissingContext,
}

/// Result type aliases for convenience
pub type OrderResult<T> = Result<T, OrderError>;
pub type CatalogResult<T> = Result<T, CatalogError>;

impl OrderError {
    /// Message safe to show to the end user.
    ///
    /// Validation and session errors are already user-facing; everything
    /// else collapses to a generic apology (detail belongs in logs).
    pub fn user_message(&self) -> String {
        match self {
            OrderError::Validation(e) => e.to_string(),
            OrderError::Session(e) => e.to_string(),
            OrderError::Extraction(ExtractionError::MissingEntities) => {
                "Invalid order data received".to_string()
            }
            OrderError::Extraction(ExtractionError::Fallback { message }) => message.clone(),
            _ => {
                "Sorry, there was an error processing your selection. Please try again.".to_string()
            }
        }
    }
}

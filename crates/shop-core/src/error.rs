//! Error Types for the Cart Engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CartError>;

#[derive(Error, Debug)]
pub enum CartError {
    /// Product code does not exist in the catalog
    #[error("Product not found: {0}")]
    UnknownProduct(String),

    /// Product exists but cannot be purchased yet
    #[error("Product unavailable: {0}")]
    ProductUnavailable(String),

    /// Storage read/write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Catalog configuration is invalid
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CartError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Get user-friendly message
    pub const fn user_message(&self) -> &str {
        match self {
            Self::UnknownProduct(_) => "This product could not be found.",
            Self::ProductUnavailable(_) => {
                "This product is coming soon! Sign up for notifications."
            }
            Self::Storage(_) => "Your cart could not be saved. Please try again.",
            _ => "An error occurred updating your cart.",
        }
    }
}

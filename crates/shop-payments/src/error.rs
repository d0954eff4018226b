//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Checkout and entitlement errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Nothing to check out
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout endpoint answered with a failure
    #[error("Checkout failed: {0}")]
    Checkout(String),

    /// Transport-level failure talking to the backend
    #[error("Network error: {0}")]
    Network(String),

    /// Bearer token could not be decoded
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Bearer token is past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// Subscription lookup failed
    #[error("Subscription lookup failed: {0}")]
    Subscriptions(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cart engine error
    #[error(transparent)]
    Cart(#[from] shop_core::CartError),
}

impl PaymentError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Checkout(_) | Self::Subscriptions(_))
    }

    /// Get user-facing message
    ///
    /// Checkout failures are shown verbatim so the customer sees what the
    /// payment backend said.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty. Please add products first.".into(),
            Self::Checkout(msg) | Self::Network(msg) => {
                format!("Checkout failed: {msg}\n\nPlease try again or contact support.")
            }
            Self::InvalidToken(_) | Self::TokenExpired => {
                "Your session has ended. Please log in again.".into()
            }
            Self::Subscriptions(_) => "We couldn't load your subscriptions. Please try again.".into(),
            Self::Config(_) => "Service configuration error.".into(),
            Self::Cart(e) => e.user_message().into(),
        }
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

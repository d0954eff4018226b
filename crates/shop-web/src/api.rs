//! API Client

use shop_core::Cart;
use shop_payments::{CheckoutConfig, CheckoutService, CheckoutSession, HttpCheckoutBackend};

use crate::storage::BrowserStorage;

/// Create a hosted checkout session for the cart
pub async fn start_checkout(cart: &Cart<BrowserStorage>) -> shop_payments::Result<CheckoutSession> {
    let config = CheckoutConfig::default();
    CheckoutService::new(HttpCheckoutBackend::new(&config), config)
        .start_checkout(cart)
        .await
}

/// Send the browser to `url`
pub fn redirect(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().set_href(url) {
            tracing::error!(error = ?e, "Redirect failed");
        }
    }
}

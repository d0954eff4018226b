//! # shop-payments
//!
//! Hosted checkout and subscription entitlements for the WindLoadCalc
//! storefront.
//!
//! ## Checkout flow
//!
//! ```text
//! ┌─────────────┐  cart   ┌──────────────────┐  session  ┌─────────────────┐
//! │  Cart page  │────────▶│ checkout-cart API │─────────▶│  Stripe Hosted  │
//! │ (shop-web)  │         │  (WindLoadCalc)   │          │  Checkout Page  │
//! └─────────────┘         └──────────────────┘           └────────┬────────┘
//!        ▲                                                        │
//!        └──────────── checkout-success / checkout-cancelled ◀────┘
//! ```
//!
//! The cart is never cleared here. A completed purchase is confirmed by the
//! backend's webhook, and the success page empties the cart.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_payments::CheckoutService;
//!
//! let service = CheckoutService::from_env();
//! let session = service.start_checkout(&cart).await?;
//!
//! // Redirect the customer to: session.checkout_url
//! ```
//!
//! Platform pages gate on the visitor's token:
//!
//! ```rust,ignore
//! use shop_payments::{EntitlementGate, GateDecision};
//!
//! let gate = EntitlementGate::from_env();
//! match gate.evaluate(token.as_deref(), chrono::Utc::now()).await {
//!     GateDecision::Granted(ent) => render_platform(ent),
//!     GateDecision::SubscriptionRequired(_) => render_shop_link(),
//!     GateDecision::LoginRequired => redirect(gate.login_redirect(&here)?),
//! }
//! ```

mod checkout;
mod entitlement;
mod error;

pub use checkout::{
    CheckoutBackend, CheckoutConfig, CheckoutRequest, CheckoutResponse, CheckoutService,
    CheckoutSession, HttpCheckoutBackend,
};
pub use entitlement::{
    login_redirect_url, token_from_url, Entitlements, EntitlementConfig, EntitlementGate,
    ExportAccess, Feature, GateDecision, HttpSubscriptionSource, PlatformTier, SubscriptionRecord,
    SubscriptionSource, SubscriptionSummary, TokenClaims,
};
pub use error::{PaymentError, Result};

//! Hosted Checkout Initiation
//!
//! Sends the cart to the checkout backend, which creates a hosted Stripe
//! Checkout session and answers with the URL to redirect the customer to.
//! One request per attempt: no retry, no timeout beyond the transport's.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shop_core::{BillingCycle, Breakdown, Cart, CartStorage, Selection};

use crate::error::{PaymentError, Result};

const DEFAULT_API_URL: &str = "https://api.windloadcalc.com";
const DEFAULT_CHECKOUT_PATH: &str = "/api/subscriptions/checkout-cart";
const DEFAULT_SUCCESS_URL: &str = "https://windloadcalc.com/checkout-success.html";
const DEFAULT_CANCEL_URL: &str = "https://windloadcalc.com/checkout-cancelled.html";

/// Where checkout requests go and where Stripe sends the customer back to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub api_url: String,
    pub checkout_path: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            checkout_path: DEFAULT_CHECKOUT_PATH.into(),
            success_url: DEFAULT_SUCCESS_URL.into(),
            cancel_url: DEFAULT_CANCEL_URL.into(),
        }
    }
}

impl CheckoutConfig {
    /// Create from environment variables, falling back to production defaults
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.into());

        Self {
            api_url: var("WINDLOAD_API_URL", DEFAULT_API_URL),
            checkout_path: var("WINDLOAD_CHECKOUT_PATH", DEFAULT_CHECKOUT_PATH),
            success_url: var("WINDLOAD_SUCCESS_URL", DEFAULT_SUCCESS_URL),
            cancel_url: var("WINDLOAD_CANCEL_URL", DEFAULT_CANCEL_URL),
        }
    }

    /// Full checkout endpoint URL
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.checkout_path.trim_start_matches('/')
        )
    }
}

/// Body posted to the checkout endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// First cart item, for the single-item checkout API
    pub product_code: String,
    pub billing_cycle: BillingCycle,

    /// Whether the cart qualifies for the platform + calculator bundle
    pub bundle_discount: bool,

    /// Every cart item, in persisted form
    pub cart_items: Vec<Selection>,

    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// Build the payload for the current cart contents
    pub fn build(breakdown: &Breakdown, selections: &[Selection], config: &CheckoutConfig) -> Result<Self> {
        let primary = selections.first().ok_or(PaymentError::EmptyCart)?;

        Ok(Self {
            product_code: primary.product_code.clone(),
            billing_cycle: primary.billing_cycle,
            bundle_discount: breakdown.has_bundle_discount,
            cart_items: selections.to_vec(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        })
    }
}

/// Raw answer from the checkout endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub checkout_url: Option<String>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub item_count: Option<u32>,

    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

impl CheckoutResponse {
    /// Success iff the backend says so and handed back a redirect URL
    pub fn into_session(self) -> Result<CheckoutSession> {
        match self.checkout_url {
            Some(checkout_url) if self.success && !checkout_url.is_empty() => Ok(CheckoutSession {
                checkout_url,
                item_count: self.item_count,
                total_amount: self.total_amount,
            }),
            _ => Err(PaymentError::Checkout(
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| "Failed to create checkout".into()),
            )),
        }
    }
}

/// A created hosted-checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// URL to redirect the customer to
    pub checkout_url: String,

    /// Items the backend put on the session, if reported
    pub item_count: Option<u32>,

    /// Amount the backend will charge, if reported
    pub total_amount: Option<Decimal>,
}

/// Backend able to create a checkout session
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait CheckoutBackend: Send + Sync {
    /// Perform exactly one create-session round trip
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutResponse>;
}

/// Checkout backend reached over HTTP
pub struct HttpCheckoutBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCheckoutBackend {
    pub fn new(config: &CheckoutConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint(),
        }
    }

    /// Reuse an existing HTTP client
    pub fn with_client(client: reqwest::Client, config: &CheckoutConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint(),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CheckoutBackend for HttpCheckoutBackend {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutResponse> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Failures carry their reason in the JSON body, whatever the status.
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(%status, error = %e, "Unreadable checkout response");
            PaymentError::Checkout(format!("Unexpected response from checkout service (HTTP {status})"))
        })
    }
}

/// Starts hosted checkouts for carts
pub struct CheckoutService<B: CheckoutBackend> {
    backend: B,
    config: CheckoutConfig,
}

impl CheckoutService<HttpCheckoutBackend> {
    /// HTTP checkout configured from the environment
    pub fn from_env() -> Self {
        let config = CheckoutConfig::from_env();
        Self::new(HttpCheckoutBackend::new(&config), config)
    }
}

impl<B: CheckoutBackend> CheckoutService<B> {
    pub const fn new(backend: B, config: CheckoutConfig) -> Self {
        Self { backend, config }
    }

    pub const fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Create a checkout session for everything in `cart`
    ///
    /// The cart is only read. On failure it is left as it was so the
    /// customer can try again; callers must not start a second checkout
    /// while one is in flight.
    pub async fn start_checkout<S: CartStorage>(&self, cart: &Cart<S>) -> Result<CheckoutSession> {
        let breakdown = cart.compute_totals();
        let request = CheckoutRequest::build(&breakdown, cart.selections(), &self.config)?;

        tracing::info!(
            items = request.cart_items.len(),
            bundle = request.bundle_discount,
            expected_total = %breakdown.charge_total,
            period = %breakdown.charge_period,
            "Creating checkout session"
        );

        let session = self
            .backend
            .create_session(&request)
            .await
            .and_then(CheckoutResponse::into_session)
            .inspect_err(|e| tracing::error!(error = %e, "Checkout error"))?;

        tracing::info!(
            item_count = ?session.item_count,
            total_amount = ?session.total_amount,
            "Checkout session created"
        );

        Ok(session)
    }
}

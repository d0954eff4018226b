use std::sync::Arc;

use anyhow::Result;
use httpmock::prelude::*;
use rust_decimal_macros::dec;
use shop_core::{BillingCycle, Cart, Catalog, MemoryStorage};
use shop_payments::{
    CheckoutConfig, CheckoutService, EntitlementConfig, EntitlementGate, GateDecision,
    HttpCheckoutBackend, HttpSubscriptionSource, PaymentError, PlatformTier,
};

fn config_for(server: &MockServer) -> CheckoutConfig {
    CheckoutConfig {
        api_url: server.base_url(),
        ..CheckoutConfig::default()
    }
}

fn service_for(server: &MockServer) -> CheckoutService<HttpCheckoutBackend> {
    let config = config_for(server);
    CheckoutService::new(HttpCheckoutBackend::new(&config), config)
}

fn bundle_cart() -> Result<Cart<MemoryStorage>> {
    let mut cart = Cart::load(MemoryStorage::new(), Arc::new(Catalog::reference()));
    cart.add("bip_pro", BillingCycle::Annual)?;
    cart.add("cc_walls_starter", BillingCycle::Annual)?;
    Ok(cart)
}

#[tokio::test]
async fn test_checkout_posts_cart_and_returns_redirect() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/subscriptions/checkout-cart")
                .header("content-type", "application/json")
                .json_body_partial(
                    r#"{
                        "product_code": "bip_pro",
                        "billing_cycle": "annual",
                        "bundle_discount": true,
                        "success_url": "https://windloadcalc.com/checkout-success.html",
                        "cancel_url": "https://windloadcalc.com/checkout-cancelled.html"
                    }"#,
                );
            then.status(200).json_body(serde_json::json!({
                "success": true,
                "checkout_url": "https://checkout.stripe.com/c/pay/cs_test_a1",
                "item_count": 2,
                "total_amount": 969.0
            }));
        })
        .await;

    let cart = bundle_cart()?;
    let session = service_for(&server).start_checkout(&cart).await?;

    mock.assert_async().await;
    assert_eq!(session.checkout_url, "https://checkout.stripe.com/c/pay/cs_test_a1");
    assert_eq!(session.item_count, Some(2));
    assert_eq!(session.total_amount, Some(dec!(969)));
    Ok(())
}

#[tokio::test]
async fn test_error_body_on_server_error_is_surfaced() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/subscriptions/checkout-cart");
            then.status(500)
                .json_body(serde_json::json!({ "success": false, "error": "Price not configured" }));
        })
        .await;

    let cart = bundle_cart()?;
    let before = cart.selections().to_vec();

    let err = service_for(&server).start_checkout(&cart).await.unwrap_err();

    mock.assert_hits_async(1).await;
    match &err {
        PaymentError::Checkout(msg) => assert_eq!(msg, "Price not configured"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(err.is_retryable());
    assert_eq!(cart.selections(), before.as_slice());
    Ok(())
}

#[tokio::test]
async fn test_unreadable_body_names_status() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/subscriptions/checkout-cart");
            then.status(502).body("<html>Bad Gateway</html>");
        })
        .await;

    let err = service_for(&server).start_checkout(&bundle_cart()?).await.unwrap_err();
    assert!(err.to_string().contains("502"), "{err}");
    Ok(())
}

#[tokio::test]
async fn test_empty_cart_never_calls_backend() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let cart = Cart::load(MemoryStorage::new(), Arc::new(Catalog::reference()));
    let err = service_for(&server).start_checkout(&cart).await.unwrap_err();

    assert!(matches!(err, PaymentError::EmptyCart));
    mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_subscription_lookup_sends_bearer_token() -> Result<()> {
    use base64::Engine;

    let server = MockServer::start_async().await;
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .encode(r#"{"user_id":314,"email":"pe@example.com"}"#);
    let token = format!("hdr.{payload}.sig");

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/user-subscriptions")
                .header("authorization", format!("Bearer {token}"))
                .json_body(serde_json::json!({ "user_id": "314" }));
            then.status(200).json_body(serde_json::json!({
                "success": true,
                "has_bip": true,
                "has_calculator": false,
                "subscriptions": [
                    { "product_code": "bip_starter", "status": "active" },
                    { "product_code": "bip_premium", "status": "active" }
                ]
            }));
        })
        .await;

    let config = EntitlementConfig {
        api_url: server.base_url(),
        ..EntitlementConfig::default()
    };
    let gate = EntitlementGate::new(HttpSubscriptionSource::new(&config), config);

    let decision = gate.evaluate(Some(&token), chrono::Utc::now()).await;
    mock.assert_async().await;

    match decision {
        GateDecision::Granted(ent) => {
            assert_eq!(ent.tier, Some(PlatformTier::Premium));
            assert_eq!(ent.claims.email, "pe@example.com");
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_failed_subscription_lookup_requires_subscription() -> Result<()> {
    use base64::Engine;

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/user-subscriptions");
            then.status(401)
                .json_body(serde_json::json!({ "success": false, "error": "Unauthorized" }));
        })
        .await;

    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"user_id":"u1"}"#);
    let config = EntitlementConfig {
        api_url: server.base_url(),
        ..EntitlementConfig::default()
    };
    let gate = EntitlementGate::new(HttpSubscriptionSource::new(&config), config);

    let decision = gate
        .evaluate(Some(&format!("h.{payload}.s")), chrono::Utc::now())
        .await;
    assert!(matches!(decision, GateDecision::SubscriptionRequired(ref e) if e.tier.is_none()));
    Ok(())
}

//! Product Pages

use chrono::Utc;
use leptos::prelude::*;
use shop_core::upsell::offer_days_remaining;
use shop_core::{AddOutcome, BillingCycle, PricingConfig, ShopPage, UpsellBanner};

use crate::components::{ProductCard, UpsellBannerView};
use crate::state::ShopState;
use crate::storage::BrowserStorage;

#[component]
pub fn StorePage(page: ShopPage) -> impl IntoView {
    let state = ShopState::get();
    let catalog = state.catalog();
    let (notice, set_notice) = signal(None::<String>);

    let add = Callback::new(move |(code, cycle): (String, BillingCycle)| {
        let mut cart = state.cart();
        let name = cart
            .catalog()
            .get(&code)
            .map_or_else(|| code.clone(), |p| p.short_name.clone());

        let message = match cart.add(&code, cycle) {
            Ok(AddOutcome::Added) => format!("{name} added to cart"),
            Ok(AddOutcome::BillingCycleChanged { .. }) => format!("{name} switched to {cycle} billing"),
            Ok(AddOutcome::AlreadyInCart) => format!("{name} is already in your cart"),
            Err(e) => e.user_message().to_string(),
        };
        set_notice.set(Some(message));
    });

    let add_offer = Callback::new(move |code: String| add.run((code, BillingCycle::Monthly)));

    let days = offer_days_remaining(&BrowserStorage, Utc::now()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Offer window unavailable");
        0
    });
    let banner = UpsellBanner::for_page(page, &catalog, &PricingConfig::default(), days);

    let (title, category) = match page {
        ShopPage::Calculator => ("Wind Load Calculators", shop_core::ProductCategory::Calculator),
        ShopPage::Platform => ("Building Intelligence Platform", shop_core::ProductCategory::Platform),
    };

    let products = catalog
        .by_category(category)
        .into_iter()
        .map(|product| view! { <ProductCard product=product.clone() on_add=add /> })
        .collect_view();

    view! {
        <div class="shop">
            <h1>{title}</h1>
            <p class="subtitle">"Save 2 months with annual billing"</p>

            {move || notice.get().map(|msg| view! {
                <div class="notice">
                    <span>{msg}</span>
                    <a href="/cart">"View cart"</a>
                </div>
            })}

            <div class="products">{products}</div>

            <UpsellBannerView banner=banner on_add=add_offer />
        </div>
    }
}

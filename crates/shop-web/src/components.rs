//! UI Components

use leptos::prelude::*;
use rust_decimal::Decimal;
use shop_core::{format_usd, BillingCycle, Breakdown, LineItem, Product, UpsellBanner};

use crate::state::ShopState;

/// Header cart link with item count
#[component]
pub fn CartBadge() -> impl IntoView {
    let state = ShopState::get();

    view! {
        <a href="/cart" class="cart-badge">
            "Cart"
            <span class="count" class:empty=move || state.count.get() == 0>
                {move || state.count.get()}
            </span>
        </a>
    }
}

/// Product card with monthly and annual add buttons
#[component]
pub fn ProductCard(product: Product, on_add: Callback<(String, BillingCycle)>) -> impl IntoView {
    let code = product.code.clone();
    let annual_code = product.code.clone();
    let available = product.available;
    let monthly_equivalent = format_usd(product.annual_price / Decimal::from(12));

    view! {
        <div class="product" class:unavailable=!available>
            <h3>{product.name.clone()}</h3>
            <div class="price">{format_usd(product.monthly_price)}<span>"/month"</span></div>
            <div class="price-annual">
                {format_usd(product.annual_price)}<span>"/year"</span>
                <small>" (" {monthly_equivalent} "/mo)"</small>
            </div>
            <ul>
                {product.features.iter().map(|f| view! { <li>{f.clone()}</li> }).collect_view()}
            </ul>
            {if available {
                view! {
                    <div class="actions">
                        <button class="btn" on:click=move |_| on_add.run((code.clone(), BillingCycle::Monthly))>
                            "Add Monthly"
                        </button>
                        <button class="btn btn-primary" on:click=move |_| on_add.run((annual_code.clone(), BillingCycle::Annual))>
                            "Add Annual"
                        </button>
                    </div>
                }
                .into_any()
            } else {
                view! { <span class="badge">"Coming Soon"</span> }.into_any()
            }}
        </div>
    }
}

/// One cart line with its remove button
#[component]
pub fn LineItemRow(item: LineItem, on_remove: Callback<String>) -> impl IntoView {
    let code = item.product_code.clone();
    let cycle_note = if item.billing_cycle.is_annual() {
        format!("{}/year, billed annually", format_usd(item.annual_total))
    } else {
        "Billed monthly".to_string()
    };

    view! {
        <div class="line-item">
            <div class="details">
                <h4>{item.name.clone()}</h4>
                <span class="cycle">{cycle_note}</span>
            </div>
            <div class="price">{format_usd(item.normalized_monthly_price)}<span>"/mo"</span></div>
            <button class="btn btn-link" on:click=move |_| on_remove.run(code.clone())>"Remove"</button>
        </div>
    }
}

/// Subtotal, bundle discount, total and charge line
#[component]
pub fn PriceSummary(breakdown: Breakdown) -> impl IntoView {
    let discount = breakdown.has_bundle_discount.then(|| {
        view! {
            <div class="row discount">
                <span>"Bundle discount (" {breakdown.bundle_discount_percent.normalize().to_string()} "%)"</span>
                <span>"-" {format_usd(breakdown.bundle_discount)}"/mo"</span>
            </div>
        }
    });

    view! {
        <div class="summary">
            <div class="row">
                <span>"Subtotal"</span>
                <span>{format_usd(breakdown.subtotal)}"/mo"</span>
            </div>
            {discount}
            <div class="row total">
                <span>"Total"</span>
                <span>{format_usd(breakdown.total)}"/mo"</span>
            </div>
            <div class="row charge">
                <span>"Due today"</span>
                <span>{breakdown.charge_label()}</span>
            </div>
        </div>
    }
}

/// Limited-time bundle offer for the complementary product line
#[component]
pub fn UpsellBannerView(banner: UpsellBanner, on_add: Callback<String>) -> impl IntoView {
    let expired = banner.is_expired();
    let days = banner.days_remaining;
    let headline = banner.headline;

    let offers = banner
        .offers
        .into_iter()
        .map(|offer| {
            let code = offer.product_code;
            let add = offer.available.then(move || {
                view! {
                    <button class="btn btn-small" on:click=move |_| on_add.run(code.clone())>"Add"</button>
                }
            });
            view! {
                <li class="offer" class:unavailable=!offer.available>
                    <span class="name">{offer.name}</span>
                    <s>{format_usd(offer.base_monthly_price)}</s>
                    <strong>{format_usd(offer.bundle_monthly_price)}"/mo"</strong>
                    <span class="savings">"Save " {format_usd(offer.monthly_savings)}"/mo"</span>
                    {add}
                </li>
            }
        })
        .collect_view();

    (!expired).then(move || {
        view! {
            <aside class="upsell">
                <h3>{headline}</h3>
                <p class="countdown">{format!("Offer ends in {days} day{}", if days == 1 { "" } else { "s" })}</p>
                <ul>{offers}</ul>
            </aside>
        }
    })
}

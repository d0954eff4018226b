//! Cart Page

use leptos::prelude::*;

use crate::api;
use crate::components::{LineItemRow, PriceSummary};
use crate::state::ShopState;

#[component]
pub fn CartPage() -> impl IntoView {
    let state = ShopState::get();
    let (breakdown, set_breakdown) = signal(state.cart().compute_totals());
    let (error, set_error) = signal(None::<String>);
    let (checking_out, set_checking_out) = signal(false);

    let refresh = move || set_breakdown.set(state.cart().compute_totals());

    let remove = Callback::new(move |code: String| {
        if let Err(e) = state.cart().remove(&code) {
            set_error.set(Some(e.user_message().to_string()));
        }
        refresh();
    });

    let clear = move |_| {
        if let Err(e) = state.cart().clear() {
            set_error.set(Some(e.user_message().to_string()));
        }
        refresh();
    };

    let checkout = move |_| {
        if checking_out.get_untracked() {
            return;
        }
        set_checking_out.set(true);
        set_error.set(None);

        leptos::task::spawn_local(async move {
            let cart = state.cart();
            match api::start_checkout(&cart).await {
                Ok(session) => api::redirect(&session.checkout_url),
                Err(e) => {
                    // Cart stays as it was so the customer can retry.
                    set_error.set(Some(e.user_message()));
                    set_checking_out.set(false);
                }
            }
        });
    };

    view! {
        <div class="cart">
            <h1>"Your Cart"</h1>

            <Show
                when=move || { breakdown.get().item_count > 0 }
                fallback=|| view! {
                    <div class="empty">
                        <p>"Your cart is empty."</p>
                        <a href="/calculators" class="btn">"Browse products"</a>
                    </div>
                }
            >
                <div class="line-items">
                    {move || {
                        breakdown
                            .get()
                            .items
                            .into_iter()
                            .map(|item| view! { <LineItemRow item=item on_remove=remove /> })
                            .collect_view()
                    }}
                </div>

                {move || view! { <PriceSummary breakdown=breakdown.get() /> }}

                {move || error.get().map(|msg| view! { <p class="error">{msg}</p> })}

                <div class="actions">
                    <button class="btn btn-link" on:click=clear>"Clear cart"</button>
                    <button
                        class="btn btn-primary"
                        disabled=move || checking_out.get()
                        on:click=checkout
                    >
                        {move || if checking_out.get() { "Processing..." } else { "Proceed to Checkout" }}
                    </button>
                </div>
            </Show>
        </div>
    }
}

//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};
use shop_core::ShopPage;

use crate::components::CartBadge;
use crate::pages::{CartPage, StorePage};
use crate::state::ShopState;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    ShopState::provide();

    view! {
        <Router>
            <header class="site-header">
                <a href="/" class="brand">"WindLoadCalc"</a>
                <nav>
                    <a href="/calculators">"Calculators"</a>
                    <a href="/platform">"Building Intelligence"</a>
                    <CartBadge />
                </nav>
            </header>
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=|| view! { <StorePage page=ShopPage::Calculator /> } />
                    <Route path=path!("/calculators") view=|| view! { <StorePage page=ShopPage::Calculator /> } />
                    <Route path=path!("/platform") view=|| view! { <StorePage page=ShopPage::Platform /> } />
                    <Route path=path!("/cart") view=CartPage />
                </Routes>
            </main>
        </Router>
    }
}

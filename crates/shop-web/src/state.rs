//! Shared Shop State

use std::sync::Arc;

use leptos::prelude::*;
use shop_core::{Cart, Catalog};

use crate::storage::BrowserStorage;

/// Catalog and live cart count shared by every page
#[derive(Clone, Copy)]
pub struct ShopState {
    catalog: StoredValue<Arc<Catalog>>,
    pub count: RwSignal<usize>,
}

impl ShopState {
    /// Create the state and put it in context
    pub fn provide() -> Self {
        let catalog = Arc::new(Catalog::reference());
        let count = RwSignal::new(Cart::load(BrowserStorage, Arc::clone(&catalog)).item_count());

        let state = Self {
            catalog: StoredValue::new(catalog),
            count,
        };
        provide_context(state);
        state
    }

    pub fn get() -> Self {
        use_context::<Self>().unwrap_or_else(Self::provide)
    }

    pub fn catalog(self) -> Arc<Catalog> {
        self.catalog.get_value()
    }

    /// Fresh view of the persisted cart, wired to the header badge
    pub fn cart(self) -> Cart<BrowserStorage> {
        let count = self.count;
        let mut cart = Cart::load(BrowserStorage, self.catalog());
        cart.on_count_changed(move |n| count.set(n));
        cart
    }
}

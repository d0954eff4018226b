//! Cart Engine
//!
//! Owns the selection list, writes it through to storage on every mutation
//! and prices it against the catalog on demand.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{CartError, Result};
use crate::model::{BillingCycle, Selection};
use crate::pricing::{compute_breakdown, Breakdown, PricingConfig};
use crate::storage::{CartStorage, CART_STORAGE_KEY};

/// Callback receiving the new item count after each persisted change
pub type CountListener = Box<dyn Fn(usize)>;

/// What `Cart::add` did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// New selection appended
    Added,
    /// Product was already in the cart with another cycle; cycle replaced
    BillingCycleChanged { previous: BillingCycle },
    /// Product was already in the cart with this cycle; nothing written
    AlreadyInCart,
}

/// A shopping cart bound to a storage slot
pub struct Cart<S: CartStorage> {
    items: Vec<Selection>,
    storage: S,
    catalog: Arc<Catalog>,
    pricing: PricingConfig,
    listener: Option<CountListener>,
}

impl<S: CartStorage> Cart<S> {
    /// Restore the cart persisted in `storage`
    ///
    /// An absent, unreadable or unparsable value yields an empty cart.
    pub fn load(storage: S, catalog: Arc<Catalog>) -> Self {
        let items = match storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Selection>>(&raw) {
                Ok(items) => dedupe(items),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unparsable cart state");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Cart storage unreadable, starting empty");
                Vec::new()
            }
        };

        tracing::debug!(items = items.len(), "Loaded cart");

        Self {
            items,
            storage,
            catalog,
            pricing: PricingConfig::default(),
            listener: None,
        }
    }

    /// Use non-default pricing
    pub fn with_pricing(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }

    /// Register the "count changed" callback (e.g. a header badge)
    pub fn on_count_changed(&mut self, listener: impl Fn(usize) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Put a product in the cart
    ///
    /// Unknown or unavailable products are rejected without touching the
    /// cart. A product already in the cart keeps its slot and takes the new
    /// billing cycle.
    pub fn add(&mut self, product_code: &str, billing_cycle: BillingCycle) -> Result<AddOutcome> {
        let Some(product) = self.catalog.get(product_code) else {
            tracing::warn!(product_code, "Product not found");
            return Err(CartError::UnknownProduct(product_code.to_string()));
        };
        if !product.available {
            tracing::info!(product_code, "Product not yet available");
            return Err(CartError::ProductUnavailable(product_code.to_string()));
        }

        let mut items = self.items.clone();
        let outcome = match items.iter_mut().find(|s| s.product_code == product_code) {
            Some(existing) if existing.billing_cycle == billing_cycle => {
                tracing::debug!(product_code, cycle = %billing_cycle, "Already in cart");
                return Ok(AddOutcome::AlreadyInCart);
            }
            Some(existing) => {
                let previous = existing.billing_cycle;
                existing.billing_cycle = billing_cycle;
                AddOutcome::BillingCycleChanged { previous }
            }
            None => {
                items.push(Selection::new(product_code, billing_cycle));
                AddOutcome::Added
            }
        };

        self.commit(items)?;

        tracing::info!(
            product_code,
            cycle = %billing_cycle,
            outcome = ?outcome,
            items = self.items.len(),
            "Cart updated"
        );

        Ok(outcome)
    }

    /// Drop a product from the cart; absent codes are ignored
    pub fn remove(&mut self, product_code: &str) -> Result<()> {
        let items: Vec<Selection> = self
            .items
            .iter()
            .filter(|s| s.product_code != product_code)
            .cloned()
            .collect();

        if items.len() == self.items.len() {
            tracing::debug!(product_code, "Remove of product not in cart");
            return Ok(());
        }

        self.commit(items)?;
        tracing::info!(product_code, items = self.items.len(), "Removed from cart");
        Ok(())
    }

    /// Empty the cart
    pub fn clear(&mut self) -> Result<()> {
        tracing::info!(items = self.items.len(), "Clearing cart");
        self.commit(Vec::new())
    }

    /// Number of selections held, priced or not
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selections(&self) -> &[Selection] {
        &self.items
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Price the current selections
    pub fn compute_totals(&self) -> Breakdown {
        compute_breakdown(&self.items, &self.catalog, &self.pricing)
    }

    /// Persist `items`, then adopt them; on failure the cart keeps its old state
    fn commit(&mut self, items: Vec<Selection>) -> Result<()> {
        let raw = serde_json::to_string(&items)?;
        self.storage.set(CART_STORAGE_KEY, &raw)?;
        self.items = items;

        if let Some(listener) = &self.listener {
            listener(self.items.len());
        }
        Ok(())
    }
}

/// Collapse repeated codes left by older storefront versions: the first
/// position is kept and the last billing cycle wins.
fn dedupe(items: Vec<Selection>) -> Vec<Selection> {
    let mut unique: Vec<Selection> = Vec::with_capacity(items.len());
    for item in items {
        match unique.iter_mut().find(|s| s.product_code == item.product_code) {
            Some(existing) => existing.billing_cycle = item.billing_cycle,
            None => unique.push(item),
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::cell::Cell;
    use std::rc::Rc;

    fn cart() -> Cart<Arc<MemoryStorage>> {
        Cart::load(Arc::new(MemoryStorage::new()), Arc::new(Catalog::reference()))
    }

    #[test]
    fn test_add_twice_overwrites_cycle() {
        let mut cart = cart();
        assert_eq!(cart.add("bip_pro", BillingCycle::Monthly).unwrap(), AddOutcome::Added);
        assert_eq!(
            cart.add("bip_pro", BillingCycle::Annual).unwrap(),
            AddOutcome::BillingCycleChanged {
                previous: BillingCycle::Monthly
            }
        );

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.selections()[0].billing_cycle, BillingCycle::Annual);
    }

    #[test]
    fn test_add_same_cycle_is_noop() {
        let mut cart = cart();
        cart.add("cc_walls_pro", BillingCycle::Annual).unwrap();
        let added_at = cart.selections()[0].added_at;

        assert_eq!(
            cart.add("cc_walls_pro", BillingCycle::Annual).unwrap(),
            AddOutcome::AlreadyInCart
        );
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.selections()[0].added_at, added_at);
    }

    #[test]
    fn test_unavailable_product_rejected() {
        let mut cart = cart();
        let err = cart.add("cc_roofs_starter", BillingCycle::Annual).unwrap_err();
        assert!(matches!(err, CartError::ProductUnavailable(_)));
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.storage().get(CART_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_unknown_product_rejected() {
        let mut cart = cart();
        let err = cart.add("nope", BillingCycle::Monthly).unwrap_err();
        assert!(matches!(err, CartError::UnknownProduct(_)));
        assert_eq!(cart.storage().get(CART_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_listener_sees_every_persisted_change() {
        let seen = Rc::new(Cell::new(usize::MAX));
        let calls = Rc::new(Cell::new(0));

        let mut cart = cart();
        {
            let seen = Rc::clone(&seen);
            let calls = Rc::clone(&calls);
            cart.on_count_changed(move |count| {
                seen.set(count);
                calls.set(calls.get() + 1);
            });
        }

        cart.add("bip_starter", BillingCycle::Monthly).unwrap();
        assert_eq!(seen.get(), 1);
        cart.add("cc_walls_starter", BillingCycle::Monthly).unwrap();
        assert_eq!(seen.get(), 2);
        let _ = cart.add("cc_solar_starter", BillingCycle::Monthly);
        assert_eq!(calls.get(), 2);
        cart.clear().unwrap();
        assert_eq!(seen.get(), 0);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_remove_absent_code_writes_nothing() {
        let calls = Rc::new(Cell::new(0));
        let mut cart = cart();
        {
            let calls = Rc::clone(&calls);
            cart.on_count_changed(move |_| calls.set(calls.get() + 1));
        }

        cart.remove("ghost").unwrap();
        assert_eq!(cart.storage().get(CART_STORAGE_KEY).unwrap(), None);
        assert_eq!(calls.get(), 0);

        cart.add("bip_pro", BillingCycle::Annual).unwrap();
        cart.remove("ghost").unwrap();
        assert_eq!(calls.get(), 1);
        cart.remove("bip_pro").unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(cart.storage().get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_dedupe_keeps_first_position_last_cycle() {
        let items = vec![
            Selection::new("a", BillingCycle::Monthly),
            Selection::new("b", BillingCycle::Monthly),
            Selection::new("a", BillingCycle::Annual),
        ];
        let unique = dedupe(items);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].product_code, "a");
        assert_eq!(unique[0].billing_cycle, BillingCycle::Annual);
        assert_eq!(unique[1].product_code, "b");
    }

    struct FailingStorage;

    impl CartStorage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CartError::Storage("quota exceeded".into()))
        }
    }

    #[test]
    fn test_failed_write_leaves_cart_unchanged() {
        let mut cart = Cart::load(FailingStorage, Arc::new(Catalog::reference()));
        let err = cart.add("bip_pro", BillingCycle::Annual).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(cart.item_count(), 0);
    }
}

//! # shop-core
//!
//! Cart engine and pricing for the WindLoadCalc storefront.
//!
//! ## Bundle pricing
//!
//! Buying a Building Intelligence Platform plan together with a wind load
//! calculator takes 15% off the whole cart:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  BIP Pro            annual  $804.00/yr   →  $67.00/mo        │
//! │  Calculator Starter annual  $336.00/yr   →  $28.00/mo        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Subtotal                                   $95.00/mo        │
//! │  Bundle discount (15%)                     -$14.25/mo        │
//! │  Total                                      $80.75/mo        │
//! │  Charged today (all annual)               $969.00/yr         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mixed or monthly carts are charged the discounted monthly total.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shop_core::{BillingCycle, Cart, Catalog, FileStorage};
//!
//! let storage = FileStorage::open("./.cart")?;
//! let mut cart = Cart::load(storage, Arc::new(Catalog::reference()));
//!
//! cart.add("bip_pro", BillingCycle::Annual)?;
//! cart.add("cc_walls_starter", BillingCycle::Annual)?;
//!
//! let totals = cart.compute_totals();
//! println!("{}", totals.charge_label()); // $969.00/year
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod model;
pub mod pricing;
pub mod storage;
pub mod upsell;

pub use cart::{AddOutcome, Cart};
pub use catalog::{Catalog, Product, ProductCategory, MAX_PRICE};
pub use error::{CartError, Result};
pub use model::{BillingCycle, Selection};
pub use pricing::{
    format_usd, to_cents, Breakdown, ChargePeriod, LineItem, PricingConfig, BUNDLE_DISCOUNT_PERCENT,
};
pub use storage::{CartStorage, FileStorage, MemoryStorage, CART_STORAGE_KEY};
pub use upsell::{ShopPage, UpsellBanner};

//! Page Components

mod cart;
mod store;

pub use cart::CartPage;
pub use store::StorePage;

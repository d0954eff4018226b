//! Browser Storage

use shop_core::{CartError, CartStorage, Result};

/// `CartStorage` over `window.localStorage`
///
/// The handle is looked up on every call; it is unavailable in some private
/// browsing modes, which surfaces as a storage error.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn local_storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| CartError::Storage("no window".into()))?
            .local_storage()
            .map_err(|e| CartError::Storage(format!("{e:?}")))?
            .ok_or_else(|| CartError::Storage("localStorage unavailable".into()))
    }
}

impl CartStorage for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::local_storage()?
            .get_item(key)
            .map_err(|e| CartError::Storage(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::local_storage()?
            .set_item(key, value)
            .map_err(|e| CartError::Storage(format!("{e:?}")))
    }
}

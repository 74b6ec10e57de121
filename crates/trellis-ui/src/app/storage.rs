//! `window.localStorage` adapter.
//!
//! # Design
//! - Storage can be missing (privacy modes, sandboxed frames); reads then miss and writes
//!   report [`StorageError::Unavailable`] instead of panicking.

use crate::core::storage::{KeyValueStore, StorageError};
use gloo::utils::window;

/// Browser-backed [`KeyValueStore`].
pub(crate) struct BrowserStorage {
    inner: Option<web_sys::Storage>,
}

impl BrowserStorage {
    pub(crate) fn new() -> Self {
        let inner = window().local_storage().ok().flatten();
        if inner.is_none() {
            tracing::warn!("localStorage unavailable; preferences will not persist");
        }
        Self { inner }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self
            .inner
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("localStorage".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|err| StorageError::WriteRejected {
                key: key.to_string(),
                detail: format!("{err:?}"),
            })
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.inner
            && storage.remove_item(key).is_err()
        {
            tracing::warn!(key, "failed to remove storage entry");
        }
    }
}

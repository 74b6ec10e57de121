//! Key-value persistence seam.
//!
//! # Design
//! - Everything persisted goes through [`KeyValueStore`] so the browser backend can be
//!   swapped for an in-memory or batched one without touching call sites.
//! - Values are plain strings; callers own their encoding (JSON for preferences).
//! - Methods take `&self`; implementations use interior mutability like `localStorage` does.

use std::cell::RefCell;
use std::collections::HashMap;
use thiserror::Error;

/// Storage key holding the JSON-encoded UI preferences.
pub const PREFERENCES_KEY: &str = "ui-storage";
/// Storage key holding the active language code.
pub const LANGUAGE_KEY: &str = "i18nextLng";
/// Storage key holding the bearer token, when signed in.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Errors raised by storage backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend is not reachable (private mode, disabled storage).
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    /// The backend refused the write.
    #[error("storage write rejected for key {key}: {detail}")]
    WriteRejected {
        /// Key that could not be written.
        key: String,
        /// Backend-provided detail.
        detail: String,
    },
}

/// Minimal string key-value store.
pub trait KeyValueStore {
    /// Read the value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`; missing keys are ignored.
    fn remove(&self, key: &str);
}

/// In-memory store for host builds and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the given entries.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self {
            entries: RefCell::new(map),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

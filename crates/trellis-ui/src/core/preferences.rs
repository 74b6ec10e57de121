//! Persisted UI preference store.
//!
//! # Design
//! - One store instance per app boot; the shell owns it and hands out shared access.
//! - Every mutation is write-through: memory first, then the full object to storage,
//!   then subscribers in subscription order.
//! - Malformed persisted data is never an error; the store falls back to defaults.
//! - Subscribers run synchronously and must not call back into the store.

use crate::core::storage::{KeyValueStore, PREFERENCES_KEY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// Colour theme preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the operating system setting.
    #[default]
    System,
}

impl Theme {
    /// All selectable themes in display order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Light, Self::Dark, Self::System]
    }

    /// Stable identifier used in storage and CSS.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Resolve to a concrete palette given the OS dark-mode preference.
    #[must_use]
    pub const fn resolve(self, prefers_dark: bool) -> ResolvedTheme {
        match self {
            Self::Light => ResolvedTheme::Light,
            Self::Dark => ResolvedTheme::Dark,
            Self::System => {
                if prefers_dark {
                    ResolvedTheme::Dark
                } else {
                    ResolvedTheme::Light
                }
            }
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PreferenceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(PreferenceError::InvalidArgument {
                field: "theme",
                value: other.to_string(),
            }),
        }
    }
}

/// Concrete palette applied to the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedTheme {
    /// Light palette.
    Light,
    /// Dark palette.
    Dark,
}

impl ResolvedTheme {
    /// String identifier used in CSS datasets.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Display preferences persisted across sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    /// Whether the navigation sidebar is expanded.
    pub sidebar_open: bool,
    /// Selected colour theme.
    pub theme: Theme,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            theme: Theme::System,
        }
    }
}

impl UiPreferences {
    /// Decode a persisted payload, returning `None` for anything malformed.
    #[must_use]
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Encode for persistence.
    ///
    /// # Errors
    ///
    /// Propagates the serializer error; unreachable for this plain struct in practice.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Errors raised by preference mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreferenceError {
    /// A caller passed a value outside the accepted set.
    #[error("invalid value {value:?} for {field}")]
    InvalidArgument {
        /// Field being set.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
}

/// Handle returned by [`PreferenceStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) const fn allocate(counter: &mut u64) -> Self {
        let id = Self(*counter);
        *counter += 1;
        id
    }
}

type Listener = Box<dyn Fn(&UiPreferences)>;

/// Write-through preference store with synchronous observers.
pub struct PreferenceStore {
    storage: Rc<dyn KeyValueStore>,
    state: UiPreferences,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PreferenceStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Load the persisted preferences, falling back to defaults when absent or malformed.
    #[must_use]
    pub fn init(storage: Rc<dyn KeyValueStore>) -> Self {
        let state = match storage.get(PREFERENCES_KEY) {
            None => UiPreferences::default(),
            Some(raw) => UiPreferences::decode(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    key = PREFERENCES_KEY,
                    "discarding malformed persisted preferences"
                );
                UiPreferences::default()
            }),
        };
        Self {
            storage,
            state,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Current preferences.
    #[must_use]
    pub const fn state(&self) -> UiPreferences {
        self.state
    }

    /// Expand or collapse the sidebar.
    pub fn set_sidebar_open(&mut self, open: bool) {
        self.apply(|prefs| prefs.sidebar_open = open);
    }

    /// Flip the sidebar state.
    pub fn toggle_sidebar(&mut self) {
        self.apply(|prefs| prefs.sidebar_open = !prefs.sidebar_open);
    }

    /// Select a theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.apply(|prefs| prefs.theme = theme);
    }

    /// Select a theme by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::InvalidArgument`] for anything other than
    /// `light`, `dark`, or `system`; the current state is left untouched.
    pub fn set_theme_str(&mut self, value: &str) -> Result<(), PreferenceError> {
        let theme = value.parse::<Theme>()?;
        self.set_theme(theme);
        Ok(())
    }

    /// Restore the defaults (and persist them).
    pub fn reset(&mut self) {
        self.apply(|prefs| *prefs = UiPreferences::default());
    }

    /// Register a listener invoked after every mutation.
    pub fn subscribe(&mut self, listener: impl Fn(&UiPreferences) + 'static) -> SubscriptionId {
        let id = SubscriptionId::allocate(&mut self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        before != self.listeners.len()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// End of lifecycle: drop every listener.
    pub fn teardown(&mut self) {
        self.listeners.clear();
    }

    fn apply(&mut self, mutate: impl FnOnce(&mut UiPreferences)) {
        mutate(&mut self.state);
        self.persist();
        for (_, listener) in &self.listeners {
            listener(&self.state);
        }
    }

    fn persist(&self) {
        let encoded = match self.state.encode() {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode preferences");
                return;
            }
        };
        if let Err(err) = self.storage.set(PREFERENCES_KEY, &encoded) {
            tracing::warn!(error = %err, "failed to persist preferences");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::{MemoryStorage, StorageError};
    use std::cell::RefCell;

    fn fresh() -> (Rc<MemoryStorage>, PreferenceStore) {
        let storage = Rc::new(MemoryStorage::new());
        let store = PreferenceStore::init(storage.clone());
        (storage, store)
    }

    #[test]
    fn starts_with_defaults() {
        let (_, store) = fresh();
        assert_eq!(
            store.state(),
            UiPreferences {
                sidebar_open: true,
                theme: Theme::System,
            }
        );
    }

    #[test]
    fn toggle_parity_matches_call_count() {
        for count in 0..7 {
            let (_, mut store) = fresh();
            let initial = store.state().sidebar_open;
            for _ in 0..count {
                store.toggle_sidebar();
            }
            assert_eq!(store.state().sidebar_open, initial ^ (count % 2 == 1));
        }
    }

    #[test]
    fn set_sidebar_open_is_direct() {
        let (_, mut store) = fresh();
        store.set_sidebar_open(false);
        assert!(!store.state().sidebar_open);
        store.set_sidebar_open(true);
        assert!(store.state().sidebar_open);
    }

    #[test]
    fn set_theme_is_read_back() {
        let (_, mut store) = fresh();
        for theme in Theme::all() {
            store.set_theme(theme);
            assert_eq!(store.state().theme, theme);
        }
    }

    #[test]
    fn set_theme_str_rejects_unknown_values() -> Result<(), PreferenceError> {
        let (_, mut store) = fresh();
        store.set_theme_str("dark")?;
        let err = store.set_theme_str("sepia");
        assert_eq!(
            err,
            Err(PreferenceError::InvalidArgument {
                field: "theme",
                value: "sepia".to_string(),
            })
        );
        assert_eq!(store.state().theme, Theme::Dark);
        Ok(())
    }

    #[test]
    fn mutations_write_through_in_wire_format() {
        let (storage, mut store) = fresh();
        store.set_theme(Theme::Dark);
        store.set_sidebar_open(false);
        assert_eq!(
            storage.get(PREFERENCES_KEY).as_deref(),
            Some(r#"{"sidebarOpen":false,"theme":"dark"}"#)
        );
    }

    #[test]
    fn reload_restores_persisted_theme() {
        let storage = Rc::new(MemoryStorage::new());
        {
            let mut store = PreferenceStore::init(storage.clone());
            store.set_theme(Theme::Dark);
        }
        let reloaded = PreferenceStore::init(storage);
        assert_eq!(reloaded.state().theme, Theme::Dark);
        assert!(reloaded.state().sidebar_open);
    }

    #[test]
    fn malformed_payloads_fall_back_to_defaults() {
        let payloads = [
            "not json",
            "[]",
            r#"{"sidebarOpen":"yes","theme":"dark"}"#,
            r#"{"sidebarOpen":false,"theme":"sepia"}"#,
            r#"{"theme":"dark"}"#,
            "",
        ];
        for raw in payloads {
            let storage = Rc::new(MemoryStorage::with_entries([(PREFERENCES_KEY, raw)]));
            let store = PreferenceStore::init(storage);
            assert_eq!(store.state(), UiPreferences::default(), "payload {raw:?}");
        }
    }

    #[test]
    fn reset_restores_and_persists_defaults() {
        let (storage, mut store) = fresh();
        store.set_theme(Theme::Light);
        store.toggle_sidebar();
        store.reset();
        assert_eq!(store.state(), UiPreferences::default());
        assert_eq!(
            storage.get(PREFERENCES_KEY).as_deref(),
            Some(r#"{"sidebarOpen":true,"theme":"system"}"#)
        );
    }

    #[test]
    fn subscribers_observe_every_mutation_in_order() {
        let (_, mut store) = fresh();
        let seen_a = Rc::new(RefCell::new(Vec::new()));
        let seen_b = Rc::new(RefCell::new(Vec::new()));
        let sink_a = seen_a.clone();
        let sink_b = seen_b.clone();
        let first = store.subscribe(move |prefs| sink_a.borrow_mut().push(prefs.theme));
        store.subscribe(move |prefs| sink_b.borrow_mut().push(prefs.sidebar_open));

        store.set_theme(Theme::Dark);
        store.toggle_sidebar();
        assert!(store.unsubscribe(first));
        assert!(!store.unsubscribe(first));
        store.set_theme(Theme::Light);

        assert_eq!(*seen_a.borrow(), vec![Theme::Dark, Theme::Dark]);
        assert_eq!(*seen_b.borrow(), vec![true, false, false]);
    }

    #[test]
    fn teardown_drops_listeners() {
        let (_, mut store) = fresh();
        store.subscribe(|_| {});
        store.subscribe(|_| {});
        assert_eq!(store.subscriber_count(), 2);
        store.teardown();
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn storage_failures_do_not_block_updates() {
        struct ReadOnly;
        impl KeyValueStore for ReadOnly {
            fn get(&self, _key: &str) -> Option<String> {
                None
            }
            fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
                Err(StorageError::WriteRejected {
                    key: key.to_string(),
                    detail: "read only".to_string(),
                })
            }
            fn remove(&self, _key: &str) {}
        }
        let mut store = PreferenceStore::init(Rc::new(ReadOnly));
        store.set_theme(Theme::Dark);
        assert_eq!(store.state().theme, Theme::Dark);
    }

    #[test]
    fn system_theme_follows_os_preference() {
        assert_eq!(Theme::System.resolve(true), ResolvedTheme::Dark);
        assert_eq!(Theme::System.resolve(false), ResolvedTheme::Light);
        assert_eq!(Theme::Light.resolve(true).as_str(), "light");
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}

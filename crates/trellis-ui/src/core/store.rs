//! App-wide yewdux store mirroring the persisted stores for rendering.
//!
//! # Design
//! - The preference and language stores stay the source of truth; their subscribers push
//!   snapshots here so components re-render through `use_selector`.
//! - Slices are plain data so reducers can be tested without a DOM.

use crate::core::preferences::{ResolvedTheme, Theme, UiPreferences};
use crate::i18n::DEFAULT_LANGUAGE;
use yewdux::store::Store;

/// Global application store.
#[derive(Clone, Debug, PartialEq, Eq, Store)]
pub struct AppStore {
    /// Latest preference snapshot.
    pub preferences: UiPreferences,
    /// Whether the OS currently prefers a dark palette.
    pub prefers_dark: bool,
    /// Active language code.
    pub language: String,
}

impl Default for AppStore {
    fn default() -> Self {
        Self {
            preferences: UiPreferences::default(),
            prefers_dark: false,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl AppStore {
    /// Palette the document should use right now.
    #[must_use]
    pub const fn resolved_theme(&self) -> ResolvedTheme {
        self.preferences.theme.resolve(self.prefers_dark)
    }

    /// Selected theme preference.
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.preferences.theme
    }
}

/// Replace the preference snapshot.
pub fn apply_preferences(store: &mut AppStore, preferences: UiPreferences) {
    store.preferences = preferences;
}

/// Record an OS colour-scheme change.
pub fn apply_prefers_dark(store: &mut AppStore, prefers_dark: bool) {
    store.prefers_dark = prefers_dark;
}

/// Record the active language.
pub fn apply_language(store: &mut AppStore, language: &str) {
    if store.language != language {
        store.language = language.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_theme_tracks_os_preference_for_system() {
        let mut store = AppStore::default();
        assert_eq!(store.theme(), Theme::System);
        assert_eq!(store.resolved_theme(), ResolvedTheme::Light);
        apply_prefers_dark(&mut store, true);
        assert_eq!(store.resolved_theme(), ResolvedTheme::Dark);

        apply_preferences(
            &mut store,
            UiPreferences {
                sidebar_open: false,
                theme: Theme::Light,
            },
        );
        assert_eq!(store.resolved_theme(), ResolvedTheme::Light);
        assert!(!store.preferences.sidebar_open);
    }

    #[test]
    fn language_updates_are_idempotent() {
        let mut store = AppStore::default();
        assert_eq!(store.language, "en");
        apply_language(&mut store, "fr");
        let snapshot = store.clone();
        apply_language(&mut store, "fr");
        assert_eq!(store, snapshot);
    }
}

//! Active-language state with persistence and change notification.

use super::{DEFAULT_LANGUAGE, I18nError, LocaleCatalog, Translator};
use crate::core::preferences::SubscriptionId;
use crate::core::storage::{KeyValueStore, LANGUAGE_KEY};
use std::fmt;
use std::rc::Rc;

type Listener = Box<dyn Fn(&str)>;

/// Process-wide active language persisted under [`LANGUAGE_KEY`].
pub struct LanguageState {
    storage: Rc<dyn KeyValueStore>,
    catalog: Rc<LocaleCatalog>,
    language: &'static str,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for LanguageState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LanguageState")
            .field("language", &self.language)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl LanguageState {
    /// Pick the persisted language, else the browser language, else [`DEFAULT_LANGUAGE`].
    #[must_use]
    pub fn init(
        storage: Rc<dyn KeyValueStore>,
        catalog: Rc<LocaleCatalog>,
        browser_language: Option<&str>,
    ) -> Self {
        let persisted = storage
            .get(LANGUAGE_KEY)
            .and_then(|raw| LocaleCatalog::match_language(&raw));
        let language = persisted
            .or_else(|| browser_language.and_then(LocaleCatalog::match_language))
            .unwrap_or(DEFAULT_LANGUAGE);
        tracing::debug!(language, persisted = persisted.is_some(), "language selected");
        Self {
            storage,
            catalog,
            language,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Active language code.
    #[must_use]
    pub const fn language(&self) -> &'static str {
        self.language
    }

    /// Shared catalog backing this state.
    #[must_use]
    pub fn catalog(&self) -> &LocaleCatalog {
        &self.catalog
    }

    /// Rendering snapshot of the active language.
    #[must_use]
    pub fn translator(&self) -> Translator {
        Translator::new(Rc::clone(&self.catalog), self.language)
    }

    /// Switch language, persist it, and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::UnsupportedLanguage`] when `code` does not map to a registry
    /// entry; the active language is left unchanged.
    pub fn set_language(&mut self, code: &str) -> Result<(), I18nError> {
        let language = LocaleCatalog::match_language(code)
            .ok_or_else(|| I18nError::UnsupportedLanguage(code.to_string()))?;
        self.language = language;
        if let Err(err) = self.storage.set(LANGUAGE_KEY, language) {
            tracing::warn!(error = %err, "failed to persist language");
        }
        for (_, listener) in &self.listeners {
            listener(language);
        }
        Ok(())
    }

    /// Translate with the active language.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.catalog
            .translate(key, self.language, self.catalog.fallback_language())
    }

    /// Translate, returning `default` when no dictionary has the key.
    #[must_use]
    pub fn t_or(&self, key: &str, default: &str) -> String {
        self.catalog.text_or(key, self.language, default)
    }

    /// Translate and interpolate `{{name}}` placeholders.
    #[must_use]
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.catalog.translate_with(key, self.language, args)
    }

    /// Register a listener invoked with the new code after every change.
    pub fn subscribe(&mut self, listener: impl Fn(&str) + 'static) -> SubscriptionId {
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

    /// Drop every listener.
    pub fn teardown(&mut self) {
        self.listeners.clear();
    }
}

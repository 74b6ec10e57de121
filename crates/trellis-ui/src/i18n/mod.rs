//! Locale resources: language registry, flattened dictionaries, and key resolution.
//!
//! # Design
//! - Dictionaries are bundled with `include_str!` and flattened to dotted keys once.
//! - Resolution is total: requested language, then the fallback language, then the key itself.
//! - Adding a language is one registry entry plus one JSON file under `i18n/`.

mod state;

pub use state::LanguageState;

use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Language used when nothing else matches.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Registry entry for a selectable language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupportedLanguage {
    /// Base language subtag (`en`, `es`).
    pub code: &'static str,
    /// Native display name.
    pub name: &'static str,
    /// Optional flag glyph shown in the switcher.
    pub flag: Option<&'static str>,
    /// Bundled JSON resource.
    pub source: &'static str,
}

/// Languages shipped with the bundle, in switcher order.
pub static SUPPORTED_LANGUAGES: [SupportedLanguage; 3] = [
    SupportedLanguage {
        code: "en",
        name: "English",
        flag: Some("🇺🇸"),
        source: include_str!("../../i18n/en.json"),
    },
    SupportedLanguage {
        code: "es",
        name: "Español",
        flag: Some("🇪🇸"),
        source: include_str!("../../i18n/es.json"),
    },
    SupportedLanguage {
        code: "fr",
        name: "Français",
        flag: Some("🇫🇷"),
        source: include_str!("../../i18n/fr.json"),
    },
];

/// Look up a registry entry by exact code.
#[must_use]
pub fn supported_language(code: &str) -> Option<&'static SupportedLanguage> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|language| language.code == code)
}

/// Errors raised by the locale layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// The requested language is not in the registry.
    #[error("unsupported language {0:?}")]
    UnsupportedLanguage(String),
    /// A dictionary resource could not be parsed.
    #[error("invalid locale dictionary: {0}")]
    InvalidDictionary(String),
}

/// Immutable key → text map for one language.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocaleDictionary {
    entries: HashMap<String, String>,
}

impl LocaleDictionary {
    /// Parse a nested JSON object into dotted keys. Non-string leaves are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::InvalidDictionary`] for invalid JSON or a non-object root.
    pub fn from_json(raw: &str) -> Result<Self, I18nError> {
        let root: Value =
            serde_json::from_str(raw).map_err(|err| I18nError::InvalidDictionary(err.to_string()))?;
        let Value::Object(map) = root else {
            return Err(I18nError::InvalidDictionary(
                "root must be a JSON object".to_string(),
            ));
        };
        let mut entries = HashMap::new();
        for (key, value) in map {
            flatten(key, value, &mut entries);
        }
        Ok(Self { entries })
    }

    /// Text for a dotted key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(prefix: String, value: Value, out: &mut HashMap<String, String>) {
    match value {
        Value::String(text) => {
            out.insert(prefix, text);
        }
        Value::Object(children) => {
            for (key, child) in children {
                flatten(format!("{prefix}.{key}"), child, out);
            }
        }
        _ => {}
    }
}

/// All loaded dictionaries plus the fallback language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocaleCatalog {
    dictionaries: HashMap<String, LocaleDictionary>,
    fallback: String,
}

impl LocaleCatalog {
    /// Empty catalog with the given fallback language.
    #[must_use]
    pub fn new(fallback: &str) -> Self {
        Self {
            dictionaries: HashMap::new(),
            fallback: fallback.to_string(),
        }
    }

    /// Catalog built from every bundled registry entry.
    #[must_use]
    pub fn bundled() -> Self {
        let mut catalog = Self::new(DEFAULT_LANGUAGE);
        for language in &SUPPORTED_LANGUAGES {
            let dictionary = LocaleDictionary::from_json(language.source).unwrap_or_else(|err| {
                tracing::error!(language = language.code, error = %err, "bundled dictionary failed to load");
                LocaleDictionary::default()
            });
            catalog.insert(language.code, dictionary);
        }
        catalog
    }

    /// Add or replace a dictionary.
    pub fn insert(&mut self, language: &str, dictionary: LocaleDictionary) {
        self.dictionaries.insert(language.to_string(), dictionary);
    }

    /// Language consulted when a key is missing.
    #[must_use]
    pub fn fallback_language(&self) -> &str {
        &self.fallback
    }

    /// Dictionary for a language, if loaded.
    #[must_use]
    pub fn dictionary(&self, language: &str) -> Option<&LocaleDictionary> {
        self.dictionaries.get(language)
    }

    /// Text for `key` in exactly `language`.
    #[must_use]
    pub fn lookup(&self, key: &str, language: &str) -> Option<&str> {
        self.dictionaries.get(language)?.get(key)
    }

    /// Resolve `key`: `language`, then `fallback`, then the literal key.
    #[must_use]
    pub fn translate(&self, key: &str, language: &str, fallback: &str) -> String {
        self.resolve(key, language, fallback)
            .unwrap_or(key)
            .to_string()
    }

    /// Like [`LocaleCatalog::translate`] with the catalog's own fallback, returning
    /// `default` instead of the key when nothing matches.
    #[must_use]
    pub fn text_or(&self, key: &str, language: &str, default: &str) -> String {
        self.resolve(key, language, &self.fallback)
            .unwrap_or(default)
            .to_string()
    }

    /// Resolve `key` and substitute `{{name}}` placeholders.
    #[must_use]
    pub fn translate_with(&self, key: &str, language: &str, args: &[(&str, &str)]) -> String {
        interpolate(&self.translate(key, language, &self.fallback), args)
    }

    /// Map a browser or stored tag (`en-US`, `EN`) to a supported code.
    #[must_use]
    pub fn match_language(tag: &str) -> Option<&'static str> {
        let lowered = tag.trim().to_ascii_lowercase();
        let base = lowered.split(['-', '_']).next()?;
        supported_language(base).map(|language| language.code)
    }

    fn resolve<'a>(&'a self, key: &str, language: &str, fallback: &str) -> Option<&'a str> {
        self.lookup(key, language)
            .or_else(|| self.lookup(key, fallback))
    }
}

/// Comparable snapshot of the active language for rendering.
#[derive(Clone, Debug)]
pub struct Translator {
    catalog: Rc<LocaleCatalog>,
    language: &'static str,
}

impl PartialEq for Translator {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.catalog, &other.catalog) && self.language == other.language
    }
}

impl Translator {
    /// Snapshot `language` over a shared catalog.
    #[must_use]
    pub const fn new(catalog: Rc<LocaleCatalog>, language: &'static str) -> Self {
        Self { catalog, language }
    }

    /// English over the bundled catalog; used when no provider is mounted.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(Rc::new(LocaleCatalog::bundled()), DEFAULT_LANGUAGE)
    }

    /// Language this snapshot renders.
    #[must_use]
    pub const fn language(&self) -> &'static str {
        self.language
    }

    /// See [`LocaleCatalog::translate`].
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.catalog
            .translate(key, self.language, self.catalog.fallback_language())
    }

    /// See [`LocaleCatalog::text_or`].
    #[must_use]
    pub fn t_or(&self, key: &str, default: &str) -> String {
        self.catalog.text_or(key, self.language, default)
    }

    /// See [`LocaleCatalog::translate_with`].
    #[must_use]
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.catalog.translate_with(key, self.language, args)
    }
}

/// Replace each `{{name}}` with its value.
#[must_use]
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{{{name}}}}}"), value)
        })
}

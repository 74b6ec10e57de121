//! Shared services handed to components through context.
//!
//! # Design
//! - Built exactly once per app boot; components get cheap `Rc` clones.
//! - The preference and language stores stay authoritative. Their subscribers push snapshots
//!   into the yewdux [`AppStore`] from a spawned task, so a mutation never re-enters a store
//!   that is still borrowed.

use crate::app::storage::BrowserStorage;
use crate::app::transport::FetchTransport;
use crate::core::config::AppConfig;
use crate::core::http::HttpClient;
use crate::core::preferences::{PreferenceStore, Theme};
use crate::core::storage::KeyValueStore;
use crate::core::store::{AppStore, apply_language, apply_preferences, apply_prefers_dark};
use crate::i18n::{LanguageState, LocaleCatalog};
use gloo::utils::window;
use std::cell::RefCell;
use std::rc::Rc;
use trellis_telemetry::{Breadcrumb, Environment, ErrorTracker, TracingErrorTracker};
use yewdux::prelude::Dispatch;

/// Media query that reports the OS dark-mode setting.
pub(crate) const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

/// Services shared by every page.
#[derive(Clone)]
pub(crate) struct AppCtx {
    pub(crate) preferences: Rc<RefCell<PreferenceStore>>,
    pub(crate) language: Rc<RefCell<LanguageState>>,
    pub(crate) http: Rc<HttpClient>,
    pub(crate) tracker: Rc<dyn ErrorTracker>,
    pub(crate) environment: Environment,
}

impl PartialEq for AppCtx {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.preferences, &other.preferences) && Rc::ptr_eq(&self.http, &other.http)
    }
}

impl AppCtx {
    /// Wire storage, stores, HTTP client, and error tracking.
    pub(crate) fn boot() -> Self {
        let config = AppConfig::from_env();
        let storage: Rc<dyn KeyValueStore> = Rc::new(BrowserStorage::new());
        let catalog = Rc::new(LocaleCatalog::bundled());
        let browser_language = window().navigator().language();

        let mut preferences = PreferenceStore::init(Rc::clone(&storage));
        preferences.subscribe(|prefs| {
            let prefs = *prefs;
            yew::platform::spawn_local(async move {
                Dispatch::<AppStore>::new().reduce_mut(|store| apply_preferences(store, prefs));
            });
        });

        let mut language =
            LanguageState::init(Rc::clone(&storage), catalog, browser_language.as_deref());
        language.subscribe(|code| {
            let code = code.to_string();
            yew::platform::spawn_local(async move {
                Dispatch::<AppStore>::new().reduce_mut(|store| apply_language(store, &code));
            });
        });

        let tracker = TracingErrorTracker::new(config.error_tracking());
        let http = HttpClient::new(&config, Rc::new(FetchTransport), storage);
        tracing::info!(
            environment = config.environment.as_str(),
            api_base_url = %config.api_base_url,
            language = language.language(),
            "application booted"
        );

        Self {
            preferences: Rc::new(RefCell::new(preferences)),
            language: Rc::new(RefCell::new(language)),
            http: Rc::new(http),
            tracker: Rc::new(tracker),
            environment: config.environment,
        }
    }

    /// Copy the current store snapshots into the render store.
    pub(crate) fn sync_store(&self) {
        let prefs = self.preferences.borrow().state();
        let language = self.language.borrow().language();
        let prefers_dark = prefers_dark_scheme();
        Dispatch::<AppStore>::new().reduce_mut(|store| {
            apply_preferences(store, prefs);
            apply_language(store, language);
            apply_prefers_dark(store, prefers_dark);
        });
    }

    pub(crate) fn set_theme(&self, theme: Theme) {
        self.breadcrumb("ui", format!("theme set to {theme}"));
        self.preferences.borrow_mut().set_theme(theme);
    }

    pub(crate) fn toggle_sidebar(&self) {
        self.preferences.borrow_mut().toggle_sidebar();
    }

    pub(crate) fn set_language(&self, code: &str) {
        let result = self.language.borrow_mut().set_language(code);
        match result {
            Ok(()) => self.breadcrumb("ui", format!("language set to {code}")),
            Err(err) => tracing::warn!(error = %err, "language change rejected"),
        }
    }

    pub(crate) fn breadcrumb(&self, category: &str, message: String) {
        self.tracker.add_breadcrumb(Breadcrumb::new(category, message));
    }
}

/// Whether the OS currently prefers dark colours.
pub(crate) fn prefers_dark_scheme() -> bool {
    window()
        .match_media(DARK_SCHEME_QUERY)
        .ok()
        .flatten()
        .is_some_and(|query| query.matches())
}

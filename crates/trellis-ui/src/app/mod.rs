//! Browser shell: boots shared services, mounts the router, and keeps the document in sync.
//!
//! # Design
//! - Services are created once in [`AppCtx::boot`] and provided through context.
//! - Rendering reads the yewdux [`AppStore`]; document side effects (theme, `lang`) run in
//!   effects keyed on the store values.

use crate::components::layout::MainLayout;
use crate::core::config::AppConfig;
use crate::core::preferences::ResolvedTheme;
use crate::core::store::{AppStore, apply_prefers_dark};
use crate::features::example_form::view::ExampleFormPage;
use crate::features::home::view::HomePage;
use crate::features::not_found::view::NotFoundPage;
use crate::i18n::Translator;
use context::{DARK_SCHEME_QUERY, prefers_dark_scheme};
use gloo::console;
use gloo::events::EventListener;
use gloo::utils::{document, window};
use telemetry::ConsoleLayer;
use trellis_telemetry::{LoggingConfig, init_logging_with_layer};
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::{Dispatch, use_selector};

pub(crate) use context::AppCtx;
pub(crate) use routes::Route;

mod context;
mod routes;
mod storage;
mod telemetry;
mod transport;

#[function_component(TrellisApp)]
pub(crate) fn trellis_app() -> Html {
    let ctx = use_memo(|_| AppCtx::boot(), ());
    let language = use_selector(|store: &AppStore| store.language.clone());
    let resolved_theme = use_selector(AppStore::resolved_theme);

    {
        let ctx = (*ctx).clone();
        use_effect_with_deps(
            move |_| {
                ctx.sync_store();
                || ()
            },
            (),
        );
    }
    use_effect_with_deps(
        |_| {
            let listener = window()
                .match_media(DARK_SCHEME_QUERY)
                .ok()
                .flatten()
                .map(|query| {
                    EventListener::new(&query, "change", |_event| {
                        let dark = prefers_dark_scheme();
                        Dispatch::<AppStore>::new()
                            .reduce_mut(|store| apply_prefers_dark(store, dark));
                    })
                });
            move || drop(listener)
        },
        (),
    );
    use_effect_with_deps(
        |theme| {
            apply_theme(*theme);
            || ()
        },
        *resolved_theme,
    );
    use_effect_with_deps(
        |language: &String| {
            if let Some(root) = document().document_element()
                && let Err(err) = root.set_attribute("lang", language)
            {
                tracing::debug!(?err, %language, "could not set document language");
            }
            || ()
        },
        (*language).clone(),
    );

    let translator = {
        let ctx = (*ctx).clone();
        use_memo(
            move |_| ctx.language.borrow().translator(),
            (*language).clone(),
        )
    };

    html! {
        <ContextProvider<AppCtx> context={(*ctx).clone()}>
            <ContextProvider<Translator> context={(*translator).clone()}>
                <BrowserRouter>
                    <MainLayout>
                        <Switch<Route> render={switch} />
                    </MainLayout>
                </BrowserRouter>
            </ContextProvider<Translator>>
        </ContextProvider<AppCtx>>
    }
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <HomePage /> },
        Route::Form => html! { <ExampleFormPage /> },
        Route::NotFound => html! { <NotFoundPage /> },
    }
}

fn apply_theme(theme: ResolvedTheme) {
    let Some(root) = document().document_element() else {
        return;
    };
    if let Err(err) = root.set_attribute("data-theme", theme.as_str()) {
        tracing::debug!(?err, theme = theme.as_str(), "could not set data-theme");
    }
    let classes = root.class_list();
    let toggled = match theme {
        ResolvedTheme::Dark => classes.add_1("dark"),
        ResolvedTheme::Light => classes.remove_1("dark"),
    };
    if let Err(err) = toggled {
        tracing::debug!(?err, theme = theme.as_str(), "could not toggle dark class");
    }
}

/// Install logging and mount the application.
pub fn run_app() {
    console_error_panic_hook::set_once();
    let config = AppConfig::from_env();
    let logging = LoggingConfig {
        level: &config.log_level,
        format: config.log_format,
        build_sha: option_env!("TRELLIS_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging_with_layer(&logging, ConsoleLayer) {
        console::warn!(format!("logging unavailable: {err}"));
    }
    if let Some(root) = document().get_element_by_id("root") {
        yew::Renderer::<TrellisApp>::with_root(root).render();
    } else {
        yew::Renderer::<TrellisApp>::new().render();
    }
}

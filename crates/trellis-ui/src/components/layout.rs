//! Application chrome: header, collapsible sidebar, and footer around the routed page.
//!
//! # Design
//! - Sidebar visibility comes from the persisted preferences via the render store.
//! - A page failure replaces the routed content with [`ErrorFallback`] until the route changes
//!   or the user retries.

use crate::app::{AppCtx, Route};
use crate::components::error_fallback::{ErrorFallback, FailureReporter, failure_reporter};
use crate::components::language_switcher::LanguageSwitcher;
use crate::components::theme_toggle::ThemeToggle;
use crate::core::store::AppStore;
use crate::i18n::Translator;
use yew::prelude::*;
use yew_router::prelude::{Link, Routable, use_route};
use yewdux::prelude::use_selector;

const NAV_ROUTES: [Route; 2] = [Route::Home, Route::Form];

#[derive(Properties, PartialEq)]
pub(crate) struct MainLayoutProps {
    pub children: Children,
}

#[function_component(MainLayout)]
pub(crate) fn main_layout(props: &MainLayoutProps) -> Html {
    let i18n = use_context::<Translator>().unwrap_or_else(Translator::fallback);
    let ctx = use_context::<AppCtx>();
    let sidebar_open = *use_selector(|store: &AppStore| store.preferences.sidebar_open);
    let route = use_route::<Route>();
    let failure = use_state_eq(|| None::<String>);

    {
        let failure = failure.clone();
        let ctx = ctx.clone();
        use_effect_with_deps(
            move |route: &Option<Route>| {
                failure.set(None);
                if let (Some(ctx), Some(route)) = (&ctx, route) {
                    ctx.breadcrumb("navigation", format!("navigated to {}", route.to_path()));
                }
                || ()
            },
            route.clone(),
        );
    }

    let reporter = failure_reporter(ctx.clone(), failure.clone());
    let on_reset = {
        let failure = failure.clone();
        Callback::from(move |()| failure.set(None))
    };
    let toggle_sidebar = Callback::from(move |_: MouseEvent| {
        if let Some(ctx) = &ctx {
            ctx.toggle_sidebar();
        }
    });

    let nav_item = |target: &Route| {
        let active = route.as_ref() == Some(target);
        html! {
            <Link<Route>
                to={target.clone()}
                classes={classes!("nav-item", active.then_some("active"))}
            >
                { i18n.t(target.label_key()) }
            </Link<Route>>
        }
    };

    html! {
        <div class={classes!("app-shell", if sidebar_open { "sidebar-open" } else { "sidebar-closed" })}>
            <header class="topbar">
                <button
                    class="ghost"
                    aria-label={i18n.t("nav.toggleSidebar")}
                    aria-expanded={sidebar_open.to_string()}
                    onclick={toggle_sidebar}
                >
                    {"☰"}
                </button>
                <Link<Route> to={Route::Home} classes="brand">
                    <strong>{ i18n.t("app.title") }</strong>
                </Link<Route>>
                <nav class="top-nav">
                    { for NAV_ROUTES.iter().map(nav_item) }
                </nav>
                <div class="top-actions">
                    <LanguageSwitcher />
                    <ThemeToggle />
                </div>
            </header>
            <div class="body">
                if sidebar_open {
                    <aside class="sidebar">
                        <nav>
                            { for NAV_ROUTES.iter().map(nav_item) }
                        </nav>
                    </aside>
                }
                <main>
                    <ContextProvider<FailureReporter> context={reporter}>
                        if let Some(error) = (*failure).clone() {
                            <ErrorFallback error={AttrValue::from(error)} {on_reset} />
                        } else {
                            { for props.children.iter() }
                        }
                    </ContextProvider<FailureReporter>>
                </main>
            </div>
            <footer class="footer">
                <small class="muted">{ i18n.t("app.footer") }</small>
            </footer>
        </div>
    }
}

//! Header control cycling light → dark → system.

use crate::app::AppCtx;
use crate::core::preferences::Theme;
use crate::core::store::AppStore;
use crate::i18n::Translator;
use yew::prelude::*;
use yewdux::prelude::use_selector;

const fn next_theme(theme: Theme) -> Theme {
    match theme {
        Theme::Light => Theme::Dark,
        Theme::Dark => Theme::System,
        Theme::System => Theme::Light,
    }
}

const fn theme_icon(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "☀",
        Theme::Dark => "☾",
        Theme::System => "◐",
    }
}

#[function_component(ThemeToggle)]
pub(crate) fn theme_toggle() -> Html {
    let i18n = use_context::<Translator>().unwrap_or_else(Translator::fallback);
    let ctx = use_context::<AppCtx>();
    let theme = *use_selector(AppStore::theme);

    let onclick = Callback::from(move |_: MouseEvent| {
        if let Some(ctx) = &ctx {
            ctx.set_theme(next_theme(theme));
        }
    });
    let label = format!(
        "{}: {}",
        i18n.t("theme.toggle"),
        i18n.t(&format!("theme.{}", theme.as_str()))
    );

    html! {
        <button class="ghost theme-toggle" title={label.clone()} aria-label={label} {onclick}>
            { theme_icon(theme) }
        </button>
    }
}

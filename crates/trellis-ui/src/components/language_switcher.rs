//! Flag buttons for every registered language.

use crate::app::AppCtx;
use crate::i18n::{SUPPORTED_LANGUAGES, SupportedLanguage, Translator};
use yew::prelude::*;

#[function_component(LanguageSwitcher)]
pub(crate) fn language_switcher() -> Html {
    let i18n = use_context::<Translator>().unwrap_or_else(Translator::fallback);
    let ctx = use_context::<AppCtx>();

    let item = |language: &'static SupportedLanguage| {
        let active = i18n.language() == language.code;
        let onclick = {
            let ctx = ctx.clone();
            Callback::from(move |_: MouseEvent| {
                if let Some(ctx) = &ctx {
                    ctx.set_language(language.code);
                }
            })
        };
        html! {
            <button
                class={classes!("lang-option", active.then_some("active"))}
                aria-label={i18n.t_with("nav.switchTo", &[("language", language.name)])}
                aria-pressed={active.to_string()}
                title={language.name}
                {onclick}
            >
                { language.flag.unwrap_or(language.code) }
            </button>
        }
    };

    html! {
        <div class="language-switcher" role="group" aria-label={i18n.t("nav.language")}>
            { for SUPPORTED_LANGUAGES.iter().map(item) }
        </div>
    }
}

use crate::app::Route;
use crate::components::button::{Button, ButtonSize};
use crate::i18n::Translator;
use yew::prelude::*;
use yew_router::prelude::use_navigator;

#[function_component(NotFoundPage)]
pub(crate) fn not_found_page() -> Html {
    let i18n = use_context::<Translator>().unwrap_or_else(Translator::fallback);
    let navigator = use_navigator();
    let go_home = Callback::from(move |_: MouseEvent| {
        if let Some(navigator) = &navigator {
            navigator.push(&Route::Home);
        }
    });

    html! {
        <div class="not-found">
            <p class="status-code">{ i18n.t("notFound.title") }</p>
            <h1>{ i18n.t("notFound.heading") }</h1>
            <p class="muted">{ i18n.t("notFound.message") }</p>
            <Button size={ButtonSize::Lg} onclick={go_home}>{ i18n.t("notFound.goHome") }</Button>
        </div>
    }
}
